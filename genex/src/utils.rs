//! String helpers shared by the catalog nodes.
use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static TARGET_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.:+-]+$").unwrap());
static PROPERTY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());
static IDENTIFIER_OR_EMPTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]*$").unwrap());
static VERSION_OR_EMPTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9.]*$").unwrap());

/// Maximum number of dot-separated components considered by [`compare_versions`].
const VERSION_COMPONENTS: usize = 8;

pub fn is_valid_target_name(name: &str) -> bool {
    TARGET_NAME.is_match(name)
}

pub fn is_valid_property_name(name: &str) -> bool {
    PROPERTY_NAME.is_match(name)
}

/// Compiler ids and configuration names: alphanumerics and underscores, possibly empty.
pub fn is_identifier_or_empty(value: &str) -> bool {
    IDENTIFIER_OR_EMPTY.is_match(value)
}

pub fn is_version_or_empty(value: &str) -> bool {
    VERSION_OR_EMPTY.is_match(value)
}

/// Split a `;`-separated list.
///
/// Empty elements are dropped, `\;` is an escaped separator and separators
/// inside `[...]` do not split.
pub fn expand_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    if !value.contains(';') {
        return vec![value.to_string()];
    }

    let mut elements = Vec::new();
    let mut current = String::new();
    let mut nesting = 0i32;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&';') => {
                current.push(';');
                chars.next();
            }
            '[' => {
                nesting += 1;
                current.push(c);
            }
            ']' => {
                nesting -= 1;
                current.push(c);
            }
            ';' if nesting == 0 => {
                if !current.is_empty() {
                    elements.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        elements.push(current);
    }
    elements
}

/// Remove empty elements from a `;`-separated list without unescaping it.
pub fn strip_empty_list_elements(value: &str) -> String {
    if !value.contains(';') {
        return value.to_string();
    }
    value
        .split(';')
        .filter(|element| !element.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

/// Whether `value` is one of the false constants (`""`, `0`, `OFF`, `NO`,
/// `FALSE`, `N`, `IGNORE`, `NOTFOUND`, `*-NOTFOUND`), case-insensitively.
pub fn is_off(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    let upper = value.to_ascii_uppercase();
    matches!(
        upper.as_str(),
        "0" | "OFF" | "NO" | "FALSE" | "N" | "IGNORE" | "NOTFOUND"
    ) || upper.ends_with("-NOTFOUND")
}

/// Turn arbitrary text into a valid C identifier: every character that is not
/// alphanumeric or `_` becomes `_`, and a leading digit gets a `_` prefix.
pub fn make_c_identifier(value: &str) -> String {
    let mut identifier = String::with_capacity(value.len() + 1);
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.push('_');
    }
    identifier.extend(
        value
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    identifier
}

fn version_components(version: &str) -> [u64; VERSION_COMPONENTS] {
    let mut components = [0u64; VERSION_COMPONENTS];
    let mut rest = version.trim_start();
    for slot in components.iter_mut() {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            break;
        }
        *slot = rest[..digits]
            .bytes()
            .fold(0u64, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as u64));
        rest = &rest[digits..];
        match rest.strip_prefix('.') {
            Some(next) => rest = next,
            None => break,
        }
    }
    components
}

/// Numeric, component-wise comparison of dotted version strings.
///
/// Missing components count as zero and parsing stops at the first
/// component that does not start with a digit, so `"1.2"` equals `"1.2.0"`
/// and `"1.10"` is greater than `"1.9"`.
pub fn compare_versions(lhs: &str, rhs: &str) -> Ordering {
    version_components(lhs).cmp(&version_components(rhs))
}

fn parse_c_long(text: &str, radix: Option<u32>) -> Option<i64> {
    let text = text.trim_start();
    let (negative, text) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match radix {
        Some(radix) => (radix, text),
        None => {
            let lower = text.to_ascii_lowercase();
            if lower.starts_with("0x") && lower[2..].starts_with(|c: char| c.is_ascii_hexdigit()) {
                (16, &text[2..])
            } else if text.len() > 1 && text.starts_with('0') {
                (8, &text[1..])
            } else {
                (10, text)
            }
        }
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, radix).ok()? as i128;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Parse an integer the way `$<EQUAL>` reads its operands.
///
/// Accepts decimal, `0x` hexadecimal and leading-`0` octal literals with an
/// optional sign, plus binary literals with a `0b`/`0B` prefix where the sign
/// may come before or after the prefix. Trailing garbage and out-of-range
/// values are rejected.
pub fn parse_integer(text: &str) -> Option<i64> {
    let mut rest = text;
    let mut radix = None;
    let mut negate = false;

    if let Some(stripped) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        radix = Some(2);
        rest = stripped;
    }
    if let Some(stripped) = rest.strip_prefix("-0b").or_else(|| rest.strip_prefix("-0B")) {
        radix = Some(2);
        rest = stripped;
        negate = true;
    }
    if let Some(stripped) = rest.strip_prefix("+0b").or_else(|| rest.strip_prefix("+0B")) {
        radix = Some(2);
        rest = stripped;
    }

    let value = parse_c_long(rest, radix)?;
    if negate { value.checked_neg() } else { Some(value) }
}
