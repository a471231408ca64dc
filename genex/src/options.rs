use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Knobs of an evaluation that do not come from the build scope itself.
///
/// ```toml
/// max_depth = 64
/// quiet = false
/// evaluate_for_buildsystem = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorOptions {
    /// Deepest allowed nesting of expression evaluations, including the
    /// ones synthesized while folding transitive properties.
    pub max_depth: usize,
    /// Record failures without emitting diagnostics.
    pub quiet: bool,
    /// The result is consumed by the build system itself, which enables
    /// `$<TARGET_OBJECTS:...>`.
    pub evaluate_for_buildsystem: bool,
}

impl EvaluatorOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    /// Load options from a TOML string. `file` names the source in errors.
    pub fn from_toml_str(text: &str, file: &str) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            source,
            file: file.to_string(),
        })
    }

    /// Load options from a TOML file.
    pub fn load_from_toml(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            file: path.display().to_string(),
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            quiet: false,
            evaluate_for_buildsystem: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let options = EvaluatorOptions::from_toml_str("quiet = true", "inline").unwrap();
        assert!(options.quiet);
        assert_eq!(options.max_depth, EvaluatorOptions::DEFAULT_MAX_DEPTH);
        assert!(!options.evaluate_for_buildsystem);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = EvaluatorOptions::from_toml_str("depth = 3", "inline.toml").unwrap_err();
        assert!(error.to_string().contains("inline.toml"), "{error}");
    }
}
