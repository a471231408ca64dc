//! Text transforms, version comparisons and reserved-character escapes.
use std::cmp::Ordering;

use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::expression::ExpressionContent;
use crate::nodes::{Arity, GeneratorNode};
use crate::utils::{compare_versions, expand_list, make_c_identifier};

/// Single-parameter text transform.
pub struct Transform(fn(&str) -> String);

/// `$<VERSION_*:lhs,rhs>`: `"1"` when `lhs` compares to `rhs` as `expected`.
pub struct VersionCompare {
    expected: Ordering,
}

/// Zero-parameter node yielding a character the grammar reserves.
pub struct Escape(&'static str);

/// `$<JOIN:list,glue>`.
pub struct Join;

pub static LOWER_CASE: Transform = Transform(str::to_ascii_lowercase);
pub static UPPER_CASE: Transform = Transform(str::to_ascii_uppercase);
pub static MAKE_C_IDENTIFIER: Transform = Transform(make_c_identifier);

pub static VERSION_GREATER: VersionCompare = VersionCompare {
    expected: Ordering::Greater,
};
pub static VERSION_LESS: VersionCompare = VersionCompare {
    expected: Ordering::Less,
};
pub static VERSION_EQUAL: VersionCompare = VersionCompare {
    expected: Ordering::Equal,
};

pub static ANGLE_R: Escape = Escape(">");
pub static COMMA: Escape = Escape(",");
pub static SEMICOLON: Escape = Escape(";");

pub static JOIN: Join = Join;

impl GeneratorNode for Transform {
    fn evaluate(
        &self,
        parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        (self.0)(&parameters[0])
    }
}

impl GeneratorNode for VersionCompare {
    fn arity(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn evaluate(
        &self,
        parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        if compare_versions(&parameters[0], &parameters[1]) == self.expected {
            "1".to_string()
        } else {
            "0".to_string()
        }
    }
}

impl GeneratorNode for Escape {
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }

    fn evaluate(
        &self,
        _parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        self.0.to_string()
    }
}

impl GeneratorNode for Join {
    fn arity(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn accepts_arbitrary_content(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        expand_list(&parameters[0]).join(&parameters[1])
    }
}
