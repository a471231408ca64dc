//! Evaluator for generator expressions.
//!
//! A generator expression is a `$<ID:param,param...>` fragment embedded in
//! build-configuration text. Its value depends on the configuration being
//! generated (`Debug`, `Release`...), on the target it is evaluated for and
//! on the properties of the targets it links to.
//!
//! ```ignore
//! use genex::{CompiledExpression, memory::{Project, TargetDef}, model::TargetType};
//!
//! let project = Project::new().target(TargetDef::new("app", TargetType::Executable));
//! let compiled = CompiledExpression::parse("$<$<CONFIG:Debug>:-g>").unwrap();
//! let outcome = compiled.evaluate(&project, "Debug", false, None, None, None);
//! assert_eq!(outcome.output, "-g");
//! ```
//!
//! The evaluator reads build state through the [`model::Makefile`] and
//! [`model::Target`] traits; [`memory`] implements both from plain data.

pub mod context;
pub mod dag;
pub mod error;
pub mod expression;
pub mod memory;
pub mod model;
pub mod nodes;
pub mod options;
pub mod parser;
pub mod policy;
pub mod transitive;
pub mod utils;

pub use context::{EvaluationContext, EvaluationOutcome};
pub use dag::{DagCheckResult, DagChecker};
pub use error::{ConfigError, EvalError, ParseError};
pub use expression::CompiledExpression;
pub use options::EvaluatorOptions;
