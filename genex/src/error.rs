//! Error types.
//!
//! [`EvalError`] is the catalog of every user-facing diagnostic the evaluator
//! can raise. Nodes never format messages by hand: they construct a variant
//! and hand it to [`crate::context::EvaluationContext::report_error`], which
//! sets the sticky error flag and (unless quiet) emits a fatal diagnostic
//! built from the variant's `Display` text.
use std::ops::Range;

use strum::EnumIs;
use thiserror::Error;

/// Coarse classification of evaluation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unknown identifiers, malformed names, non-literal input.
    Syntax,
    /// Wrong number of parameters.
    Arity,
    /// Values that are well-formed but meaningless for the requested node.
    Domain,
    /// Self-referential or looping property chains.
    Graph,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum EvalError {
    /// The identifier does not name any node of the catalog.
    #[error("Expression did not evaluate to a known generator expression")]
    UnknownExpression,

    #[error("$<{identifier}> expression requires a parameter.")]
    RequiresParameter { identifier: String },

    #[error("$<{identifier}> expression requires no parameters.")]
    RequiresNoParameters { identifier: String },

    #[error("$<{identifier}> expression requires exactly one parameter.")]
    RequiresExactlyOneParameter { identifier: String },

    #[error(
        "$<{identifier}> expression requires {expected} comma separated parameters, but got {actual} instead."
    )]
    RequiresParameterCount {
        identifier: String,
        expected: usize,
        actual: usize,
    },

    #[error("$<{identifier}> expression requires at least one parameter.")]
    RequiresAtLeastOneParameter { identifier: String },

    #[error("$<{identifier}> expression requires one or zero parameters.")]
    RequiresOneOrZeroParameters { identifier: String },

    /// A nested expression was found where only plain text is accepted.
    #[error("$<{identifier}> expression requires literal input.")]
    RequiresLiteralInput { identifier: String },

    #[error("Parameters to $<{operator}> must resolve to either '0' or '1'.")]
    BooleanOperand { operator: &'static str },

    #[error("$<NOT> parameter must resolve to exactly one '0' or '1' value.")]
    NotOperand,

    #[error("$<EQUAL> parameter {value} is not a valid integer.")]
    InvalidInteger { value: String },

    #[error("Expression syntax not recognized.")]
    SyntaxNotRecognized,

    /// A target-scoped node was evaluated without a head target.
    #[error(
        "$<{expression}> may only be used with binary targets.  It may not be used with add_custom_command or add_custom_target."
    )]
    BinaryTargetRequired { expression: &'static str },

    #[error("$<TARGET_PROPERTY:...> expression requires one or two parameters")]
    TargetPropertyParameters,

    #[error(
        "$<TARGET_PROPERTY:prop>  may only be used with binary targets.  It may not be used with add_custom_command or add_custom_target.  Specify the target to read a property from using the $<TARGET_PROPERTY:tgt,prop> signature instead."
    )]
    TargetPropertyWithoutTarget,

    #[error(
        "$<TARGET_PROPERTY:tgt,prop> expression requires a non-empty target name and property name."
    )]
    EmptyTargetAndPropertyName,

    #[error("$<TARGET_PROPERTY:tgt,prop> expression requires a non-empty target name.")]
    EmptyTargetName,

    #[error("$<TARGET_PROPERTY:...> expression requires a non-empty property name.")]
    EmptyPropertyName,

    #[error("Target name and property name not supported.")]
    TargetAndPropertyNameNotSupported,

    #[error("Target name not supported.")]
    TargetNameNotSupported,

    #[error("Property name not supported.")]
    PropertyNameNotSupported,

    #[error("Target \"{name}\" not found.")]
    TargetNotFound { name: String },

    #[error(
        "LINKER_LANGUAGE target property can not be used while evaluating link libraries for a static library"
    )]
    LinkerLanguageInLinkLibraries,

    /// A transitive property was requested while the chain evaluates link
    /// libraries. This is an evaluation-phase recursion, not a target cycle.
    #[error(
        "$<TARGET_PROPERTY:...> expression in link libraries evaluation depends on target property which is transitive over the link libraries, creating a recursion."
    )]
    TransitivePropertyInLinkLibraries,

    #[error(
        "The evaluation of the TARGET_OBJECTS generator expression is only suitable for consumption by the build system.  It is not suitable for writing out elsewhere."
    )]
    TargetObjectsOutsideBuildsystem,

    #[error("Objects of target \"{name}\" referenced but no such target exists.")]
    ObjectsOfMissingTarget { name: String },

    #[error("Objects of target \"{name}\" referenced but is not an OBJECT library.")]
    ObjectsOfNonObjectLibrary { name: String },

    #[error(
        "$<TARGET_POLICY:prop> may only be used with a limited number of policies.  Currently it may be used with the following policies:\n{supported}"
    )]
    UnsupportedTargetPolicy { supported: String },

    #[error("INSTALL_PREFIX is a marker for install(EXPORT) only.  It should never be evaluated.")]
    InstallPrefixEvaluated,

    #[error("TARGET_SONAME_FILE is not allowed for DLL target platforms.")]
    SonameOnDllPlatform,

    #[error("TARGET_SONAME_FILE is allowed only for SHARED libraries.")]
    SonameRequiresSharedLibrary,

    #[error("TARGET_LINKER_FILE is allowed only for libraries and executables with ENABLE_EXPORTS.")]
    LinkerFileRequiresLinkable,

    #[error("No target \"{name}\"")]
    NoSuchTarget { name: String },

    #[error("Target \"{name}\" is not an executable or library.")]
    NotExecutableOrLibrary { name: String },

    #[error(
        "Expressions which require the linker language may not be used while evaluating link libraries"
    )]
    LinkerLanguageRequired,

    /// Message supplied verbatim by the target model's compile-feature queries.
    #[error("{0}")]
    CompileFeature(String),

    #[error("Self reference on target \"{target}\".")]
    SelfReference { target: String },

    #[error("Dependency loop found.")]
    DependencyLoop,

    #[error("Maximum generator expression recursion depth of {max} exceeded.")]
    RecursionLimit { max: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl EvalError {
    pub fn category(&self) -> ErrorCategory {
        use EvalError::*;
        match self {
            UnknownExpression
            | RequiresLiteralInput { .. }
            | SyntaxNotRecognized
            | TargetAndPropertyNameNotSupported
            | TargetNameNotSupported
            | PropertyNameNotSupported
            | EmptyTargetAndPropertyName
            | EmptyTargetName
            | EmptyPropertyName
            | Parse(_) => ErrorCategory::Syntax,
            RequiresParameter { .. }
            | RequiresNoParameters { .. }
            | RequiresExactlyOneParameter { .. }
            | RequiresParameterCount { .. }
            | RequiresAtLeastOneParameter { .. }
            | RequiresOneOrZeroParameters { .. }
            | TargetPropertyParameters => ErrorCategory::Arity,
            SelfReference { .. }
            | DependencyLoop
            | RecursionLimit { .. }
            | TransitivePropertyInLinkLibraries => ErrorCategory::Graph,
            _ => ErrorCategory::Domain,
        }
    }
}

/// Failure to turn raw text into an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse generator expression at {}..{}: {message}", span.start, span.end)]
pub struct ParseError {
    pub span: Range<usize>,
    pub message: String,
}

/// Failure to load evaluator options or a project description.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading '{file}': {source}")]
    Io {
        source: std::io::Error,
        file: String,
    },

    #[error("Failed to parse '{file}': {source}")]
    Toml {
        source: toml::de::Error,
        file: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
