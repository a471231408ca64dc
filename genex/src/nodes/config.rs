//! Configuration and platform queries.
use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::error::EvalError;
use crate::expression::ExpressionContent;
use crate::nodes::{Arity, GeneratorNode};
use crate::utils::{expand_list, is_identifier_or_empty};

pub struct Configuration;
pub struct ConfigTest;
pub struct PlatformId;

pub static CONFIGURATION: Configuration = Configuration;
pub static CONFIG: ConfigTest = ConfigTest;
pub static PLATFORM_ID: PlatformId = PlatformId;

impl GeneratorNode for Configuration {
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }

    fn evaluate(
        &self,
        _parameters: &[String],
        context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        context.had_context_sensitive_condition = true;
        context.config.clone()
    }
}

impl ConfigTest {
    /// Imported targets may map the active configuration onto others
    /// through `MAP_IMPORTED_CONFIG_<CONFIG>`.
    fn mapped_config_matches(context: &EvaluationContext<'_>, tested: &str) -> Option<bool> {
        let target = context.current_target.filter(|t| t.is_imported())?;
        if !target.mapped_config(&context.config) {
            return None;
        }
        let property = format!("MAP_IMPORTED_CONFIG_{}", context.config.to_ascii_uppercase());
        let mapped = target.property(&property)?;
        let tested = tested.to_ascii_uppercase();
        Some(
            expand_list(&mapped.to_ascii_uppercase())
                .iter()
                .any(|config| *config == tested),
        )
    }
}

impl GeneratorNode for ConfigTest {
    fn arity(&self) -> Arity {
        Arity::OneOrZero
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        let Some(tested) = parameters.first() else {
            return CONFIGURATION.evaluate(parameters, context, content, dag);
        };
        if !is_identifier_or_empty(tested) {
            context.report_error(content.original_expression(), EvalError::SyntaxNotRecognized);
            return String::new();
        }
        context.had_context_sensitive_condition = true;

        let matched = if context.config.is_empty() {
            tested.is_empty()
        } else if tested.eq_ignore_ascii_case(&context.config) {
            true
        } else {
            Self::mapped_config_matches(context, tested).unwrap_or(false)
        };
        if matched { "1" } else { "0" }.to_string()
    }
}

impl GeneratorNode for PlatformId {
    fn arity(&self) -> Arity {
        Arity::OneOrZero
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        let platform = context.makefile.definition("CMAKE_SYSTEM_NAME").unwrap_or_default();
        match parameters.first() {
            None => platform.to_string(),
            Some(tested) if tested == platform => "1".to_string(),
            Some(_) => "0".to_string(),
        }
    }
}
