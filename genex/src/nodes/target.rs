//! Target-scoped nodes: properties, names, objects and policies.
use std::str::FromStr;

use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::error::EvalError;
use crate::expression::ExpressionContent;
use crate::model::{Target, TargetType};
use crate::nodes::{Arity, GeneratorNode};
use crate::policy::{PolicyId, PolicyStatus};
use crate::transitive;
use crate::utils::{is_valid_property_name, is_valid_target_name};

/// `$<TARGET_PROPERTY:[tgt,]prop>`.
pub struct TargetProperty;

/// `$<TARGET_NAME:tgt>`: marks a literal target name for export.
pub struct TargetName;

/// `$<TARGET_OBJECTS:objlib>`.
pub struct TargetObjects;

/// `$<TARGET_POLICY:CMPxxxx>`.
pub struct TargetPolicy;

/// `$<INSTALL_PREFIX>`: only meaningful to install(EXPORT).
pub struct InstallPrefix;

/// `$<LINK_ONLY:...>`: content used for linking but not for usage requirements.
pub struct LinkOnly;

pub static TARGET_PROPERTY: TargetProperty = TargetProperty;
pub static TARGET_NAME: TargetName = TargetName;
pub static TARGET_OBJECTS: TargetObjects = TargetObjects;
pub static TARGET_POLICY: TargetPolicy = TargetPolicy;
pub static INSTALL_PREFIX: InstallPrefix = InstallPrefix;
pub static LINK_ONLY: LinkOnly = LinkOnly;

pub(crate) fn same_target(lhs: &dyn Target, rhs: &dyn Target) -> bool {
    lhs.name() == rhs.name()
}

impl GeneratorNode for TargetProperty {
    // The parameter count gets its own messages below.
    fn arity(&self) -> Arity {
        Arity::OneOrMore
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        let expression = content.original_expression();
        if parameters.len() > 2 {
            context.report_error(expression, EvalError::TargetPropertyParameters);
            return String::new();
        }

        let makefile = context.makefile;
        let mut target = context.head_target;
        let mut property = parameters[0].as_str();

        if target.is_none() && parameters.len() == 1 {
            context.report_error(expression, EvalError::TargetPropertyWithoutTarget);
            return String::new();
        }

        if let [name, second] = parameters {
            if name.is_empty() && second.is_empty() {
                context.report_error(expression, EvalError::EmptyTargetAndPropertyName);
                return String::new();
            }
            if name.is_empty() {
                context.report_error(expression, EvalError::EmptyTargetName);
                return String::new();
            }
            property = second.as_str();
            if !is_valid_target_name(name) {
                let error = if is_valid_property_name(property) {
                    EvalError::TargetNameNotSupported
                } else {
                    EvalError::TargetAndPropertyNameNotSupported
                };
                context.report_error(expression, error);
                return String::new();
            }
            if property == "ALIASED_TARGET" {
                if makefile.is_alias(name)
                    && let Some(aliased) = makefile.find_target(name)
                {
                    return aliased.name().to_string();
                }
                return String::new();
            }
            let Some(found) = makefile.find_target(name) else {
                context.report_error(expression, EvalError::TargetNotFound { name: name.clone() });
                return String::new();
            };
            context.all_targets.insert(found.name().to_string());
            target = Some(found);
        }

        let Some(target) = target else {
            return String::new();
        };

        if context.head_target.is_some_and(|head| same_target(head, target)) {
            context.seen_target_properties.insert(property.to_string());
        }

        if property.is_empty() {
            context.report_error(expression, EvalError::EmptyPropertyName);
            return String::new();
        }
        if !is_valid_property_name(property) {
            context.report_error(expression, EvalError::PropertyNameNotSupported);
            return String::new();
        }

        if property == "LINKER_LANGUAGE" {
            if target.link_language_propagates_to_dependents()
                && dag.is_some_and(|d| d.evaluating_link_libraries(None) || d.evaluating_sources())
            {
                context.report_error(expression, EvalError::LinkerLanguageInLinkLibraries);
                return String::new();
            }
            return target.linker_language(&context.config);
        }

        transitive::resolve_property(target, property, context, content, dag)
    }
}

impl GeneratorNode for TargetName {
    fn accepts_arbitrary_content(&self) -> bool {
        true
    }

    fn requires_literal_input(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        parameters[0].clone()
    }
}

impl GeneratorNode for TargetObjects {
    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        let expression = content.original_expression();
        if !context.evaluate_for_buildsystem {
            context.report_error(expression, EvalError::TargetObjectsOutsideBuildsystem);
            return String::new();
        }

        let name = &parameters[0];
        let makefile = context.makefile;
        let Some(target) = makefile.find_target(name) else {
            context.report_error(
                expression,
                EvalError::ObjectsOfMissingTarget { name: name.clone() },
            );
            return String::new();
        };
        if target.target_type() != TargetType::ObjectLibrary {
            context.report_error(
                expression,
                EvalError::ObjectsOfNonObjectLibrary { name: name.clone() },
            );
            return String::new();
        }
        target.object_files(&context.config).join(";")
    }
}

impl GeneratorNode for TargetPolicy {
    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        let Some(head) = context.head_target else {
            context.report_error(
                content.original_expression(),
                EvalError::BinaryTargetRequired {
                    expression: "TARGET_POLICY:prop",
                },
            );
            return String::new();
        };
        context.had_context_sensitive_condition = true;

        let policy = PolicyId::from_str(&parameters[0])
            .ok()
            .filter(|policy| policy.is_target_policy());
        let Some(policy) = policy else {
            context.report_error(
                content.original_expression(),
                EvalError::UnsupportedTargetPolicy {
                    supported: PolicyId::target_policy_list(),
                },
            );
            return String::new();
        };

        let status = head.policy_status(policy);
        match status {
            PolicyStatus::New => "1".to_string(),
            PolicyStatus::Old => "0".to_string(),
            PolicyStatus::Warn => {
                context.warn_policy(policy, status);
                "0".to_string()
            }
        }
    }
}

impl GeneratorNode for InstallPrefix {
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }

    fn evaluate(
        &self,
        _parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        context.report_error(content.original_expression(), EvalError::InstallPrefixEvaluated);
        String::new()
    }
}

impl GeneratorNode for LinkOnly {
    fn evaluate(
        &self,
        parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        if dag.is_some_and(|d| d.transitive_properties_only()) {
            String::new()
        } else {
            parameters[0].clone()
        }
    }
}
