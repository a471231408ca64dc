//! Transitive usage requirements.
//!
//! A handful of properties (`INCLUDE_DIRECTORIES`, `COMPILE_OPTIONS`, ...)
//! have an `INTERFACE_` twin that a target publishes to its consumers.
//! Reading such a property folds in the `INTERFACE_` value of every target
//! the owner links to, by synthesizing `$<TARGET_PROPERTY:dep,INTERFACE_X>`
//! expressions and evaluating them under the owner's [`DagChecker`].
use std::str::FromStr;

use log::debug;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::context::EvaluationContext;
use crate::dag::{DagCheckResult, DagChecker};
use crate::error::EvalError;
use crate::expression::{CompiledExpression, ExpressionContent};
use crate::model::{DependentPropertyKind, Target, TargetType};
use crate::nodes::target::same_target;
use crate::policy::PolicyId;
use crate::utils::strip_empty_list_elements;

/// Properties whose `INTERFACE_` form propagates over link dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitiveProperty {
    IncludeDirectories,
    SystemIncludeDirectories,
    CompileDefinitions,
    CompileOptions,
    AutouicOptions,
    Sources,
    CompileFeatures,
}

impl TransitiveProperty {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn interface_name(self) -> &'static str {
        match self {
            TransitiveProperty::IncludeDirectories => "INTERFACE_INCLUDE_DIRECTORIES",
            TransitiveProperty::SystemIncludeDirectories => "INTERFACE_SYSTEM_INCLUDE_DIRECTORIES",
            TransitiveProperty::CompileDefinitions => "INTERFACE_COMPILE_DEFINITIONS",
            TransitiveProperty::CompileOptions => "INTERFACE_COMPILE_OPTIONS",
            TransitiveProperty::AutouicOptions => "INTERFACE_AUTOUIC_OPTIONS",
            TransitiveProperty::Sources => "INTERFACE_SOURCES",
            TransitiveProperty::CompileFeatures => "INTERFACE_COMPILE_FEATURES",
        }
    }

    /// Match either the plain or the `INTERFACE_` form.
    pub fn from_property(name: &str) -> Option<Self> {
        let bare = name.strip_prefix("INTERFACE_").unwrap_or(name);
        Self::from_str(bare).ok()
    }

    /// Match the `INTERFACE_` form only.
    pub fn from_interface_name(name: &str) -> Option<Self> {
        name.strip_prefix("INTERFACE_")
            .and_then(|bare| Self::from_str(bare).ok())
    }
}

/// The transitive property `property` folds in, if any.
///
/// `COMPILE_DEFINITIONS_<CONFIG>` still folds the interface compile
/// definitions unless CMP0043 is set to NEW.
fn folded_property(property: &str, context: &EvaluationContext<'_>) -> Option<TransitiveProperty> {
    TransitiveProperty::from_property(property).or_else(|| {
        (property.starts_with("COMPILE_DEFINITIONS_")
            && !context.makefile.policy_status(PolicyId::Cmp0043).is_new())
        .then_some(TransitiveProperty::CompileDefinitions)
    })
}

/// Parse and evaluate `text` as part of the ongoing evaluation, scoped to
/// `head`/`current`.
fn evaluate_nested<'a>(
    text: &str,
    head: &'a dyn Target,
    current: &'a dyn Target,
    context: &mut EvaluationContext<'a>,
    checker: &DagChecker<'_>,
) -> String {
    match CompiledExpression::parse(text) {
        Ok(compiled) => context.scoped(Some(head), Some(current), |context| {
            compiled.evaluate_in(context, Some(checker))
        }),
        Err(error) => {
            context.report_error(text, EvalError::Parse(error));
            String::new()
        }
    }
}

/// `INTERFACE_X` of every dependency of `target`, `;`-joined.
///
/// Dependencies that do not resolve to a target are skipped, and so is
/// `target` itself when it appears in its own link interface.
pub fn linked_targets_content<'a>(
    dependencies: &[String],
    target: &'a dyn Target,
    head: &'a dyn Target,
    context: &mut EvaluationContext<'a>,
    checker: &DagChecker<'_>,
    interface: TransitiveProperty,
) -> String {
    let makefile = context.makefile;
    let expression = dependencies
        .iter()
        .filter_map(|name| makefile.find_target(name))
        .filter(|dependency| !same_target(*dependency, target))
        .map(|dependency| {
            format!(
                "$<TARGET_PROPERTY:{},{}>",
                dependency.name(),
                interface.interface_name()
            )
        })
        .collect::<Vec<_>>()
        .join(";");
    if expression.is_empty() {
        return String::new();
    }
    debug!("folding {} of '{}': {expression}", interface.interface_name(), target.name());
    evaluate_nested(&expression, head, target, context, checker)
}

/// Value of `property` on `target` with transitive usage requirements,
/// link-interface-dependent aggregation and cycle handling applied.
pub fn resolve_property<'a>(
    target: &'a dyn Target,
    property: &str,
    context: &mut EvaluationContext<'a>,
    content: &ExpressionContent,
    parent: Option<&DagChecker<'_>>,
) -> String {
    let expression = content.original_expression();
    let checker = DagChecker::new(
        target.name(),
        property,
        Some(expression),
        context.backtrace.clone(),
        parent,
    );
    match checker.check() {
        DagCheckResult::SelfReference => {
            checker.report_error(context, expression);
            return String::new();
        }
        DagCheckResult::CyclicReference => return String::new(),
        // Nothing new to fold in.
        DagCheckResult::AlreadySeen
            if TransitiveProperty::from_interface_name(property).is_some() =>
        {
            return String::new();
        }
        DagCheckResult::AlreadySeen | DagCheckResult::Dag => {}
    }

    let direct = target.property(property);
    if parent.is_some_and(|p| p.evaluating_link_libraries(None)) {
        if TransitiveProperty::from_property(property).is_some() {
            context.report_error(expression, EvalError::TransitivePropertyInLinkLibraries);
            return String::new();
        }
        if direct.is_none() {
            return String::new();
        }
    }

    let config = context.config.clone();
    let head = context.head_target.unwrap_or(target);
    let folded = folded_property(property, context);

    let linked = match folded {
        Some(interface) if TransitiveProperty::from_interface_name(property).is_some() => {
            let dependencies = target.transitive_property_targets(&config, head);
            linked_targets_content(&dependencies, target, head, context, &checker, interface)
        }
        Some(interface) => match target.link_implementation_libraries(&config) {
            Some(libraries) => {
                linked_targets_content(&libraries, target, head, context, &checker, interface)
            }
            None => String::new(),
        },
        None => String::new(),
    };
    let linked = strip_empty_list_elements(&linked);

    let Some(direct) = direct else {
        if target.is_imported() || target.target_type() == TargetType::InterfaceLibrary {
            return linked;
        }
        for kind in DependentPropertyKind::ALL {
            if let Some(value) = target.link_interface_dependent_property(kind, property, &config) {
                context.had_context_sensitive_condition = true;
                return value;
            }
        }
        return linked;
    };

    if !target.is_imported() && parent.is_some_and(|p| !p.evaluating_link_libraries(None)) {
        for kind in [DependentPropertyKind::NumberMin, DependentPropertyKind::NumberMax] {
            if let Some(value) = target.link_interface_dependent_property(kind, property, &config) {
                context.had_context_sensitive_condition = true;
                return value;
            }
        }
    }

    if folded.is_none() {
        return direct.to_string();
    }
    let mut result = evaluate_nested(direct, head, target, context, &checker);
    if !linked.is_empty() {
        if !result.is_empty() {
            result.push(';');
        }
        result.push_str(&linked);
    }
    result
}
