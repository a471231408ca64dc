//! Expression trees and the recursive evaluator.
use std::ops::Range;

use log::trace;
use smallvec::SmallVec;

use crate::context::{EvaluationContext, EvaluationOutcome};
use crate::dag::DagChecker;
use crate::error::{EvalError, ParseError};
use crate::model::{Makefile, Target};
use crate::nodes::{self, Arity, GeneratorNode};

/// Parameter list handed to a node. Almost every node takes at most two.
pub type Parameters = SmallVec<String, 4>;

/// One element of a parsed expression: literal text or a nested `$<...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluator {
    Text(String),
    Content(Box<ExpressionContent>),
}

impl Evaluator {
    pub fn is_text(&self) -> bool {
        matches!(self, Evaluator::Text(_))
    }

    pub fn evaluate(
        &self,
        context: &mut EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        match self {
            Evaluator::Text(text) => text.clone(),
            Evaluator::Content(content) => content.evaluate(context, dag),
        }
    }
}

/// One `$<identifier:param,...>` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionContent {
    original: String,
    span: Range<usize>,
    identifier: Vec<Evaluator>,
    parameters: Vec<Vec<Evaluator>>,
}

impl ExpressionContent {
    pub fn new(
        original: impl Into<String>,
        span: Range<usize>,
        identifier: Vec<Evaluator>,
        parameters: Vec<Vec<Evaluator>>,
    ) -> Self {
        Self {
            original: original.into(),
            span,
            identifier,
            parameters,
        }
    }

    /// Verbatim source text, quoted in diagnostics.
    pub fn original_expression(&self) -> &str {
        &self.original
    }

    /// Byte range of the expression in the parsed input.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn identifier(&self) -> &[Evaluator] {
        &self.identifier
    }

    pub fn parameters(&self) -> &[Vec<Evaluator>] {
        &self.parameters
    }

    pub fn evaluate(
        &self,
        context: &mut EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        if context.depth >= context.max_depth {
            let max = context.max_depth;
            context.report_error(&self.original, EvalError::RecursionLimit { max });
            return String::new();
        }
        context.depth += 1;
        let result = self.evaluate_node(context, dag);
        context.depth -= 1;
        result
    }

    fn evaluate_node(
        &self,
        context: &mut EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        let mut identifier = String::new();
        for part in &self.identifier {
            identifier.push_str(&part.evaluate(context, dag));
            if context.had_error {
                return String::new();
            }
        }
        trace!("evaluating $<{identifier}> from '{}'", self.original);

        let Some(node) = nodes::node(&identifier) else {
            context.report_error(&self.original, EvalError::UnknownExpression);
            return String::new();
        };

        if !node.generates_content() {
            if node.arity() == Arity::Exactly(1) && node.accepts_arbitrary_content() {
                if self.parameters.is_empty() {
                    context
                        .report_error(&self.original, EvalError::RequiresParameter { identifier });
                }
            } else {
                self.evaluate_parameters(node, &identifier, context, dag);
            }
            return String::new();
        }

        let Some(parameters) = self.evaluate_parameters(node, &identifier, context, dag) else {
            return String::new();
        };
        node.evaluate(&parameters, context, self, dag)
    }

    /// Evaluate the parameter groups and enforce the node's arity.
    ///
    /// Returns `None` once an error has been reported.
    fn evaluate_parameters(
        &self,
        node: &dyn GeneratorNode,
        identifier: &str,
        context: &mut EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
    ) -> Option<Parameters> {
        let arity = node.arity();
        let arbitrary_from = match arity {
            Arity::Exactly(n) if n > 0 && node.accepts_arbitrary_content() => Some(n - 1),
            _ => None,
        };

        let mut parameters = Parameters::new();
        for (index, group) in self.parameters.iter().enumerate() {
            if arbitrary_from == Some(index) {
                let last = self.process_arbitrary_content(node, identifier, context, dag, index)?;
                parameters.push(last);
                return Some(parameters);
            }
            let mut parameter = String::new();
            for part in group {
                parameter.push_str(&part.evaluate(context, dag));
                if context.had_error {
                    return None;
                }
            }
            parameters.push(parameter);
        }

        let identifier = identifier.to_string();
        let error = match arity {
            Arity::Exactly(0) if !parameters.is_empty() => {
                EvalError::RequiresNoParameters { identifier }
            }
            Arity::Exactly(1) if parameters.len() != 1 => {
                EvalError::RequiresExactlyOneParameter { identifier }
            }
            Arity::Exactly(expected) if parameters.len() != expected => {
                EvalError::RequiresParameterCount {
                    identifier,
                    expected,
                    actual: parameters.len(),
                }
            }
            Arity::OneOrMore if parameters.is_empty() => {
                EvalError::RequiresAtLeastOneParameter { identifier }
            }
            Arity::OneOrZero if parameters.len() > 1 => {
                EvalError::RequiresOneOrZeroParameters { identifier }
            }
            _ => return Some(parameters),
        };
        context.report_error(&self.original, error);
        None
    }

    /// Re-join every group from `first` on with literal commas, so the last
    /// parameter can carry comma-separated content.
    fn process_arbitrary_content(
        &self,
        node: &dyn GeneratorNode,
        identifier: &str,
        context: &mut EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
        first: usize,
    ) -> Option<String> {
        let groups = &self.parameters[first..];
        if node.requires_literal_input() && groups.iter().flatten().any(|part| !part.is_text()) {
            context.report_error(
                &self.original,
                EvalError::RequiresLiteralInput {
                    identifier: identifier.to_string(),
                },
            );
            return None;
        }

        let mut result = String::new();
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                result.push(',');
            }
            for part in group {
                result.push_str(&part.evaluate(context, dag));
                if context.had_error {
                    return None;
                }
            }
        }
        Some(result)
    }
}

/// A parsed input string, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledExpression {
    input: String,
    evaluators: Vec<Evaluator>,
}

impl CompiledExpression {
    pub(crate) fn from_parts(input: &str, evaluators: Vec<Evaluator>) -> Self {
        Self {
            input: input.to_string(),
            evaluators,
        }
    }

    /// Parse `input` into an expression tree.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse(input)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn evaluators(&self) -> &[Evaluator] {
        &self.evaluators
    }

    /// Whether the input contains at least one `$<...>` expression. Inputs
    /// without one evaluate to themselves.
    pub fn needs_evaluation(&self) -> bool {
        self.evaluators.iter().any(|e| !e.is_text())
    }

    /// Evaluate for `config` with the given target scope.
    ///
    /// `head` anchors unqualified property and compiler lookups, `current`
    /// is the target the expression text belongs to. `dag` is the checker of
    /// the property being computed, if any.
    pub fn evaluate<'a>(
        &self,
        makefile: &'a dyn Makefile,
        config: &str,
        quiet: bool,
        head: Option<&'a dyn Target>,
        current: Option<&'a dyn Target>,
        dag: Option<&DagChecker<'_>>,
    ) -> EvaluationOutcome {
        let mut context = EvaluationContext::new(makefile, config).with_targets(head, current);
        context.quiet = quiet;
        self.evaluate_with(context, dag)
    }

    /// Evaluate with a fully configured context.
    pub fn evaluate_with(
        &self,
        mut context: EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
    ) -> EvaluationOutcome {
        let output = self.evaluate_in(&mut context, dag);
        context.into_outcome(output)
    }

    /// Evaluate inside an ongoing evaluation, sharing its flags and side tables.
    pub fn evaluate_in(
        &self,
        context: &mut EvaluationContext<'_>,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        if !self.needs_evaluation() {
            return self.input.clone();
        }
        let mut output = String::new();
        for evaluator in &self.evaluators {
            output.push_str(&evaluator.evaluate(context, dag));
            if context.had_error {
                return String::new();
            }
        }
        output
    }
}
