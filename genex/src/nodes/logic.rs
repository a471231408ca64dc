//! Boolean markers, combinators and comparisons.
use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::error::EvalError;
use crate::expression::ExpressionContent;
use crate::nodes::{Arity, GeneratorNode};
use crate::utils::{is_off, parse_integer};

/// `$<0:...>`: drops its content.
pub struct Zero;

/// `$<1:...>`: keeps its content, commas included.
pub struct One;

/// `$<AND:...>` / `$<OR:...>`: the first operand equal to `dominant`
/// decides the result.
pub struct Combinator {
    operator: &'static str,
    dominant: &'static str,
    neutral: &'static str,
}

pub struct Not;
pub struct Bool;
pub struct StrEqual;
pub struct Equal;

pub static ZERO: Zero = Zero;
pub static ONE: One = One;
pub static AND: Combinator = Combinator {
    operator: "AND",
    dominant: "0",
    neutral: "1",
};
pub static OR: Combinator = Combinator {
    operator: "OR",
    dominant: "1",
    neutral: "0",
};
pub static NOT: Not = Not;
pub static BOOL: Bool = Bool;
pub static STREQUAL: StrEqual = StrEqual;
pub static EQUAL: Equal = Equal;

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

impl GeneratorNode for Zero {
    fn generates_content(&self) -> bool {
        false
    }

    fn accepts_arbitrary_content(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        _parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        String::new()
    }
}

impl GeneratorNode for One {
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
        parameters[0].clone()
    }
}

impl GeneratorNode for Combinator {
    fn arity(&self) -> Arity {
        Arity::OneOrMore
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        for parameter in parameters {
            if parameter == self.dominant {
                return self.dominant.to_string();
            }
            if parameter != self.neutral {
                context.report_error(
                    content.original_expression(),
                    EvalError::BooleanOperand {
                        operator: self.operator,
                    },
                );
                return String::new();
            }
        }
        self.neutral.to_string()
    }
}

impl GeneratorNode for Not {
    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        match parameters[0].as_str() {
            "0" => "1".to_string(),
            "1" => "0".to_string(),
            _ => {
                context.report_error(content.original_expression(), EvalError::NotOperand);
                String::new()
            }
        }
    }
}

impl GeneratorNode for Bool {
    fn evaluate(
        &self,
        parameters: &[String],
        _context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        flag(!is_off(&parameters[0]))
    }
}

impl GeneratorNode for StrEqual {
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
        flag(parameters[0] == parameters[1])
    }
}

impl GeneratorNode for Equal {
    fn arity(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        let mut values = [0i64; 2];
        for (value, parameter) in values.iter_mut().zip(parameters) {
            match parse_integer(parameter) {
                Some(parsed) => *value = parsed,
                None => {
                    context.report_error(
                        content.original_expression(),
                        EvalError::InvalidInteger {
                            value: parameter.clone(),
                        },
                    );
                    return String::new();
                }
            }
        }
        flag(values[0] == values[1])
    }
}
