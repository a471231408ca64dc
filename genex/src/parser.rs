//! Parser for generator-expression text using chumsky.
//!
//! Grammar:
//! - Outside an expression everything is literal text, except `$<` which
//!   opens an expression.
//! - The identifier runs up to the first `:` or `>`.
//! - After `:` come parameters separated by `,` up to the closing `>`.
//!   `:` is literal inside parameters; `$<ID:>` has one empty parameter.
//! - Expressions nest anywhere in identifiers and parameters.
//! - A `$<` that is never closed is kept as literal text.
//!
//! Parsing is a single pass: chumsky splits the input into tokens and an
//! explicit stack of open expressions assembles the tree. Adjacent text
//! fragments are merged, so a tree never holds two consecutive
//! [`Evaluator::Text`] nodes.
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::expression::{CompiledExpression, Evaluator, ExpressionContent};

type Extra<'a> = extra::Err<Rich<'a, char>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Colon,
    Comma,
    Text(&'a str),
}

/// Split the input into openers, separators and runs of plain text.
/// Every character belongs to some token, so lexing never fails on
/// well-formed UTF-8.
fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<(Token<'a>, SimpleSpan)>, Extra<'a>> {
    let token = choice((
        just("$<").to(Token::Open),
        just('>').to(Token::Close),
        just(':').to(Token::Colon),
        just(',').to(Token::Comma),
        none_of(":,>")
            .and_is(just("$<").not())
            .repeated()
            .at_least(1)
            .to_slice()
            .map(Token::Text),
    ));
    token
        .map_with(|token, e| (token, e.span()))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

/// Append `evaluator`, merging it into a preceding text fragment.
fn push(list: &mut Vec<Evaluator>, evaluator: Evaluator) {
    match (list.last_mut(), evaluator) {
        (Some(Evaluator::Text(previous)), Evaluator::Text(next)) => previous.push_str(&next),
        (_, evaluator) => list.push(evaluator),
    }
}

fn push_text(list: &mut Vec<Evaluator>, text: &str) {
    push(list, Evaluator::Text(text.to_string()));
}

/// An expression whose closing `>` has not been seen yet.
struct Frame {
    start: usize,
    identifier: Vec<Evaluator>,
    /// `None` until the `:` that ends the identifier.
    parameters: Option<Vec<Vec<Evaluator>>>,
}

impl Frame {
    fn new(start: usize) -> Self {
        Self {
            start,
            identifier: Vec::new(),
            parameters: None,
        }
    }

    fn current(&mut self) -> &mut Vec<Evaluator> {
        match &mut self.parameters {
            Some(parameters) => match parameters.last_mut() {
                Some(parameter) => parameter,
                None => &mut self.identifier,
            },
            None => &mut self.identifier,
        }
    }

    fn close(self, input: &str, end: usize) -> ExpressionContent {
        ExpressionContent::new(
            &input[self.start..end],
            self.start..end,
            self.identifier,
            self.parameters.unwrap_or_default(),
        )
    }

    /// The fragments of an unclosed expression, read back as text with
    /// any closed inner expressions kept.
    fn into_text(self) -> Vec<Evaluator> {
        let mut parts = vec![Evaluator::Text("$<".to_string())];
        for part in self.identifier {
            push(&mut parts, part);
        }
        if let Some(parameters) = self.parameters {
            push_text(&mut parts, ":");
            for (index, parameter) in parameters.into_iter().enumerate() {
                if index > 0 {
                    push_text(&mut parts, ",");
                }
                for part in parameter {
                    push(&mut parts, part);
                }
            }
        }
        parts
    }
}

/// Build the evaluator list in one pass over the tokens.
fn assemble(input: &str, tokens: Vec<(Token<'_>, SimpleSpan)>) -> Vec<Evaluator> {
    let mut output = Vec::new();
    let mut open: Vec<Frame> = Vec::new();

    for (token, span) in tokens {
        let Some(frame) = open.last_mut() else {
            match token {
                Token::Open => open.push(Frame::new(span.start)),
                Token::Text(text) => push_text(&mut output, text),
                Token::Close => push_text(&mut output, ">"),
                Token::Colon => push_text(&mut output, ":"),
                Token::Comma => push_text(&mut output, ","),
            }
            continue;
        };
        match token {
            Token::Open => open.push(Frame::new(span.start)),
            Token::Text(text) => push_text(frame.current(), text),
            Token::Colon if frame.parameters.is_none() => frame.parameters = Some(vec![Vec::new()]),
            Token::Colon => push_text(frame.current(), ":"),
            Token::Comma => match &mut frame.parameters {
                Some(parameters) => parameters.push(Vec::new()),
                None => push_text(&mut frame.identifier, ","),
            },
            Token::Close => {
                if let Some(frame) = open.pop() {
                    let content = Evaluator::Content(Box::new(frame.close(input, span.end)));
                    match open.last_mut() {
                        Some(parent) => push(parent.current(), content),
                        None => push(&mut output, content),
                    }
                }
            }
        }
    }

    // Each unclosed expression was opened at the end of the one below it,
    // so flattening from the outermost keeps the source order.
    for frame in open {
        for part in frame.into_text() {
            push(&mut output, part);
        }
    }
    output
}

/// Parse `input` into a [`CompiledExpression`].
pub fn parse(input: &str) -> Result<CompiledExpression, ParseError> {
    let (tokens, errors) = lexer().parse(input).into_output_errors();
    if let Some(error) = errors.into_iter().next() {
        let span = error.span();
        return Err(ParseError {
            span: span.start..span.end,
            message: error.to_string(),
        });
    }
    let evaluators = assemble(input, tokens.unwrap_or_default());
    Ok(CompiledExpression::from_parts(input, evaluators))
}
