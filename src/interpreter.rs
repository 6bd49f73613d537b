use crate::environment::Environment;
use crate::evaluator::evaluate;
use crate::parser::{ParseError, parse_str};
use crate::types::{Expression, Node};
use thiserror::Error;
use tracing::{debug, error};

/// Returned by [`Interpreter::eval`] when no program is ready or the stored
/// program fails to evaluate. The underlying cause is logged, not carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("evaluation failed")]
pub struct EvaluationFailed;

/// Ties the pipeline together. Owns the environment, which persists across
/// programs, and the most recently parsed program tree.
#[derive(Debug, Default)]
pub struct Interpreter {
    env: Environment,
    ast: Option<Node>,
    last_parse_error: Option<ParseError>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and stores the resulting program for [`Interpreter::eval`].
    /// On failure the previously stored program is kept unchanged and the
    /// error is retained for diagnostics.
    pub fn parse(&mut self, text: &str) -> bool {
        match parse_str(text) {
            Ok(ast) => {
                self.ast = Some(ast);
                self.last_parse_error = None;
                true
            }
            Err(parse_error) => {
                debug!("parse failed: {parse_error}");
                self.last_parse_error = Some(parse_error);
                false
            }
        }
    }

    /// Evaluates the stored program against the persistent environment.
    /// Definitions made by earlier evaluations stay visible, including those
    /// made by a program that later failed part-way.
    pub fn eval(&mut self) -> Result<Expression, EvaluationFailed> {
        let Some(ast) = &self.ast else {
            error!("nothing to evaluate, no program has parsed successfully");
            return Err(EvaluationFailed);
        };
        match evaluate(ast, &mut self.env) {
            Ok(value) => Ok(value),
            Err(eval_error) => {
                error!("evaluation failed: {eval_error}");
                Err(EvaluationFailed)
            }
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The error behind the most recent [`Interpreter::parse`] returning
    /// false, until a later parse succeeds.
    pub fn last_parse_error(&self) -> Option<&ParseError> {
        self.last_parse_error.as_ref()
    }
}
