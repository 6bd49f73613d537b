use crate::evaluator::{EvalError, EvalResult};
use std::fmt; // For custom display formatting

/// A value of the language. One payload per tag; code (AST payloads) and
/// computed results share this type.
///
/// `List` only ever appears inside the parser, as the flattening container
/// for the tokens of the top-level form. Primitives never receive one.
#[derive(Debug, Clone, Default)]
pub enum Expression {
    #[default]
    None,
    Boolean(bool),
    Number(f64),
    Symbol(String), // identifiers, operator names, and the "("/")" markers
    List(Vec<Expression>),
}

impl Expression {
    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::None => "none",
            Expression::Boolean(_) => "boolean",
            Expression::Number(_) => "number",
            Expression::Symbol(_) => "symbol",
            Expression::List(_) => "list",
        }
    }

    pub fn as_number(&self) -> EvalResult<f64> {
        match self {
            Expression::Number(n) => Ok(*n),
            other => Err(EvalError::TypeMismatch {
                expected: "number",
                found: other.type_name(),
            }),
        }
    }

    pub fn as_boolean(&self) -> EvalResult<bool> {
        match self {
            Expression::Boolean(b) => Ok(*b),
            other => Err(EvalError::TypeMismatch {
                expected: "boolean",
                found: other.type_name(),
            }),
        }
    }

    pub fn as_symbol(&self) -> EvalResult<&str> {
        match self {
            Expression::Symbol(name) => Ok(name),
            other => Err(EvalError::TypeMismatch {
                expected: "symbol",
                found: other.type_name(),
            }),
        }
    }
}

/// Equality only holds within a tag: two booleans, two numbers, or two
/// symbols. Every other combination is unequal, `List == List` and
/// `None == None` included. A deliberate simplification; nothing in the
/// language compares lists.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expression::Boolean(a), Expression::Boolean(b)) => a == b,
            (Expression::Number(a), Expression::Number(b)) => a == b,
            (Expression::Symbol(a), Expression::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

// Implement Display for the rendering the drivers print: numbers in decimal,
// booleans as true/false, symbols by name, List/None as placeholders.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::None => write!(f, "None"),
            Expression::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Symbol(s) => write!(f, "{}", s),
            Expression::List(_) => write!(f, "()"),
        }
    }
}

/// One AST node: a payload plus its ordered children. The tree is strictly
/// owned, root to leaf; replacing the root drops the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub data: Expression,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(data: Expression) -> Self {
        Node {
            data,
            children: Vec::new(),
        }
    }

    pub fn with_children(data: Expression, children: Vec<Node>) -> Self {
        Node { data, children }
    }
}
