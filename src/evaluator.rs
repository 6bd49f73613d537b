use crate::environment::{EnvError, Environment};
use crate::types::{Expression, Node};
use thiserror::Error;

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("operator '{operator}' expected a number operand")]
    ExpectedNumber { operator: String },
    #[error("operator '{operator}' expected a boolean operand")]
    ExpectedBoolean { operator: String },
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
}

// Result type alias for convenience
pub type EvalResult<T = Expression> = Result<T, EvalError>;

/// The fixed operator vocabulary. These names dispatch in [`evaluate`] and
/// can never be bound in an [`Environment`].
pub const OPERATOR_KEYWORDS: [&str; 15] = [
    "not", "and", "or", "<", "<=", ">", ">=", "=", "+", "-", "*", "/", "define", "begin", "if",
];

pub fn is_operator_keyword(name: &str) -> bool {
    OPERATOR_KEYWORDS.contains(&name)
}

/// All operator keywords; the REPL completer offers these next to bound names.
pub fn operator_keywords() -> impl Iterator<Item = &'static str> {
    OPERATOR_KEYWORDS.iter().copied()
}

// --- Evaluate Function ---

/// Evaluates an AST node against the environment.
///
/// Evaluation is eager and non-short-circuiting: every child is evaluated
/// first, left to right, and only then does the operator run on the
/// materialized argument list. A childless node is its own payload, verbatim;
/// a bare symbol leaf comes back *unresolved*, and whichever operator
/// consumes it resolves it one level deep.
pub fn evaluate(node: &Node, env: &mut Environment) -> EvalResult {
    if node.children.is_empty() {
        return Ok(node.data.clone());
    }

    let operator = node.data.as_symbol()?;
    let mut args = Vec::with_capacity(node.children.len());
    for child in &node.children {
        args.push(evaluate(child, env)?);
    }
    apply_operator(operator, &args, env)
}

fn apply_operator(operator: &str, args: &[Expression], env: &mut Environment) -> EvalResult {
    match operator {
        "+" => prim_fold_numbers(args, env, 0.0, |acc, n| acc + n, "+"),
        "*" => prim_fold_numbers(args, env, 1.0, |acc, n| acc * n, "*"),
        "-" => prim_sub(args, env),
        "/" => prim_div(args, env),
        "<" => prim_compare(args, env, |a, b| a < b, "<"),
        "<=" => prim_compare(args, env, |a, b| a <= b, "<="),
        ">" => prim_compare(args, env, |a, b| a > b, ">"),
        ">=" => prim_compare(args, env, |a, b| a >= b, ">="),
        "=" => prim_compare(args, env, |a, b| a == b, "="),
        "and" => prim_fold_booleans(args, env, |acc, b| acc && b, "and"),
        "or" => prim_fold_booleans(args, env, |acc, b| acc || b, "or"),
        "not" => prim_not(args, env),
        "if" => prim_if(args, env),
        "define" => prim_define(args, env),
        "begin" => prim_begin(args, env),
        _ => Err(EvalError::UnknownOperator(operator.to_string())),
    }
}

// --- Operand resolution ---

// An operand is either a literal of the required tag or a symbol resolved
// one level deep. Failures, an unbound symbol included, report against the
// operator that needed the value.
fn resolve_number(arg: &Expression, env: &Environment, operator: &str) -> EvalResult<f64> {
    match arg {
        Expression::Number(n) => Ok(*n),
        Expression::Symbol(name) => match env.get(name) {
            Ok(Expression::Number(n)) => Ok(n),
            _ => Err(EvalError::ExpectedNumber {
                operator: operator.to_string(),
            }),
        },
        _ => Err(EvalError::ExpectedNumber {
            operator: operator.to_string(),
        }),
    }
}

fn resolve_boolean(arg: &Expression, env: &Environment, operator: &str) -> EvalResult<bool> {
    match arg {
        Expression::Boolean(b) => Ok(*b),
        Expression::Symbol(name) => match env.get(name) {
            Ok(Expression::Boolean(b)) => Ok(b),
            _ => Err(EvalError::ExpectedBoolean {
                operator: operator.to_string(),
            }),
        },
        _ => Err(EvalError::ExpectedBoolean {
            operator: operator.to_string(),
        }),
    }
}

// --- Primitive operators ---

fn prim_fold_numbers<F: Fn(f64, f64) -> f64>(
    args: &[Expression],
    env: &Environment,
    start: f64,
    func: F,
    operator: &str,
) -> EvalResult {
    if args.len() < 2 {
        return Err(EvalError::ExpectedNumber {
            operator: operator.to_string(),
        });
    }
    let mut acc = start;
    for arg in args {
        acc = func(acc, resolve_number(arg, env, operator)?);
    }
    Ok(Expression::Number(acc))
}

fn prim_sub(args: &[Expression], env: &Environment) -> EvalResult {
    // (- x) negates, (- x y) subtracts; anything longer is rejected
    match args {
        [only] => Ok(Expression::Number(-resolve_number(only, env, "-")?)),
        [minuend, subtrahend] => Ok(Expression::Number(
            resolve_number(minuend, env, "-")? - resolve_number(subtrahend, env, "-")?,
        )),
        _ => Err(EvalError::ExpectedNumber {
            operator: "-".to_string(),
        }),
    }
}

fn prim_div(args: &[Expression], env: &Environment) -> EvalResult {
    let [dividend, divisor] = args else {
        return Err(EvalError::ExpectedNumber {
            operator: "/".to_string(),
        });
    };
    // Division by zero follows IEEE-754: ±inf or NaN, never an error
    Ok(Expression::Number(
        resolve_number(dividend, env, "/")? / resolve_number(divisor, env, "/")?,
    ))
}

fn prim_compare<F: Fn(f64, f64) -> bool>(
    args: &[Expression],
    env: &Environment,
    compare: F,
    operator: &str,
) -> EvalResult {
    let [left, right] = args else {
        return Err(EvalError::ExpectedNumber {
            operator: operator.to_string(),
        });
    };
    Ok(Expression::Boolean(compare(
        resolve_number(left, env, operator)?,
        resolve_number(right, env, operator)?,
    )))
}

fn prim_fold_booleans<F: Fn(bool, bool) -> bool>(
    args: &[Expression],
    env: &Environment,
    func: F,
    operator: &str,
) -> EvalResult {
    if args.len() < 2 {
        return Err(EvalError::ExpectedBoolean {
            operator: operator.to_string(),
        });
    }
    // Every operand is validated, the seed included
    let mut acc = resolve_boolean(&args[0], env, operator)?;
    for arg in &args[1..] {
        acc = func(acc, resolve_boolean(arg, env, operator)?);
    }
    Ok(Expression::Boolean(acc))
}

fn prim_not(args: &[Expression], env: &Environment) -> EvalResult {
    let [operand] = args else {
        return Err(EvalError::ExpectedBoolean {
            operator: "not".to_string(),
        });
    };
    Ok(Expression::Boolean(!resolve_boolean(operand, env, "not")?))
}

fn prim_if(args: &[Expression], env: &Environment) -> EvalResult {
    let [condition, consequent, alternate] = args else {
        return Err(EvalError::ExpectedBoolean {
            operator: "if".to_string(),
        });
    };
    // Both branches already ran during argument evaluation; this only picks
    // which value to return. The pick comes back verbatim, so a bare symbol
    // branch stays unresolved.
    if resolve_boolean(condition, env, "if")? {
        Ok(consequent.clone())
    } else {
        Ok(alternate.clone())
    }
}

fn prim_define(args: &[Expression], env: &mut Environment) -> EvalResult {
    let [name_arg, value_arg] = args else {
        return Err(EvalError::TypeMismatch {
            expected: "symbol",
            found: "none",
        });
    };
    let name = name_arg.as_symbol()?;
    let value = match value_arg {
        Expression::Boolean(_) | Expression::Number(_) => value_arg.clone(),
        Expression::Symbol(other) => env.get(other)?,
        other => {
            return Err(EvalError::TypeMismatch {
                expected: "number, boolean, or symbol",
                found: other.type_name(),
            });
        }
    };
    env.define(name, value.clone())?;
    Ok(value)
}

fn prim_begin(args: &[Expression], env: &Environment) -> EvalResult {
    // Earlier arguments already ran for their effects; only the last one is
    // returned, resolved first if it is a bare symbol
    match args.last() {
        Some(Expression::Symbol(name)) => Ok(env.get(name)?),
        Some(last) => Ok(last.clone()),
        None => Ok(Expression::None),
    }
}
