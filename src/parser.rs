use crate::evaluator::is_operator_keyword;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::source::Span;
use crate::types::{Expression, Node};
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: Token, expected: String },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),
    #[error("invalid token '{word}'")]
    InvalidToken { word: String, span: Span },
    #[error("empty expression")]
    EmptyExpression { span: Span },
    #[error("extra input: {reason}")]
    ExtraInput { reason: &'static str, span: Span },
}

// Result type alias for convenience
type ParseResult<T> = Result<T, ParseError>;

/// Parses one top-level parenthesized form in three phases: the inner tokens
/// are flattened into a list container, the list is checked for structural
/// well-formedness, and only then is the tree built from it.
pub struct Parser {
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens }
    }

    pub fn parse(self) -> ParseResult<Node> {
        let form_span = self.form_span();
        let Expression::List(items) = self.flatten()? else {
            return Err(ParseError::EmptyExpression { span: form_span });
        };
        validate(&items, form_span)?;
        build_tree(items, form_span)
    }

    // Span of the whole input, for errors with no single offending token
    fn form_span(&self) -> Span {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::default(),
        }
    }

    /// First phase: strips the outer parens and classifies every inner token,
    /// producing the flattening container. Nested parens survive as the
    /// marker symbols `"("` and `")"` for the later phases to consume.
    fn flatten(self) -> ParseResult<Expression> {
        let Some(first) = self.tokens.first() else {
            return Err(ParseError::UnexpectedEof("'('".to_string()));
        };
        if first.kind != TokenKind::LParen {
            return Err(ParseError::UnexpectedToken {
                found: first.clone(),
                expected: "'(' to open the expression".to_string(),
            });
        }
        let [_, inner @ .., last] = &self.tokens[..] else {
            return Err(ParseError::UnexpectedEof("')'".to_string()));
        };
        if last.kind != TokenKind::RParen {
            return Err(ParseError::UnexpectedToken {
                found: last.clone(),
                expected: "')' to close the expression".to_string(),
            });
        }
        if inner.is_empty() {
            return Err(ParseError::EmptyExpression {
                span: first.span.merge(last.span),
            });
        }

        let items = inner
            .iter()
            .map(|token| match &token.kind {
                TokenKind::LParen => Ok(Expression::Symbol("(".to_string())),
                TokenKind::RParen => Ok(Expression::Symbol(")".to_string())),
                TokenKind::Atom(word) => classify_atom(word, token.span),
            })
            .collect::<ParseResult<Vec<Expression>>>()?;
        Ok(Expression::List(items))
    }
}

/// Sorts an atom into a literal or a symbol. `True`/`False` are the boolean
/// literals, case-sensitive; `pi` is a reserved number literal.
fn classify_atom(word: &str, span: Span) -> ParseResult<Expression> {
    match word {
        "True" => return Ok(Expression::Boolean(true)),
        "False" => return Ok(Expression::Boolean(false)),
        "pi" => return Ok(Expression::Number(std::f64::consts::PI)),
        _ => {}
    }
    if let Ok(number) = word.parse::<f64>() {
        return Ok(Expression::Number(number));
    }
    if is_valid_symbol(word) {
        Ok(Expression::Symbol(word.to_string()))
    } else {
        Err(ParseError::InvalidToken {
            word: word.to_string(),
            span,
        })
    }
}

// Operator keywords are symbols regardless of their shape. Anything else
// must contain no whitespace, not start with a digit, and not parse as a
// floating-point number.
fn is_valid_symbol(word: &str) -> bool {
    if is_operator_keyword(word) {
        return true;
    }
    !word.contains(char::is_whitespace)
        && !word.starts_with(|c: char| c.is_ascii_digit())
        && word.parse::<f64>().is_err()
}

// Second phase: structural checks on the flattened form
fn validate(items: &[Expression], form_span: Span) -> ParseResult<()> {
    let marker_count = items.iter().filter(|item| is_marker(item)).count();
    if marker_count % 2 != 0 {
        return Err(ParseError::ExtraInput {
            reason: "unbalanced parentheses",
            span: form_span,
        });
    }

    let begin_count = items
        .iter()
        .filter(|item| matches!(item, Expression::Symbol(s) if s == "begin"))
        .count();
    if begin_count > 2 {
        return Err(ParseError::ExtraInput {
            reason: "too many begin forms",
            span: form_span,
        });
    }
    Ok(())
}

// Third phase: walk the flattened form into a tree. The outer parens came
// off during flattening, so the closing marker is restored first and the
// walk must end exactly on it.
fn build_tree(mut items: Vec<Expression>, form_span: Span) -> ParseResult<Node> {
    items.push(Expression::Symbol(")".to_string()));
    let mut items = items.into_iter().peekable();

    let root = parse_group(&mut items)?;
    if items.next().is_some() {
        return Err(ParseError::ExtraInput {
            reason: "trailing tokens after the expression",
            span: form_span,
        });
    }
    Ok(root)
}

// Builds the node for one group whose opening marker is already consumed:
// the next element becomes the head payload, whatever it is, and the rest
// become children until the closing marker.
fn parse_group(items: &mut Peekable<IntoIter<Expression>>) -> ParseResult<Node> {
    let Some(head) = items.next() else {
        return Err(ParseError::UnexpectedEof(
            "an expression after '('".to_string(),
        ));
    };
    let mut node = Node::new(head);

    while let Some(item) = items.next_if(|e| !is_close_marker(e)) {
        if is_open_marker(&item) {
            node.children.push(parse_group(items)?);
        } else {
            node.children.push(Node::new(item));
        }
    }
    match items.next() {
        Some(_) => Ok(node), // the closing marker
        None => Err(ParseError::UnexpectedEof("')'".to_string())),
    }
}

fn is_open_marker(item: &Expression) -> bool {
    matches!(item, Expression::Symbol(s) if s == "(")
}

fn is_close_marker(item: &Expression) -> bool {
    matches!(item, Expression::Symbol(s) if s == ")")
}

fn is_marker(item: &Expression) -> bool {
    is_open_marker(item) || is_close_marker(item)
}

// Helper function to lex and parse a string directly (useful for tests and
// the drivers)
pub fn parse_str(input: &str) -> ParseResult<Node> {
    Parser::new(tokenize(input)).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper for asserting successful parsing
    fn assert_parse(input: &str, expected: Node) {
        match parse_str(input) {
            Ok(result) => assert_eq!(result, expected, "Input: '{}'", input),
            Err(e) => panic!("Parsing failed for input '{}': {}", input, e),
        }
    }

    // Helper for asserting parse errors by variant
    fn assert_parse_error(input: &str, expected_error_variant: ParseError) {
        match parse_str(input) {
            Ok(result) => panic!(
                "Expected parsing to fail for input '{}', but got: {:?}",
                input, result
            ),
            Err(e) => assert_eq!(
                std::mem::discriminant(&e),
                std::mem::discriminant(&expected_error_variant),
                "Input: '{}', Expected error variant like {:?}, got: {:?}",
                input,
                expected_error_variant,
                e
            ),
        }
    }

    fn node_number(n: f64) -> Node {
        Node::new(Expression::Number(n))
    }

    fn node_bool(b: bool) -> Node {
        Node::new(Expression::Boolean(b))
    }

    fn node_symbol(s: &str) -> Node {
        Node::new(Expression::Symbol(s.to_string()))
    }

    fn form(head: &str, children: Vec<Node>) -> Node {
        Node::with_children(Expression::Symbol(head.to_string()), children)
    }

    const EXTRA_INPUT: ParseError = ParseError::ExtraInput {
        reason: "",
        span: Span { start: 0, end: 0 },
    };

    #[test]
    fn test_parse_flat_form() {
        assert_parse(
            "(+ 1 2)",
            form("+", vec![node_number(1.0), node_number(2.0)]),
        );
        assert_parse(
            "(define x 10)",
            form("define", vec![node_symbol("x"), node_number(10.0)]),
        );
    }

    #[test]
    fn test_parse_nested_form() {
        assert_parse(
            "(+ 1 (* 2 3))",
            form(
                "+",
                vec![
                    node_number(1.0),
                    form("*", vec![node_number(2.0), node_number(3.0)]),
                ],
            ),
        );
        assert_parse(
            "(begin (define x 1) (+ x 1))",
            form(
                "begin",
                vec![
                    form("define", vec![node_symbol("x"), node_number(1.0)]),
                    form("+", vec![node_symbol("x"), node_number(1.0)]),
                ],
            ),
        );
    }

    #[test]
    fn test_single_element_form_is_a_leaf() {
        assert_parse("(x)", node_symbol("x"));
        assert_parse("(+)", node_symbol("+"));
        assert_parse("(begin)", node_symbol("begin"));
    }

    #[test]
    fn test_boolean_literals_are_case_sensitive() {
        assert_parse(
            "(and True False)",
            form("and", vec![node_bool(true), node_bool(false)]),
        );
        // Lowercase spellings are ordinary symbols
        assert_parse(
            "(and true false)",
            form("and", vec![node_symbol("true"), node_symbol("false")]),
        );
    }

    #[test]
    fn test_pi_is_a_number_literal() {
        assert_parse(
            "(+ pi 1)",
            form(
                "+",
                vec![node_number(std::f64::consts::PI), node_number(1.0)],
            ),
        );
    }

    #[test]
    fn test_number_spellings() {
        assert_parse(
            "(+ .5 1e3 -2 3.)",
            form(
                "+",
                vec![
                    node_number(0.5),
                    node_number(1000.0),
                    node_number(-2.0),
                    node_number(3.0),
                ],
            ),
        );
    }

    #[test]
    fn test_invalid_tokens() {
        let invalid = ParseError::InvalidToken {
            word: String::new(),
            span: Span::default(),
        };
        // Digit-led words that are not numbers are rejected outright
        assert_parse_error("(+ 1 2abc)", invalid.clone());
        assert_parse_error("(9x y)", invalid.clone());
        assert_parse_error("(+ 1.2.3 4)", invalid);
    }

    #[test]
    fn test_empty_expression() {
        assert_parse_error(
            "()",
            ParseError::EmptyExpression {
                span: Span::default(),
            },
        );
        assert_parse_error(
            "(  )",
            ParseError::EmptyExpression {
                span: Span::default(),
            },
        );
    }

    #[test]
    fn test_source_must_open_with_a_paren() {
        let unexpected = ParseError::UnexpectedToken {
            found: Token {
                kind: TokenKind::RParen,
                span: Span::default(),
            },
            expected: String::new(),
        };
        assert_parse_error("5", unexpected.clone());
        assert_parse_error("x", unexpected.clone());
        assert_parse_error(") (", unexpected);
        assert_parse_error("", ParseError::UnexpectedEof(String::new()));
    }

    #[test]
    fn test_unbalanced_parens() {
        // Truncated input stops at the missing closer
        assert_parse_error("(+ 1 2", ParseError::UnexpectedToken {
            found: Token {
                kind: TokenKind::Atom("2".to_string()),
                span: Span::default(),
            },
            expected: String::new(),
        });
        assert_parse_error("(", ParseError::UnexpectedEof(String::new()));
        // A spare nested paren fails the parity check
        assert_parse_error("(()", EXTRA_INPUT);
        assert_parse_error("(+ 1))", EXTRA_INPUT);
    }

    #[test]
    fn test_too_many_begin_forms() {
        assert_parse_error("(begin (begin (begin 1)))", EXTRA_INPUT);
        // Two begins are fine
        assert_parse(
            "(begin (begin 1 2) 3)",
            form(
                "begin",
                vec![
                    form("begin", vec![node_number(1.0), node_number(2.0)]),
                    node_number(3.0),
                ],
            ),
        );
    }

    #[test]
    fn test_nested_group_cannot_lead_the_form() {
        assert_parse_error("((a) b)", EXTRA_INPUT);
        assert_parse_error("((+ 1 2))", EXTRA_INPUT);
    }

    #[test]
    fn test_empty_nested_group_is_rejected() {
        assert_parse_error("(+ () 2)", ParseError::UnexpectedEof(String::new()));
    }

    #[test]
    fn test_one_form_per_parse() {
        assert_parse_error("(+ 1 2) (+ 3 4)", EXTRA_INPUT);
    }

    #[test]
    fn test_whitespace_and_comments() {
        let expected = form("+", vec![node_number(1.0), node_number(2.0)]);
        assert_parse(" ( + 1 2 ) ", expected.clone());
        assert_parse("(+ 1 2) ; rest of line ignored", expected.clone());
        assert_parse("(+ 1 ; mid-form comment\n 2)", expected);
    }

    #[test]
    fn test_deeply_nested_form() {
        assert_parse(
            "(+ 1 (- 2 (* 3 (/ 4 5))))",
            form(
                "+",
                vec![
                    node_number(1.0),
                    form(
                        "-",
                        vec![
                            node_number(2.0),
                            form(
                                "*",
                                vec![
                                    node_number(3.0),
                                    form("/", vec![node_number(4.0), node_number(5.0)]),
                                ],
                            ),
                        ],
                    ),
                ],
            ),
        );
    }
}
