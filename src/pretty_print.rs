use crate::ParseError;
use ariadne::{Label, Report, ReportKind, Source};

impl ParseError {
    /// Renders the error as an ariadne report against `input`. `name` is the
    /// source label shown in the header, the file path or "REPL".
    pub fn pretty_print(&self, name: &str, input: &str) {
        let report = match self {
            ParseError::UnexpectedToken { found, expected } => {
                Report::build(ReportKind::Error, (name, found.span.to_range()))
                    .with_message(format!("Unexpected token: {}", found.kind))
                    .with_label(
                        Label::new((name, found.span.to_range()))
                            .with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::UnexpectedEof(expected) => {
                let idx = input.len();
                Report::build(ReportKind::Error, (name, idx..idx))
                    .with_message("Unexpected end of input")
                    .with_label(
                        Label::new((name, idx..idx)).with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::InvalidToken { word, span } => {
                Report::build(ReportKind::Error, (name, span.to_range()))
                    .with_message(format!("Invalid token: {word}"))
                    .with_label(
                        Label::new((name, span.to_range()))
                            .with_message("Not a number, a boolean, or a well-formed symbol"),
                    )
            }
            ParseError::EmptyExpression { span } => {
                Report::build(ReportKind::Error, (name, span.to_range()))
                    .with_message("Empty expression")
                    .with_label(
                        Label::new((name, span.to_range()))
                            .with_message("Expected at least one expression inside the parens"),
                    )
            }
            ParseError::ExtraInput { reason, span } => {
                Report::build(ReportKind::Error, (name, span.to_range()))
                    .with_message("Extra input")
                    .with_label(Label::new((name, span.to_range())).with_message(*reason))
            }
        };
        report
            .finish()
            .print((name, Source::from(input)))
            .unwrap();
    }
}
