use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};
use tinsel::lexer::TokenKind;
use tinsel::{Interpreter, operator_keywords, tokenize};
use tracing_subscriber::EnvFilter;

/// Completes the word under the cursor from the defined identifiers plus the
/// operator keywords. Candidates are the suffixes still to be typed.
struct SymbolCompleter {
    interpreter: Rc<RefCell<Interpreter>>,
}

impl rustyline::completion::Completer for SymbolCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let candidates = match tokenize(&line[..pos]).last().map(|token| &token.kind) {
            Some(TokenKind::Atom(prefix)) => self
                .interpreter
                .borrow()
                .environment()
                .identifiers()
                .into_iter()
                .chain(operator_keywords().map(str::to_string))
                .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
                .collect(),
            _ => vec![],
        };
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct ReplHelper {
    #[rustyline(Validator)]
    validator: BalanceValidator,
    #[rustyline(Highlighter)]
    highlighter: ParenHighlighter,
    #[rustyline(Completer)]
    completer: SymbolCompleter,
}

/// Holds the line open while parens are unbalanced, so multi-line forms can
/// be typed naturally. Anything after ';' is a comment until the next
/// newline and never counts.
struct BalanceValidator;

impl Validator for BalanceValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        let mut stack = Vec::new();
        let mut in_comment = false;

        for (i, c) in input.char_indices() {
            if in_comment {
                if c == '\n' {
                    in_comment = false;
                }
                continue;
            }
            match c {
                ';' => in_comment = true,
                '(' => stack.push(i),
                ')' => {
                    if stack.pop().is_none() {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            i
                        ))));
                    }
                }
                _ => {}
            }
        }

        if stack.is_empty() {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

struct ParenHighlighter;

impl Highlighter for ParenHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        // Offsets into the line and into the output, which drift apart as
        // escape codes are inserted
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut highlighted = String::new();
        let mut in_comment = false;

        for (i, c) in line.char_indices() {
            if in_comment {
                if c == '\n' {
                    in_comment = false;
                    highlighted.push(c);
                } else {
                    highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for comments
                }
                continue;
            }

            match c {
                ';' => {
                    in_comment = true;
                    highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for comments
                }
                '(' => {
                    stack.push((i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' => {
                    if let Some((open_index, open_offset)) = stack.pop() {
                        let cursor_on_pair = pos
                            .checked_sub(1)
                            .is_some_and(|p| p == open_index || p == i);
                        if cursor_on_pair {
                            highlighted.push_str(&format!("\x1b[34m{}\x1b[0m", c)); // Blue for the matching pair
                            highlighted
                                .replace_range(open_offset..=open_offset, "\x1b[1;34m(\x1b[0m");
                        } else {
                            highlighted.push(c);
                        }
                    } else {
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing parens
                    }
                }
                _ => {
                    highlighted.push(c);
                }
            }
        }

        std::borrow::Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("Tinsel REPL v0.1.0");
    println!("Type 'exit' or press Ctrl-D to quit.");

    let interpreter = Rc::new(RefCell::new(Interpreter::new()));
    let helper = ReplHelper {
        validator: BalanceValidator,
        highlighter: ParenHighlighter,
        completer: SymbolCompleter {
            interpreter: interpreter.clone(),
        },
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history("tinsel_history.txt").is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("tinsel> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                let mut session = interpreter.borrow_mut();
                if session.parse(trimmed_input) {
                    match session.eval() {
                        Ok(value) => println!("{value}"),
                        Err(failure) => eprintln!("Error: {failure}"),
                    }
                } else if let Some(parse_error) = session.last_parse_error() {
                    parse_error.pretty_print("REPL", trimmed_input);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history("tinsel_history.txt")
}
