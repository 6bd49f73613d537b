use std::fs;
use std::process::ExitCode;

use tinsel::Interpreter;
use tracing_subscriber::EnvFilter;

/// Runs one program file: parse it, evaluate it, print the final value.
/// A program file holds a single form; wrap several in a `begin`.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: tinsel <file>");
        return ExitCode::FAILURE;
    };
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(io_error) => {
            eprintln!("cannot read '{path}': {io_error}");
            return ExitCode::FAILURE;
        }
    };

    let mut interpreter = Interpreter::new();
    if !interpreter.parse(&source) {
        if let Some(parse_error) = interpreter.last_parse_error() {
            parse_error.pretty_print(&path, &source);
        }
        return ExitCode::FAILURE;
    }
    match interpreter.eval() {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
