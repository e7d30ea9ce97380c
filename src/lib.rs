//! A tree-walking interpreter for a small dynamically-typed scripting
//! language: source is scanned into tokens, parsed into statements and
//! executed directly against a chain of lexical scopes.

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

pub use crate::error::{Diagnostics, Outcome, SyntaxError};
pub use crate::interpreter::{Interpreter, RuntimeError};

use crate::ast::Statement;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Syntax(Diagnostics),
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn outcome(&self) -> Outcome {
        match self {
            Error::Syntax(_) => Outcome::SyntaxError,
            Error::Runtime(_) => Outcome::RuntimeError,
        }
    }
}

/// Scans, parses and runs `source` against `interpreter`. Nothing runs
/// if any syntax error was found.
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), Error> {
    run_with_ast(source, interpreter, |_| ())
}

/// Like `run`, but hands every parsed top-level statement to `inspect`
/// before execution starts.
pub fn run_with_ast<F>(
    source: &str,
    interpreter: &mut Interpreter,
    mut inspect: F,
) -> Result<(), Error>
where
    F: FnMut(&Statement),
{
    let (tokens, mut diagnostics) = scanner::scan_tokens(source);
    let (statements, parse_diagnostics) = parser::parse(&tokens);
    diagnostics.extend(parse_diagnostics);
    if diagnostics.had_error() {
        return Err(Error::Syntax(diagnostics));
    }
    for stmt in &statements {
        inspect(stmt);
    }
    interpreter.interpret(&statements)?;
    Ok(())
}
