use crate::token::{Token, TokenType};
use num_enum::IntoPrimitive;
use std::fmt;
use std::slice::Iter;
use thiserror::Error;

/// A lexical or grammatical error, reported before anything runs.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl SyntaxError {
    pub fn at_line(line: usize, message: &str) -> SyntaxError {
        SyntaxError {
            line,
            location: String::new(),
            message: message.to_string(),
        }
    }
    pub fn at_token(token: &Token, message: &str) -> SyntaxError {
        let location = match token.tokentype {
            TokenType::EOF => " at end".to_string(),
            _ => format!(" at '{}'", token.lexeme),
        };
        SyntaxError {
            line: token.line,
            location,
            message: message.to_string(),
        }
    }
}

/// Collects the syntax errors of one scan/parse pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<SyntaxError>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics { errors: Vec::new() }
    }
    pub fn report(&mut self, error: SyntaxError) {
        tracing::debug!("{}", error);
        self.errors.push(error);
    }
    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
    }
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }
    pub fn len(&self) -> usize {
        self.errors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
    pub fn iter(&self) -> Iter<'_, SyntaxError> {
        self.errors.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a SyntaxError;
    type IntoIter = Iter<'a, SyntaxError>;
    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Result of handing one chunk of source to the pipeline. The
/// discriminants are the sysexits codes a host should exit with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(i32)]
pub enum Outcome {
    Ok = 0,
    SyntaxError = 65,
    RuntimeError = 70,
}

#[cfg(test)]
mod error_tests {
    use crate::error::{Diagnostics, Outcome, SyntaxError};
    use crate::token::{Token, TokenType};

    #[test]
    fn syntax_error_format() {
        assert_eq!(
            SyntaxError::at_line(3, "Unexpected character.").to_string(),
            "[line 3] Error: Unexpected character."
        );
        let semicolon = Token {
            tokentype: TokenType::Semicolon,
            lexeme: ";",
            line: 2,
        };
        assert_eq!(
            SyntaxError::at_token(&semicolon, "Expect expression.").to_string(),
            "[line 2] Error at ';': Expect expression."
        );
        let eof = Token {
            tokentype: TokenType::EOF,
            lexeme: "",
            line: 5,
        };
        assert_eq!(
            SyntaxError::at_token(&eof, "Expect ';' after value.").to_string(),
            "[line 5] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn diagnostics_accumulate() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.had_error());
        diagnostics.report(SyntaxError::at_line(1, "a"));
        let mut more = Diagnostics::new();
        more.report(SyntaxError::at_line(2, "b"));
        diagnostics.extend(more);
        assert!(diagnostics.had_error());
        assert_eq!(diagnostics.len(), 2);
        let lines: Vec<usize> = diagnostics.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(
            diagnostics.to_string(),
            "[line 1] Error: a\n[line 2] Error: b"
        );
    }

    #[test]
    fn exit_codes() {
        assert_eq!(i32::from(Outcome::Ok), 0);
        assert_eq!(i32::from(Outcome::SyntaxError), 65);
        assert_eq!(i32::from(Outcome::RuntimeError), 70);
    }
}
