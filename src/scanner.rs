use crate::error::{Diagnostics, SyntaxError};
use crate::token::{Token, TokenType};
use phf::phf_map;
use std::iter::Peekable;
use std::str::CharIndices;

// Note: current becomes self.iter.peek()?.0
struct Scanner<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    start: usize,
    line: usize,
    diagnostics: Diagnostics,
}

/// Splits `source` into tokens. Never fails: bad characters and
/// unterminated strings are reported and skipped, and the result always
/// ends with a single EOF token.
pub fn scan_tokens(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut scanner = Scanner {
        source,
        iter: source.char_indices().peekable(),
        start: 0,
        line: 1,
        diagnostics: Diagnostics::new(),
    };
    let mut tokens: Vec<Token> = Vec::new();

    while let Some((idx, _)) = scanner.iter.peek() {
        scanner.start = *idx;
        if let Some(token) = scanner.scan_token() {
            tokens.push(token);
        }
    }
    tokens.push(Token {
        tokentype: TokenType::EOF,
        lexeme: "",
        line: scanner.line,
    });
    tracing::debug!(
        "scanned {} tokens, {} errors",
        tokens.len(),
        scanner.diagnostics.len()
    );
    (tokens, scanner.diagnostics)
}

impl<'a> Scanner<'a> {
    fn scan_token(&mut self) -> Option<Token<'a>> {
        let (_, c) = self.iter.next()?;
        match c {
            '(' => Some(self.token(TokenType::LeftParen)),
            ')' => Some(self.token(TokenType::RightParen)),
            '{' => Some(self.token(TokenType::LeftBrace)),
            '}' => Some(self.token(TokenType::RightBrace)),
            ',' => Some(self.token(TokenType::Comma)),
            '.' => Some(self.token(TokenType::Dot)),
            '-' => Some(self.token(TokenType::Minus)),
            '+' => Some(self.token(TokenType::Plus)),
            ';' => Some(self.token(TokenType::Semicolon)),
            '*' => Some(self.token(TokenType::Star)),
            '!' => Some(self.either('=', TokenType::BangEqual, TokenType::Bang)),
            '=' => Some(self.either('=', TokenType::EqualEqual, TokenType::Equal)),
            '<' => Some(self.either('=', TokenType::LessEqual, TokenType::Less)),
            '>' => Some(self.either('=', TokenType::GreaterEqual, TokenType::Greater)),
            '/' => {
                if self.next_if('/') {
                    while let Some((_, c)) = self.iter.peek() {
                        if *c == '\n' {
                            break;
                        }
                        self.iter.next();
                    }
                    None
                } else {
                    Some(self.token(TokenType::Slash))
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            }
            '"' => self.string(),
            '0'..='9' => Some(self.number()),
            c if c.is_alphabetic() || c == '_' => Some(self.identifier()),
            _ => {
                self.diagnostics
                    .report(SyntaxError::at_line(self.line, "Unexpected character."));
                None
            }
        }
    }
    fn current(&mut self) -> usize {
        match self.iter.peek() {
            None => self.source.len(),
            Some((idx, _)) => *idx,
        }
    }
    fn text(&mut self) -> &'a str {
        let current = self.current();
        let source = self.source;
        &source[self.start..current]
    }
    fn token(&mut self, tokentype: TokenType<'a>) -> Token<'a> {
        Token {
            tokentype,
            lexeme: self.text(),
            line: self.line,
        }
    }
    fn either(
        &mut self,
        expected: char,
        matched: TokenType<'a>,
        single: TokenType<'a>,
    ) -> Token<'a> {
        if self.next_if(expected) {
            self.token(matched)
        } else {
            self.token(single)
        }
    }
    fn next_if(&mut self, expected: char) -> bool {
        self.iter.next_if(|(_, c)| *c == expected).is_some()
    }
    fn peek_is_digit(&mut self) -> bool {
        matches!(self.iter.peek(), Some((_, c)) if c.is_ascii_digit())
    }
    fn string(&mut self) -> Option<Token<'a>> {
        loop {
            match self.iter.next() {
                None => {
                    self.diagnostics
                        .report(SyntaxError::at_line(self.line, "Unterminated string."));
                    return None;
                }
                Some((_, '"')) => break,
                Some((_, '\n')) => self.line += 1,
                Some(_) => (),
            }
        }
        let text = self.text();
        Some(self.token(TokenType::String(&text[1..text.len() - 1])))
    }
    fn number(&mut self) -> Token<'a> {
        while self.peek_is_digit() {
            self.iter.next();
        }

        // A '.' is only part of the number when a digit follows it.
        if let Some((_, '.')) = self.iter.peek() {
            let mut lookahead = self.iter.clone();
            lookahead.next();
            if let Some((_, c)) = lookahead.peek() {
                if c.is_ascii_digit() {
                    self.iter.next();
                    while self.peek_is_digit() {
                        self.iter.next();
                    }
                }
            }
        }

        let text = self.text();
        // The character rules above only admit well-formed decimals.
        let value = text.parse().unwrap_or(0.0);
        self.token(TokenType::Number(value))
    }
    fn identifier(&mut self) -> Token<'a> {
        while self
            .iter
            .next_if(|(_, c)| c.is_alphanumeric() || *c == '_')
            .is_some()
        {}
        let text = self.text();
        match KEYWORDS.get(text) {
            None => self.token(TokenType::Identifier(text)),
            Some(x) => self.token(x.clone()),
        }
    }
}

static KEYWORDS: phf::Map<&'static str, TokenType<'static>> = phf_map! {
    "and" => TokenType::And,
    "class" => TokenType::Class,
    "else" => TokenType::Else,
    "false" => TokenType::False,
    "for" => TokenType::For,
    "fun" => TokenType::Fun,
    "if" => TokenType::If,
    "nil" => TokenType::Nil,
    "or" => TokenType::Or,
    "print" => TokenType::Print,
    "return" => TokenType::Return,
    "super" => TokenType::Super,
    "this" => TokenType::This,
    "true" => TokenType::True,
    "var" => TokenType::Var,
    "while" => TokenType::While,
};
