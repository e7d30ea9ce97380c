use crate::value::Value;
use strum_macros::Display;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Display)]
pub enum TokenType<'a> {
    // Single-character tokens.
    #[strum(serialize = "(")] LeftParen,
    #[strum(serialize = ")")] RightParen,
    #[strum(serialize = "{")] LeftBrace,
    #[strum(serialize = "}")] RightBrace,
    #[strum(serialize = ",")] Comma,
    #[strum(serialize = ".")] Dot,
    #[strum(serialize = "-")] Minus,
    #[strum(serialize = "+")] Plus,
    #[strum(serialize = ";")] Semicolon,
    #[strum(serialize = "/")] Slash,
    #[strum(serialize = "*")] Star,

    // One or two character tokens.
    #[strum(serialize = "!")] Bang,
    #[strum(serialize = "!=")] BangEqual,
    #[strum(serialize = "=")] Equal,
    #[strum(serialize = "==")] EqualEqual,
    #[strum(serialize = ">")] Greater,
    #[strum(serialize = ">=")] GreaterEqual,
    #[strum(serialize = "<")] Less,
    #[strum(serialize = "<=")] LessEqual,

    // Literals.
    #[strum(serialize = "identifier")] Identifier(&'a str),
    #[strum(serialize = "string")] String(&'a str),
    #[strum(serialize = "number")] Number(f64),

    // Keywords.
    #[strum(serialize = "and")] And,
    #[strum(serialize = "class")] Class,
    #[strum(serialize = "else")] Else,
    #[strum(serialize = "false")] False,
    #[strum(serialize = "fun")] Fun,
    #[strum(serialize = "for")] For,
    #[strum(serialize = "if")] If,
    #[strum(serialize = "nil")] Nil,
    #[strum(serialize = "or")] Or,
    #[strum(serialize = "print")] Print,
    #[strum(serialize = "return")] Return,
    #[strum(serialize = "super")] Super,
    #[strum(serialize = "this")] This,
    #[strum(serialize = "true")] True,
    #[strum(serialize = "var")] Var,
    #[strum(serialize = "while")] While,

    #[strum(serialize = "end of file")] EOF
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub tokentype: TokenType<'a>,
    pub lexeme: &'a str,
    pub line: usize,
}

impl<'a> Token<'a> {
    /// The runtime value carried by a NUMBER or STRING token.
    pub fn literal(&self) -> Option<Value> {
        match self.tokentype {
            TokenType::Number(x) => Some(Value::Number(x)),
            TokenType::String(s) => Some(Value::String(s.to_string())),
            _ => None,
        }
    }
}
