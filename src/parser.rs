use crate::ast::{Expression, Statement};
use crate::error::{Diagnostics, SyntaxError};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Unwinds the parser to the enclosing declaration, which resynchronizes.
/// The message itself has already gone to the diagnostics.
#[derive(Debug)]
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

macro_rules! consume {
    ($self:expr, $( $token_type:pat )|+, $error:expr) => {
        match $self.peek().tokentype {
            $( $token_type )|+ => Ok($self.advance()),
            _ => Err($self.error($error)),
        }
    };
}

macro_rules! advance_if {
    ($self:expr, $( $token_type:pat )|+) => {
        match $self.peek().tokentype {
            $( $token_type )|+ => {
                $self.advance();
                true
            }
            _ => false,
        }
    };
}

struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    diagnostics: Diagnostics,
}

/// Parses a whole token stream. Malformed declarations are reported and
/// dropped; check the diagnostics before running the statements.
pub fn parse<'a>(tokens: &'a [Token<'a>]) -> (Vec<Statement<'a>>, Diagnostics) {
    let mut parser = Parser::new(tokens);
    let statements = parser.parse();
    (statements, parser.diagnostics)
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Parser<'a> {
        Parser {
            tokens,
            current: 0,
            diagnostics: Diagnostics::new(),
        }
    }
    fn parse(&mut self) -> Vec<Statement<'a>> {
        let mut statements: Vec<Statement<'a>> = Vec::new();
        if self.tokens.is_empty() {
            return statements;
        }
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        tracing::debug!(
            "parsed {} statements, {} errors",
            statements.len(),
            self.diagnostics.len()
        );
        statements
    }
    fn declaration(&mut self) -> Option<Statement<'a>> {
        let result = if advance_if!(self, TokenType::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };
        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }
    fn var_declaration(&mut self) -> ParseResult<Statement<'a>> {
        let name = consume!(self, TokenType::Identifier(_), "Expect variable name.")?;
        let initializer = if advance_if!(self, TokenType::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        consume!(
            self,
            TokenType::Semicolon,
            "Expect ';' after variable declaration."
        )?;
        Ok(Statement::Var { name, initializer })
    }
    fn statement(&mut self) -> ParseResult<Statement<'a>> {
        match self.peek().tokentype {
            TokenType::For => {
                self.advance();
                self.for_statement()
            }
            TokenType::If => {
                self.advance();
                self.if_statement()
            }
            TokenType::Print => {
                self.advance();
                self.print_statement()
            }
            TokenType::While => {
                self.advance();
                self.while_statement()
            }
            TokenType::LeftBrace => {
                self.advance();
                Ok(Statement::Block(self.block()?))
            }
            _ => self.expression_statement(),
        }
    }
    fn for_statement(&mut self) -> ParseResult<Statement<'a>> {
        consume!(self, TokenType::LeftParen, "Expect '(' after 'for'.")?;
        let initializer = match self.peek().tokentype {
            TokenType::Semicolon => {
                self.advance();
                None
            }
            TokenType::Var => {
                self.advance();
                Some(self.var_declaration()?)
            }
            _ => Some(self.expression_statement()?),
        };

        let condition = match self.peek().tokentype {
            TokenType::Semicolon => Expression::Literal(Value::Boolean(true)),
            _ => self.expression()?,
        };
        consume!(self, TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment = match self.peek().tokentype {
            TokenType::RightParen => None,
            _ => Some(self.expression()?),
        };
        consume!(self, TokenType::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(x) = increment {
            body = Statement::Block(vec![body, Statement::Expression(x)]);
        }
        body = Statement::While {
            condition,
            body: Box::new(body),
        };
        match initializer {
            None => Ok(body),
            Some(x) => Ok(Statement::Block(vec![x, body])),
        }
    }
    fn if_statement(&mut self) -> ParseResult<Statement<'a>> {
        consume!(self, TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        consume!(self, TokenType::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if advance_if!(self, TokenType::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
        })
    }
    fn while_statement(&mut self) -> ParseResult<Statement<'a>> {
        consume!(self, TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        consume!(
            self,
            TokenType::RightParen,
            "Expect ')' after while condition."
        )?;
        let body = self.statement()?;
        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }
    fn block(&mut self) -> ParseResult<Vec<Statement<'a>>> {
        let mut statements: Vec<Statement<'a>> = Vec::new();
        while !self.is_at_end() {
            if let TokenType::RightBrace = self.peek().tokentype {
                break;
            }
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        consume!(self, TokenType::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }
    fn print_statement(&mut self) -> ParseResult<Statement<'a>> {
        let expr = self.expression()?;
        consume!(self, TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Statement::Print(expr))
    }
    fn expression_statement(&mut self) -> ParseResult<Statement<'a>> {
        let expr = self.expression()?;
        consume!(self, TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Statement::Expression(expr))
    }
    fn expression(&mut self) -> ParseResult<Expression<'a>> {
        self.assignment()
    }
    fn assignment(&mut self) -> ParseResult<Expression<'a>> {
        let expr = self.or()?;
        match self.peek().tokentype {
            TokenType::Equal => {
                let equals = self.advance();
                let value = self.assignment()?;
                match expr {
                    Expression::Variable(name) => Ok(Expression::Assign {
                        name,
                        value: Box::new(value),
                    }),
                    // Reported, but not worth unwinding for.
                    _ => {
                        self.diagnostics
                            .report(SyntaxError::at_token(equals, "Invalid assignment target."));
                        Ok(value)
                    }
                }
            }
            _ => Ok(expr),
        }
    }
    fn or(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.and()?;
        while advance_if!(self, TokenType::Or) {
            let operator = self.previous();
            let right = self.and()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn and(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.equality()?;
        while advance_if!(self, TokenType::And) {
            let operator = self.previous();
            let right = self.equality()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn equality(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.comparison()?;
        while advance_if!(self, TokenType::BangEqual | TokenType::EqualEqual) {
            let operator = self.previous();
            let right = self.comparison()?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn comparison(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.term()?;
        while advance_if!(
            self,
            TokenType::Greater | TokenType::GreaterEqual | TokenType::Less | TokenType::LessEqual
        ) {
            let operator = self.previous();
            let right = self.term()?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn term(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.factor()?;
        while advance_if!(self, TokenType::Minus | TokenType::Plus) {
            let operator = self.previous();
            let right = self.factor()?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn factor(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.unary()?;
        while advance_if!(self, TokenType::Slash | TokenType::Star) {
            let operator = self.previous();
            let right = self.unary()?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn unary(&mut self) -> ParseResult<Expression<'a>> {
        match self.peek().tokentype {
            TokenType::Bang | TokenType::Minus => {
                let operator = self.advance();
                let right = self.unary()?;
                Ok(Expression::Unary {
                    operator,
                    right: Box::new(right),
                })
            }
            _ => self.primary(),
        }
    }
    fn primary(&mut self) -> ParseResult<Expression<'a>> {
        let token = self.peek();
        let literal = match token.tokentype {
            TokenType::False => Value::Boolean(false),
            TokenType::True => Value::Boolean(true),
            TokenType::Nil => Value::Nil,
            TokenType::Number(_) | TokenType::String(_) => token.literal().unwrap_or(Value::Nil),
            TokenType::Identifier(_) => {
                self.advance();
                return Ok(Expression::Variable(token));
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                consume!(self, TokenType::RightParen, "Expect ')' after expression.")?;
                return Ok(Expression::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error("Expect expression.")),
        };
        self.advance();
        Ok(Expression::Literal(literal))
    }
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if let TokenType::Semicolon = self.previous().tokentype {
                return;
            }
            match self.peek().tokentype {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => (),
            }
            self.advance();
        }
    }
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || matches!(self.peek().tokentype, TokenType::EOF)
    }
    // Streams that lack a trailing EOF end at their last token.
    fn peek(&self) -> &'a Token<'a> {
        let tokens = self.tokens;
        match tokens.get(self.current) {
            Some(token) => token,
            None => &tokens[tokens.len() - 1],
        }
    }
    fn previous(&self) -> &'a Token<'a> {
        let tokens = self.tokens;
        &tokens[self.current.saturating_sub(1)]
    }
    fn error(&mut self, msg: &str) -> ParseError {
        let token = self.peek();
        self.diagnostics.report(SyntaxError::at_token(token, msg));
        ParseError
    }
}

#[cfg(test)]
mod parser_tests {
    use crate::ast::{AstPrinter, Statement};
    use crate::parser;
    use crate::scanner;
    use crate::token::{Token, TokenType};

    fn render(source: &str) -> Vec<String> {
        let (tokens, diagnostics) = scanner::scan_tokens(source);
        assert!(!diagnostics.had_error());
        let (statements, diagnostics) = parser::parse(&tokens);
        assert!(!diagnostics.had_error(), "{:?}", diagnostics);
        let mut printer = AstPrinter::new();
        statements
            .iter()
            .map(|s| printer.print_statement(s))
            .collect()
    }

    fn errors(source: &str) -> Vec<String> {
        let (tokens, _) = scanner::scan_tokens(source);
        let (_, diagnostics) = parser::parse(&tokens);
        diagnostics.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn precedence() {
        assert_eq!(render("1 + 2 * 3;"), vec!["(; (+ 1 (* 2 3)))"]);
        assert_eq!(render("(1 + 2) * 3;"), vec!["(; (* (group (+ 1 2)) 3))"]);
        assert_eq!(render("1 - 2 - 3;"), vec!["(; (- (- 1 2) 3))"]);
        assert_eq!(render("!-x == 1 < 2;"), vec!["(; (== (! (- x)) (< 1 2)))"]);
        assert_eq!(
            render("a or b and c;"),
            vec!["(; (or a (and b c)))"]
        );
    }

    #[test]
    fn binary_tree_shape() {
        let (tokens, _) = scanner::scan_tokens("1 + 2 * 3;");
        let (statements, _) = parser::parse(&tokens);
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Statement::Expression(crate::ast::Expression::Binary {
                operator, right, ..
            }) => {
                assert_eq!(operator.lexeme, "+");
                assert!(matches!(
                    **right,
                    crate::ast::Expression::Binary { operator, .. } if operator.lexeme == "*"
                ));
            }
            _ => panic!("expected a binary expression statement"),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(render("a = b = 3;"), vec!["(; (= a (= b 3)))"]);
    }

    #[test]
    fn declarations_and_statements() {
        assert_eq!(
            render("var a; var b = \"s\"; print b; { a = 1; }"),
            vec![
                "(var a)",
                "(var b \"s\")",
                "(print b)",
                "(block (; (= a 1)))"
            ]
        );
        assert_eq!(
            render("if (a) print 1; else print 2; while (nil) print false;"),
            vec!["(if a (print 1) (print 2))", "(while nil (print false))"]
        );
    }

    #[test]
    fn for_desugars_to_while() {
        assert_eq!(
            render("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["(block (var i 0) (while (< i 3) (block (print i) (; (= i (+ i 1))))))"]
        );
        assert_eq!(render("for (;;) print 1;"), vec!["(while true (print 1))"]);
        assert_eq!(
            render("for (i = 0; i < 1;) print i;"),
            vec!["(block (; (= i 0)) (while (< i 1) (print i)))"]
        );
    }

    #[test]
    fn invalid_assignment_target() {
        assert_eq!(
            errors("1 + 2 = 3;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
        let (tokens, _) = scanner::scan_tokens("(a) = 3;");
        let (statements, diagnostics) = parser::parse(&tokens);
        assert!(diagnostics.had_error());
        let mut printer = AstPrinter::new();
        assert_eq!(printer.print_statement(&statements[0]), "(; 3)");
    }

    #[test]
    fn recovers_at_statement_boundaries() {
        let (tokens, _) = scanner::scan_tokens("var = 1; print 2; print ;\nprint 3");
        let (statements, diagnostics) = parser::parse(&tokens);
        assert_eq!(
            diagnostics.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at end: Expect ';' after value."
            ]
        );
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn recovery_inside_blocks() {
        let (tokens, _) = scanner::scan_tokens("{ print ; print 1; }");
        let (statements, diagnostics) = parser::parse(&tokens);
        assert_eq!(diagnostics.len(), 1);
        let mut printer = AstPrinter::new();
        assert_eq!(
            statements
                .iter()
                .map(|s| printer.print_statement(s))
                .collect::<Vec<_>>(),
            vec!["(block (print 1))"]
        );
    }

    #[test]
    fn missing_delimiters() {
        assert_eq!(
            errors("if 1) print 1;"),
            vec!["[line 1] Error at '1': Expect '(' after 'if'."]
        );
        assert_eq!(
            errors("{ print 1;"),
            vec!["[line 1] Error at end: Expect '}' after block."]
        );
        assert_eq!(
            errors("print (1;"),
            vec!["[line 1] Error at ';': Expect ')' after expression."]
        );
    }

    #[test]
    fn stream_without_eof() {
        let tokens = [Token {
            tokentype: TokenType::Number(1.0),
            lexeme: "1",
            line: 1,
        }];
        let (statements, diagnostics) = parser::parse(&tokens);
        assert!(statements.is_empty());
        assert_eq!(
            diagnostics.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec!["[line 1] Error at '1': Expect ';' after expression."]
        );
    }

    #[test]
    fn empty_input() {
        let (statements, diagnostics) = parser::parse(&[]);
        assert!(statements.is_empty());
        assert!(!diagnostics.had_error());
        assert!(render("").is_empty());
    }
}
