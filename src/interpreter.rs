use crate::ast::{Expression, Statement, Visitor};
use crate::environment::Environment;
use crate::token::{Token, TokenType};
use crate::value::Value;
use std::io::{self, Write};
use thiserror::Error;

/// A failure while running a program, attributed to the source line of
/// the token that caused it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(message: &str, token: &Token) -> RuntimeError {
        RuntimeError {
            message: message.to_string(),
            line: token.line,
        }
    }
}

type EvalResult = Result<Value, RuntimeError>;
type ExecResult = Result<(), RuntimeError>;

pub struct Interpreter {
    environment: Environment,
    output: Box<dyn Write>,
}

impl<'a> Visitor<Expression<'a>, EvalResult> for Interpreter {
    fn visit(&mut self, expr: &Expression<'a>) -> EvalResult {
        match expr {
            Expression::Literal(x) => Ok(x.clone()),
            Expression::Grouping(x) => self.evaluate(x),
            Expression::Unary { operator, right } => {
                let rv = self.evaluate(right)?;
                match operator.tokentype {
                    TokenType::Minus => match rv {
                        Value::Number(r) => Ok(Value::Number(-r)),
                        _ => Err(RuntimeError::new("Operand must be a number.", operator)),
                    },
                    TokenType::Bang => Ok(Value::Boolean(!rv.is_truthy())),
                    _ => Ok(Value::Nil),
                }
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => {
                let lv = self.evaluate(left)?;
                let rv = self.evaluate(right)?;
                binary(operator, lv, rv)
            }
            Expression::Variable(token) => self.environment.get(token),
            Expression::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator.tokentype {
                    TokenType::Or if left.is_truthy() => Ok(left),
                    TokenType::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }
        }
    }
}

fn binary(operator: &Token, lv: Value, rv: Value) -> EvalResult {
    match operator.tokentype {
        TokenType::EqualEqual => return Ok(Value::Boolean(lv.equals(&rv))),
        TokenType::BangEqual => return Ok(Value::Boolean(!lv.equals(&rv))),
        TokenType::Plus => {
            return match (lv, rv) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => {
                    let mut joined = l;
                    joined.push_str(r.as_str());
                    Ok(Value::String(joined))
                }
                _ => Err(RuntimeError::new(
                    "Operands must be two numbers or two strings.",
                    operator,
                )),
            }
        }
        _ => (),
    }
    let (l, r) = match (lv, rv) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        _ => return Err(RuntimeError::new("Operand must be a number.", operator)),
    };
    match operator.tokentype {
        TokenType::Minus => Ok(Value::Number(l - r)),
        TokenType::Slash => Ok(Value::Number(l / r)),
        TokenType::Star => Ok(Value::Number(l * r)),
        TokenType::Greater => Ok(Value::Boolean(l > r)),
        TokenType::GreaterEqual => Ok(Value::Boolean(l >= r)),
        TokenType::Less => Ok(Value::Boolean(l < r)),
        TokenType::LessEqual => Ok(Value::Boolean(l <= r)),
        _ => Ok(Value::Nil),
    }
}

impl<'a> Visitor<Statement<'a>, ExecResult> for Interpreter {
    fn visit(&mut self, stmt: &Statement<'a>) -> ExecResult {
        match stmt {
            Statement::Print(e) => {
                let val = self.evaluate(e)?;
                writeln!(self.output, "{}", val).map_err(|err| RuntimeError {
                    message: format!("Failed to write output: {}", err),
                    line: e.line().unwrap_or(0),
                })
            }
            Statement::Expression(e) => {
                self.evaluate(e)?;
                Ok(())
            }
            Statement::Var { name, initializer } => {
                let val = match initializer {
                    Some(e) => self.evaluate(e)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme, val);
                Ok(())
            }
            Statement::Block(stmts) => {
                let child = self.environment.new_child();
                self.execute_block(stmts, child)
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Statement::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_output(Box::new(io::stdout()))
    }
    pub fn with_output(output: Box<dyn Write>) -> Interpreter {
        Interpreter {
            environment: Environment::new(),
            output,
        }
    }
    fn evaluate(&mut self, expr: &Expression) -> EvalResult {
        expr.accept(self)
    }
    pub fn execute(&mut self, stmt: &Statement) -> ExecResult {
        stmt.accept(self)
    }
    /// Runs `statements` in `environment`, then puts the previous scope
    /// back whether or not they succeeded.
    pub fn execute_block(
        &mut self,
        statements: &[Statement],
        environment: Environment,
    ) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, environment);
        tracing::trace!("entering block of {} statements", statements.len());
        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));
        self.environment = previous;
        tracing::trace!("left block");
        result
    }
    /// Executes top-level statements in order, stopping at the first
    /// runtime error. Output is flushed either way.
    pub fn interpret(&mut self, statements: &[Statement]) -> ExecResult {
        tracing::debug!("interpreting {} statements", statements.len());
        let result = statements.iter().try_for_each(|stmt| {
            tracing::trace!("executing {:?}", stmt);
            self.execute(stmt)
        });
        if let Err(err) = &result {
            tracing::debug!("runtime error on line {}", err.line);
        }
        let flushed = self.output.flush().map_err(|err| RuntimeError {
            message: format!("Failed to write output: {}", err),
            line: 0,
        });
        result.and(flushed)
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}
