use crate::token::Token;
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Expression<'a> {
    Binary {
        left: Box<Expression<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expression<'a>>,
    },
    Grouping(Box<Expression<'a>>),
    Literal(Value),
    Logical {
        left: Box<Expression<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expression<'a>>,
    },
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expression<'a>>,
    },
    Variable(&'a Token<'a>),
    Assign {
        name: &'a Token<'a>,
        value: Box<Expression<'a>>,
    },
}

pub trait Visitor<T, Output> {
    fn visit(&mut self, n: &T) -> Output;
}

impl<'a> Expression<'a> {
    pub fn accept<T>(&self, v: &mut dyn Visitor<Expression<'a>, T>) -> T {
        v.visit(self)
    }
    /// Line of the leftmost token in the expression, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Expression::Binary { left, operator, .. }
            | Expression::Logical { left, operator, .. } => left.line().or(Some(operator.line)),
            Expression::Grouping(x) => x.line(),
            Expression::Literal(_) => None,
            Expression::Unary { operator, .. } => Some(operator.line),
            Expression::Variable(name) | Expression::Assign { name, .. } => Some(name.line),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Statement<'a> {
    Print(Expression<'a>),
    Expression(Expression<'a>),
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expression<'a>>,
    },
    Block(Vec<Statement<'a>>),
    If {
        condition: Expression<'a>,
        then_branch: Box<Statement<'a>>,
        else_branch: Option<Box<Statement<'a>>>,
    },
    While {
        condition: Expression<'a>,
        body: Box<Statement<'a>>,
    },
}

impl<'a> Statement<'a> {
    pub fn accept<T>(&self, v: &mut dyn Visitor<Statement<'a>, T>) -> T {
        v.visit(self)
    }
}

/// Renders trees as fully parenthesized prefix text, e.g. `(* (- 123) (group 45.67))`.
pub struct AstPrinter {}

impl AstPrinter {
    pub fn new() -> AstPrinter {
        AstPrinter {}
    }
    pub fn print_expression(&mut self, expr: &Expression) -> String {
        expr.accept(self)
    }
    pub fn print_statement(&mut self, stmt: &Statement) -> String {
        stmt.accept(self)
    }
    fn parenthesize(&mut self, name: &str, args: Vec<&Expression>) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push_str(" ");
            x.push_str(self.print_expression(arg).as_str());
        }
        x.push_str(")");
        x
    }
}

impl Default for AstPrinter {
    fn default() -> AstPrinter {
        AstPrinter::new()
    }
}

impl<'a> Visitor<Expression<'a>, String> for AstPrinter {
    fn visit(&mut self, n: &Expression<'a>) -> String {
        match n {
            Expression::Binary {
                left,
                operator,
                right,
            } => self.parenthesize(operator.lexeme, vec![left.as_ref(), right.as_ref()]),
            Expression::Grouping(x) => self.parenthesize("group", vec![x.as_ref()]),
            Expression::Literal(Value::String(s)) => format!("\"{}\"", s),
            Expression::Literal(x) => x.to_string(),
            Expression::Unary { operator, right } => {
                self.parenthesize(operator.lexeme, vec![right.as_ref()])
            }
            Expression::Variable(x) => x.lexeme.to_string(),
            Expression::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.print_expression(value))
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(operator.lexeme, vec![left.as_ref(), right.as_ref()]),
        }
    }
}

impl<'a> Visitor<Statement<'a>, String> for AstPrinter {
    fn visit(&mut self, n: &Statement<'a>) -> String {
        match n {
            Statement::Print(e) => self.parenthesize("print", vec![e]),
            Statement::Expression(e) => self.parenthesize(";", vec![e]),
            Statement::Var { name, initializer } => match initializer {
                Some(e) => format!("(var {} {})", name.lexeme, self.print_expression(e)),
                None => format!("(var {})", name.lexeme),
            },
            Statement::Block(stmts) => {
                let mut x = String::from("(block");
                for stmt in stmts {
                    x.push_str(" ");
                    x.push_str(self.print_statement(stmt).as_str());
                }
                x.push_str(")");
                x
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.print_expression(condition);
                let then_branch = self.print_statement(then_branch);
                match else_branch {
                    Some(e) => format!(
                        "(if {} {} {})",
                        condition,
                        then_branch,
                        self.print_statement(e)
                    ),
                    None => format!("(if {} {})", condition, then_branch),
                }
            }
            Statement::While { condition, body } => {
                let condition = self.print_expression(condition);
                format!("(while {} {})", condition, self.print_statement(body))
            }
        }
    }
}
