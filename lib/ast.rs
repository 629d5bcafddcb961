use std::fmt;

use anyhow::Result;

use crate::{functions::Functions, scalar::Scalar};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 13,
            Operator::Multiply | Operator::Divide => 14,
            Operator::Power => 15,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(Scalar),
    Variable(char),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        operator: Operator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        name: String,
        arguments: Vec<Expression>,
    },
}

impl Expression {
    pub fn negate(operand: Expression) -> Self {
        Expression::Unary {
            operator: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }

    pub fn binary(operator: Operator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Fails unless `name` is registered with exactly `arguments.len()` parameters.
    pub fn call(name: &str, arguments: Vec<Expression>) -> Result<Self> {
        Functions::check_arity(name, arguments.len())?;
        Ok(Expression::Call {
            name: name.to_string(),
            arguments,
        })
    }

    pub fn height(&self) -> usize {
        match self {
            Expression::Number(_) | Expression::Variable(_) => 1,
            Expression::Unary { operand, .. } => 1 + operand.height(),
            Expression::Binary { left, right, .. } => 1 + left.height().max(right.height()),
            Expression::Call { arguments, .. } => {
                1 + arguments.iter().map(Expression::height).max().unwrap_or(0)
            }
        }
    }

    /// `T` or `t` written as an exponent.
    pub fn is_transpose_marker(&self) -> bool {
        matches!(self, Expression::Variable('T' | 't'))
    }

    /// A literal `-1`, either folded or as the negation of the literal `1`.
    pub fn is_minus_one(&self) -> bool {
        let minus_one = Scalar::from_integer(-1);
        match self {
            Expression::Number(value) => value.is_exact() && *value == minus_one,
            Expression::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => matches!(
                operand.as_ref(),
                Expression::Number(value) if value.is_exact() && *value == Scalar::one()
            ),
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Subtract => write!(f, "-"),
            Operator::Multiply => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::Power => write!(f, "^"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => write!(f, "(-{})", operand),
            Expression::Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Call { name, arguments } => {
                let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, arguments.join(", "))
            }
        }
    }
}
