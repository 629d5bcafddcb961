use thiserror::Error;

use crate::operand::OperandKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unsupported command '\\{0}'")]
    UnsupportedCommand(String),

    #[error("unrecognized token: {0}")]
    UnrecognizedToken(char),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected {0}, found end of input")]
    UnexpectedEnd(String),

    #[error("expected operand, found {0}")]
    ExpectedOperand(String),

    #[error("expected operator, found {0}")]
    ExpectedOperator(String),

    #[error("expected operand after unary operator")]
    MissingUnaryOperand,

    #[error("operator not allowed as unary: {0}")]
    InvalidUnary(String),

    #[error("invalid encloser: {0}")]
    InvalidEncloser(String),

    #[error("function {name} expected {expected} arguments but got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("function {0} does not exist")]
    UnknownFunction(String),

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("malformed expression")]
    MalformedExpression,

    #[error("expression nested too deeply (limit {0})")]
    TooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown variable '{0}' in expression")]
    UnknownVariable(char),

    #[error("reserved keyword: {0}")]
    ReservedKeyword(char),

    #[error("type combination not supported: {0} and {1}")]
    UnsupportedTypes(OperandKind, OperandKind),

    #[error("{operation} not supported for {kind}")]
    UnsupportedOperation {
        operation: &'static str,
        kind: OperandKind,
    },

    #[error("function {name} expects scalar arguments, got {kind}")]
    NonScalarArgument { name: String, kind: OperandKind },

    #[error("division by zero")]
    DivisionByZero,

    #[error("matrix is singular and has no inverse")]
    Singular,

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("rows and columns must be greater than 0, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("a vector cannot be empty")]
    EmptyVector,

    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("expression is not evaluable: {0}")]
    NotEvaluable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("variable names must be a single character, got '{0}'")]
    InvalidName(String),

    #[error("no contents given for '{0}'")]
    EmptyContents(String),

    #[error("cell '{cell}' of '{name}' is a {kind}, expected a scalar")]
    NonScalarCell {
        name: String,
        cell: String,
        kind: OperandKind,
    },
}
