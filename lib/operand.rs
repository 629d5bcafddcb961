use std::fmt;

use crate::{
    linalg::{Matrix, Vector},
    scalar::Scalar,
};

#[derive(Debug, PartialEq, Clone)]
pub enum Operand {
    Scalar(Scalar),
    Matrix(Matrix),
    Vector(Vector),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum OperandKind {
    Scalar,
    Matrix,
    Vector,
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Scalar(_) => OperandKind::Scalar,
            Operand::Matrix(_) => OperandKind::Matrix,
            Operand::Vector(_) => OperandKind::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Operand::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_zero_scalar(&self) -> bool {
        self.as_scalar().is_some_and(Scalar::is_zero)
    }

    /// True when no scalar inside the operand has overflowed to infinity or NaN.
    pub fn is_finite(&self) -> bool {
        match self {
            Operand::Scalar(value) => value.is_finite(),
            Operand::Matrix(matrix) => matrix.cells().all(Scalar::is_finite),
            Operand::Vector(vector) => vector.components().iter().all(Scalar::is_finite),
        }
    }
}

impl From<Scalar> for Operand {
    fn from(value: Scalar) -> Self {
        Operand::Scalar(value)
    }
}

impl From<Matrix> for Operand {
    fn from(value: Matrix) -> Self {
        Operand::Matrix(value)
    }
}

impl From<Vector> for Operand {
    fn from(value: Vector) -> Self {
        Operand::Vector(value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Scalar(value) => write!(f, "{}", value),
            Operand::Matrix(value) => write!(f, "{}", value),
            Operand::Vector(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OperandKind::Scalar => write!(f, "scalar"),
            OperandKind::Matrix => write!(f, "matrix"),
            OperandKind::Vector => write!(f, "vector"),
        }
    }
}
