use anyhow::{bail, Result};

use crate::{
    error::EvalError,
    linalg::ops,
    operand::{Operand, OperandKind},
    scalar::Scalar,
};

pub type Handler = fn(&Operand, &Operand) -> Result<Operand>;

/// One `(left kind, right kind) -> implementation` row of an operator table.
#[derive(Clone, Copy)]
pub struct Entry {
    pub left: OperandKind,
    pub right: OperandKind,
    pub handler: Handler,
}

impl Entry {
    pub const fn new(left: OperandKind, right: OperandKind, handler: Handler) -> Self {
        Self {
            left,
            right,
            handler,
        }
    }

    fn matches(&self, left: OperandKind, right: OperandKind) -> bool {
        self.left == left && self.right == right
    }
}

/// Picks the implementation for `a` and `b` from `table`.
///
/// The last entry matching `(a, b)` wins. Failing that, the last entry matching
/// `(b, a)` is called with the operands swapped, so `scalar * matrix` runs the
/// `matrix * scalar` row.
pub fn dispatch(a: &Operand, b: &Operand, table: &[Entry]) -> Result<Operand> {
    let (left, right) = (a.kind(), b.kind());

    if let Some(entry) = table.iter().rev().find(|entry| entry.matches(left, right)) {
        return (entry.handler)(a, b);
    }

    if let Some(entry) = table.iter().rev().find(|entry| entry.matches(right, left)) {
        return (entry.handler)(b, a);
    }

    bail!(EvalError::UnsupportedTypes(left, right))
}

macro_rules! handler {
    ($name:ident, $left:ident, $right:ident, |$a:ident, $b:ident| $body:expr) => {
        fn $name(a: &Operand, b: &Operand) -> Result<Operand> {
            match (a, b) {
                (Operand::$left($a), Operand::$right($b)) => ($body).map(Operand::from),
                _ => bail!(EvalError::UnsupportedTypes(a.kind(), b.kind())),
            }
        }
    };
}

handler!(add_scalars, Scalar, Scalar, |x, y| Ok::<_, anyhow::Error>(x + y));
handler!(add_matrices, Matrix, Matrix, |x, y| ops::matrix_add(x, y));
handler!(add_vectors, Vector, Vector, |x, y| ops::vector_add(x, y));

handler!(sub_scalars, Scalar, Scalar, |x, y| Ok::<_, anyhow::Error>(x - y));
handler!(sub_matrices, Matrix, Matrix, |x, y| ops::matrix_sub(x, y));
handler!(sub_vectors, Vector, Vector, |x, y| ops::vector_sub(x, y));

handler!(mul_scalars, Scalar, Scalar, |x, y| Ok::<_, anyhow::Error>(x * y));
handler!(mul_matrices, Matrix, Matrix, |x, y| ops::matrix_mul(x, y));
handler!(mul_matrix_vector, Matrix, Vector, |x, y| ops::matrix_times_vector(x, y));
handler!(mul_matrix_scalar, Matrix, Scalar, |x, y| {
    Ok::<_, anyhow::Error>(ops::matrix_scale(x, y))
});
handler!(mul_vector_scalar, Vector, Scalar, |x, y| {
    Ok::<_, anyhow::Error>(ops::vector_scale(x, y))
});

handler!(div_scalars, Scalar, Scalar, |x, y| x.checked_div(y));
handler!(div_matrices, Matrix, Matrix, |x, y| {
    ops::matrix_mul(x, &ops::matrix_inverse(y)?)
});
handler!(div_matrix_scalar, Matrix, Scalar, |x, y| {
    Ok::<_, anyhow::Error>(ops::matrix_scale(x, &y.recip()?))
});
handler!(div_vector_scalar, Vector, Scalar, |x, y| {
    Ok::<_, anyhow::Error>(ops::vector_scale(x, &y.recip()?))
});

handler!(pow_scalars, Scalar, Scalar, |x, y| x.pow(y));

use OperandKind::{Matrix as M, Scalar as S, Vector as V};

pub const ADD: &[Entry] = &[
    Entry::new(S, S, add_scalars),
    Entry::new(M, M, add_matrices),
    Entry::new(V, V, add_vectors),
];

pub const SUBTRACT: &[Entry] = &[
    Entry::new(S, S, sub_scalars),
    Entry::new(M, M, sub_matrices),
    Entry::new(V, V, sub_vectors),
];

pub const MULTIPLY: &[Entry] = &[
    Entry::new(S, S, mul_scalars),
    Entry::new(M, M, mul_matrices),
    Entry::new(M, V, mul_matrix_vector),
    Entry::new(M, S, mul_matrix_scalar),
    Entry::new(V, S, mul_vector_scalar),
];

pub const DIVIDE: &[Entry] = &[
    Entry::new(S, S, div_scalars),
    Entry::new(M, M, div_matrices),
    Entry::new(M, S, div_matrix_scalar),
    Entry::new(V, S, div_vector_scalar),
];

pub const POWER: &[Entry] = &[Entry::new(S, S, pow_scalars)];

pub fn negate(operand: &Operand) -> Result<Operand> {
    let minus_one = Scalar::from_integer(-1);
    Ok(match operand {
        Operand::Scalar(value) => Operand::Scalar(-value),
        Operand::Matrix(value) => Operand::Matrix(ops::matrix_scale(value, &minus_one)),
        Operand::Vector(value) => Operand::Vector(ops::vector_scale(value, &minus_one)),
    })
}

pub fn invert(operand: &Operand) -> Result<Operand> {
    match operand {
        Operand::Scalar(value) => Ok(Operand::Scalar(value.recip()?)),
        Operand::Matrix(value) => Ok(Operand::Matrix(ops::matrix_inverse(value)?)),
        Operand::Vector(_) => bail!(EvalError::UnsupportedOperation {
            operation: "inverse",
            kind: operand.kind(),
        }),
    }
}

pub fn transpose(operand: &Operand) -> Result<Operand> {
    match operand {
        Operand::Matrix(value) => Ok(Operand::Matrix(ops::matrix_transpose(value)?)),
        Operand::Vector(value) => Ok(Operand::Vector(ops::vector_transpose(value))),
        Operand::Scalar(_) => bail!(EvalError::UnsupportedOperation {
            operation: "transpose",
            kind: operand.kind(),
        }),
    }
}
