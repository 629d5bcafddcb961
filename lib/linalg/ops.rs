use anyhow::{bail, Result};

use crate::{
    error::EvalError,
    linalg::{Matrix, Vector},
    scalar::Scalar,
};

/// Approximate pivots at or below this magnitude count as zero.
const PIVOT_EPSILON: f64 = 1e-12;

pub fn matrix_add(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    elementwise(a, b, "addition", |x, y| x + y)
}

pub fn matrix_sub(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    elementwise(a, b, "subtraction", |x, y| x - y)
}

pub fn matrix_mul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.cols() != b.rows() {
        bail!(EvalError::DimensionMismatch(format!(
            "cannot multiply a {}x{} matrix by a {}x{} matrix",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    let mut product = Matrix::new(a.rows(), b.cols())?;
    for i in 1..=a.rows() {
        for j in 1..=b.cols() {
            let mut sum = Scalar::zero();
            for k in 1..=a.cols() {
                sum = &sum + &(a.at(i, k)? * b.at(k, j)?);
            }
            product.set(i, j, sum)?;
        }
    }
    Ok(product)
}

pub fn matrix_scale(a: &Matrix, factor: &Scalar) -> Matrix {
    a.map(|cell| cell * factor)
}

pub fn matrix_times_vector(a: &Matrix, v: &Vector) -> Result<Vector> {
    if a.cols() != v.dimension() {
        bail!(EvalError::DimensionMismatch(format!(
            "cannot multiply a {}x{} matrix by a vector of dimension {}",
            a.rows(),
            a.cols(),
            v.dimension()
        )));
    }
    let components = (1..=a.rows())
        .map(|i| {
            let row = a.row(i)?;
            Ok(row
                .iter()
                .zip(v.components())
                .fold(Scalar::zero(), |sum, (x, y)| &sum + &(x * y)))
        })
        .collect::<Result<Vec<Scalar>>>()?;
    Vector::new(components)
}

pub fn matrix_transpose(a: &Matrix) -> Result<Matrix> {
    let columns = (1..=a.cols())
        .map(|j| a.column(j))
        .collect::<Result<Vec<Vec<Scalar>>>>()?;
    Matrix::from_rows(columns)
}

/// Gauss-Jordan elimination on `[a | I]` with partial pivoting by magnitude.
pub fn matrix_inverse(a: &Matrix) -> Result<Matrix> {
    if !a.is_square() {
        bail!(EvalError::DimensionMismatch(format!(
            "only square matrices can be inverted, got {}x{}",
            a.rows(),
            a.cols()
        )));
    }
    let n = a.rows();
    let mut left: Vec<Vec<Scalar>> = (1..=n)
        .map(|i| a.row(i).map(|row| row.to_vec()))
        .collect::<Result<_>>()?;
    let mut right: Vec<Vec<Scalar>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { Scalar::one() } else { Scalar::zero() })
                .collect()
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .filter(|&row| usable_pivot(&left[row][col]))
            .max_by(|&x, &y| {
                let x = left[x][col].to_f64().abs();
                let y = left[y][col].to_f64().abs();
                x.total_cmp(&y)
            })
            .ok_or(EvalError::Singular)?;
        left.swap(col, pivot);
        right.swap(col, pivot);

        let factor = left[col][col].recip()?;
        left[col] = left[col].iter().map(|x| x * &factor).collect();
        right[col] = right[col].iter().map(|x| x * &factor).collect();

        for row in 0..n {
            if row == col || left[row][col].is_zero() {
                continue;
            }
            let scale = left[row][col].clone();
            left[row] = subtract_scaled(&left[row], &left[col], &scale);
            right[row] = subtract_scaled(&right[row], &right[col], &scale);
        }
    }

    Matrix::from_rows(right)
}

pub fn vector_add(a: &Vector, b: &Vector) -> Result<Vector> {
    zip_vectors(a, b, "addition", |x, y| x + y)
}

pub fn vector_sub(a: &Vector, b: &Vector) -> Result<Vector> {
    zip_vectors(a, b, "subtraction", |x, y| x - y)
}

pub fn vector_scale(v: &Vector, factor: &Scalar) -> Vector {
    v.map(|component| component * factor)
}

pub fn vector_transpose(v: &Vector) -> Vector {
    v.transposed()
}

fn usable_pivot(value: &Scalar) -> bool {
    match value {
        Scalar::Exact(_) => !value.is_zero(),
        Scalar::Approx(x) => x.abs() > PIVOT_EPSILON,
    }
}

fn subtract_scaled(target: &[Scalar], source: &[Scalar], scale: &Scalar) -> Vec<Scalar> {
    target
        .iter()
        .zip(source)
        .map(|(t, s)| t - &(s * scale))
        .collect()
}

fn elementwise(
    a: &Matrix,
    b: &Matrix,
    operation: &str,
    f: impl Fn(&Scalar, &Scalar) -> Scalar,
) -> Result<Matrix> {
    if a.rows() != b.rows() || a.cols() != b.cols() {
        bail!(EvalError::DimensionMismatch(format!(
            "matrix {} requires equal sizes, got {}x{} and {}x{}",
            operation,
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    let cells: Vec<Scalar> = a.cells().zip(b.cells()).map(|(x, y)| f(x, y)).collect();
    Matrix::from_rows(cells.chunks(a.cols()).map(|row| row.to_vec()).collect())
}

fn zip_vectors(
    a: &Vector,
    b: &Vector,
    operation: &str,
    f: impl Fn(&Scalar, &Scalar) -> Scalar,
) -> Result<Vector> {
    if a.dimension() != b.dimension() {
        bail!(EvalError::DimensionMismatch(format!(
            "vector {} requires equal dimensions, got {} and {}",
            operation,
            a.dimension(),
            b.dimension()
        )));
    }
    let components = a
        .components()
        .iter()
        .zip(b.components())
        .map(|(x, y)| f(x, y))
        .collect();
    Vector::with_orientation(components, a.orientation())
}
