use std::fmt;

use anyhow::{bail, Result};

use crate::{error::EvalError, scalar::Scalar};

/// A dense rows x cols grid of scalars with 1-indexed access.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    cells: Vec<Scalar>,
}

impl Matrix {
    /// A zero-filled matrix.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            bail!(EvalError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![Scalar::zero(); rows * cols],
        })
    }

    pub fn identity(size: usize) -> Result<Self> {
        let mut matrix = Matrix::new(size, size)?;
        for i in 1..=size {
            matrix.set(i, i, Scalar::one())?;
        }
        Ok(matrix)
    }

    pub fn from_rows(rows: Vec<Vec<Scalar>>) -> Result<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map_or(0, |row| row.len());
        if row_count == 0 || col_count == 0 {
            bail!(EvalError::InvalidDimensions {
                rows: row_count,
                cols: col_count,
            });
        }
        if let Some(row) = rows.iter().find(|row| row.len() != col_count) {
            bail!(EvalError::DimensionMismatch(format!(
                "matrix rows must all have {} columns, found a row with {}",
                col_count,
                row.len()
            )));
        }
        Ok(Self {
            rows: row_count,
            cols: col_count,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn at(&self, row: usize, col: usize) -> Result<&Scalar> {
        let index = self.index(row, col)?;
        Ok(&self.cells[index])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> Result<()> {
        let index = self.index(row, col)?;
        self.cells[index] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<&[Scalar]> {
        self.index(row, 1)?;
        let start = (row - 1) * self.cols;
        Ok(&self.cells[start..start + self.cols])
    }

    pub fn column(&self, col: usize) -> Result<Vec<Scalar>> {
        self.index(1, col)?;
        Ok(self
            .cells
            .iter()
            .skip(col - 1)
            .step_by(self.cols)
            .cloned()
            .collect())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Scalar> {
        self.cells.iter()
    }

    /// Builds a matrix of the same shape by applying `f` to every cell.
    pub fn map(&self, f: impl FnMut(&Scalar) -> Scalar) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            bail!(EvalError::IndexOutOfRange(format!(
                "position ({},{}) requested in a {}x{} matrix",
                row, col, self.rows, self.cols
            )));
        }
        Ok((row - 1) * self.cols + (col - 1))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.cols).enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            let row: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            write!(f, "[{}]", row.join(", "))?;
        }
        Ok(())
    }
}
