use std::fmt;

use anyhow::{bail, Result};

use crate::{error::EvalError, scalar::Scalar};

/// Presentation-only tag; no arithmetic rule reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Row,
    #[default]
    Column,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Row => Orientation::Column,
            Orientation::Column => Orientation::Row,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    components: Vec<Scalar>,
    orientation: Orientation,
}

impl Vector {
    pub fn new(components: Vec<Scalar>) -> Result<Self> {
        Self::with_orientation(components, Orientation::default())
    }

    pub fn with_orientation(components: Vec<Scalar>, orientation: Orientation) -> Result<Self> {
        if components.is_empty() {
            bail!(EvalError::EmptyVector);
        }
        Ok(Self {
            components,
            orientation,
        })
    }

    pub fn dimension(&self) -> usize {
        self.components.len()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn components(&self) -> &[Scalar] {
        &self.components
    }

    pub fn at(&self, index: usize) -> Result<&Scalar> {
        let position = self.position(index)?;
        Ok(&self.components[position])
    }

    pub fn set(&mut self, index: usize, value: Scalar) -> Result<()> {
        let position = self.position(index)?;
        self.components[position] = value;
        Ok(())
    }

    pub fn map(&self, f: impl FnMut(&Scalar) -> Scalar) -> Vector {
        Vector {
            components: self.components.iter().map(f).collect(),
            orientation: self.orientation,
        }
    }

    pub fn transposed(&self) -> Vector {
        Vector {
            components: self.components.clone(),
            orientation: self.orientation.flipped(),
        }
    }

    fn position(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.components.len() {
            bail!(EvalError::IndexOutOfRange(format!(
                "component {} requested in a vector of dimension {}",
                index,
                self.components.len()
            )));
        }
        Ok(index - 1)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let components: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", components.join(", "))?;
        if self.orientation == Orientation::Row {
            write!(f, "ᵀ")?;
        }
        Ok(())
    }
}
