use std::cmp::Ordering;

use anyhow::{bail, Result};

use crate::{
    ast::Expression, environment::Environment, error::EvalError, evaluator::evaluate,
    operand::Operand, parser::parse, scalar::Scalar,
};

/// An expression in one variable, usable as `f(x) -> y` over floats.
#[derive(Debug, Clone)]
pub struct Callable {
    expression: Expression,
    variable: char,
    env: Environment,
}

impl Callable {
    pub fn new(text: &str, variable: char) -> Result<Self> {
        Self::with_environment(text, variable, Environment::new())
    }

    pub fn with_environment(text: &str, variable: char, env: Environment) -> Result<Self> {
        Ok(Self {
            expression: parse(text)?,
            variable,
            env,
        })
    }

    pub fn variable(&self) -> char {
        self.variable
    }

    pub fn call(&self, x: f64) -> Result<f64> {
        let mut env = self.env.clone();
        env.set(self.variable, Operand::Scalar(Scalar::from_f64(x)));
        match evaluate(&self.expression, &env)? {
            Operand::Scalar(value) => Ok(value.to_f64()),
            other => bail!(EvalError::UnsupportedOperation {
                operation: "numeric evaluation",
                kind: other.kind(),
            }),
        }
    }

    /// `points` evenly spaced `(x, f(x))` pairs over `[min, max]`, skipping
    /// the points where `f` cannot be evaluated.
    pub fn sample(&self, min: f64, max: f64, points: usize) -> Result<Vec<(f64, f64)>> {
        if points < 2 {
            bail!("at least 2 sample points are required, got {}", points);
        }
        if min.partial_cmp(&max) != Some(Ordering::Less) {
            bail!("invalid sample range: {} to {}", min, max);
        }

        let step = (max - min) / (points - 1) as f64;
        Ok((0..points)
            .map(|i| if i == points - 1 { max } else { min + step * i as f64 })
            .filter_map(|x| self.call(x).ok().map(|y| (x, y)))
            .collect())
    }
}
