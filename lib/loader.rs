//! Environments described as JSON.
//!
//! ```json
//! {
//!     "A": { "type": "Matrix", "contents": [["1", "0"], ["0", "1"]] },
//!     "x": { "type": "Vector", "contents": [2, "\\frac12"] },
//!     "k": { "type": "Expression", "contents": "2\\pi" }
//! }
//! ```
//!
//! Cells are JSON numbers, read as exact decimals, or expressions that must
//! evaluate to a scalar.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    environment::Environment,
    error::{LoadError, ParseError},
    evaluator::evaluate,
    linalg::{Matrix, Vector},
    operand::Operand,
    parser::parse,
    scalar::Scalar,
};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "contents")]
pub enum Descriptor {
    Matrix(Vec<Vec<Cell>>),
    Vector(Vec<Cell>),
    Expression(Source),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Line(String),
    Lines(Vec<String>),
}

impl Cell {
    fn to_scalar(&self, name: &str, env: &Environment) -> Result<Scalar> {
        match self {
            Cell::Number(number) => {
                let literal = number.to_string();
                if let Ok(value) = Scalar::from_decimal_str(&literal) {
                    return Ok(value);
                }
                match number.as_f64() {
                    Some(value) => Ok(Scalar::from_f64(value)),
                    None => bail!(ParseError::InvalidNumber(literal)),
                }
            }
            Cell::Text(text) => match evaluate(&parse(text)?, env)? {
                Operand::Scalar(value) => Ok(value),
                other => bail!(LoadError::NonScalarCell {
                    name: name.to_string(),
                    cell: text.clone(),
                    kind: other.kind(),
                }),
            },
        }
    }
}

impl Descriptor {
    /// Builds the operand, evaluating cells and expressions under `env`.
    pub fn to_operand(&self, name: &str, env: &Environment) -> Result<Operand> {
        let empty = || LoadError::EmptyContents(name.to_string());
        match self {
            Descriptor::Matrix(rows) => {
                if rows.first().map_or(true, Vec::is_empty) {
                    bail!(empty());
                }
                let rows = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|cell| cell.to_scalar(name, env))
                            .collect::<Result<Vec<Scalar>>>()
                    })
                    .collect::<Result<Vec<Vec<Scalar>>>>()?;
                Ok(Operand::Matrix(Matrix::from_rows(rows)?))
            }
            Descriptor::Vector(cells) => {
                if cells.is_empty() {
                    bail!(empty());
                }
                let components = cells
                    .iter()
                    .map(|cell| cell.to_scalar(name, env))
                    .collect::<Result<Vec<Scalar>>>()?;
                Ok(Operand::Vector(Vector::new(components)?))
            }
            Descriptor::Expression(source) => {
                let text = match source {
                    Source::Line(line) => line.clone(),
                    Source::Lines(lines) => lines.join(" "),
                };
                if text.trim().is_empty() {
                    bail!(empty());
                }
                evaluate(&parse(&text)?, env)
            }
        }
    }
}

fn variable_name(name: &str) -> Result<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => bail!(LoadError::InvalidName(name.to_string())),
    }
}

/// Reads a single `{"type": ..., "contents": ...}` descriptor.
pub fn load_operand(json: &str) -> Result<Operand> {
    let descriptor: Descriptor =
        serde_json::from_str(json).context("invalid operand description")?;
    descriptor.to_operand("operand", &Environment::new())
}

/// Loads every binding in `json` into `env`. Cells are evaluated against `env`
/// as it was before the call; on error `env` is left untouched.
pub fn load_into(json: &str, env: &mut Environment) -> Result<Vec<char>> {
    let descriptors: BTreeMap<String, Descriptor> =
        serde_json::from_str(json).context("invalid environment description")?;

    let mut loaded = Environment::empty();
    for (name, descriptor) in &descriptors {
        let key = variable_name(name)?;
        loaded.set(key, descriptor.to_operand(name, env)?);
    }

    let names = loaded.names();
    env.extend(loaded);
    Ok(names)
}

/// The default environment with the bindings of `json` merged over it.
pub fn load_environment(json: &str) -> Result<Environment> {
    let mut env = Environment::new();
    load_into(json, &mut env)?;
    Ok(env)
}
