use std::collections::HashMap;

use anyhow::{bail, Result};
use lazy_static::lazy_static;

use crate::{error::ParseError, scalar::Scalar};

pub type ScalarFn = fn(&[Scalar]) -> Result<Scalar>;

#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    pub arity: usize,
    pub func: ScalarFn,
}

lazy_static! {
    static ref FUNCTIONS: HashMap<&'static str, FunctionDef> = HashMap::from([
        ("sin", FunctionDef { arity: 1, func: Functions::sin_fn }),
        ("cos", FunctionDef { arity: 1, func: Functions::cos_fn }),
        ("tan", FunctionDef { arity: 1, func: Functions::tan_fn }),
    ]);
}

pub struct Functions;

impl Functions {
    pub fn get(name: &str) -> Option<&'static FunctionDef> {
        FUNCTIONS.get(name)
    }

    /// Looks up `name` and checks that it takes exactly `got` arguments.
    pub fn check_arity(name: &str, got: usize) -> Result<&'static FunctionDef> {
        let Some(definition) = Self::get(name) else {
            bail!(ParseError::UnknownFunction(name.to_string()));
        };
        if definition.arity != got {
            bail!(ParseError::ArityMismatch {
                name: name.to_string(),
                expected: definition.arity,
                got,
            });
        }
        Ok(definition)
    }

    fn sin_fn(args: &[Scalar]) -> Result<Scalar> {
        args[0].sin()
    }

    fn cos_fn(args: &[Scalar]) -> Result<Scalar> {
        args[0].cos()
    }

    fn tan_fn(args: &[Scalar]) -> Result<Scalar> {
        args[0].tan()
    }
}
