use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::{error::EvalError, operand::Operand, scalar::Scalar};

/// Names that exist in every default environment but can never be read as values.
pub const RESERVED: [char; 3] = ['T', 't', 'I'];

#[derive(Debug, PartialEq, Clone)]
pub enum Binding {
    Value(Operand),
    Reserved,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Environment {
    store: HashMap<char, Binding>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// The reserved names plus `e` bound to Euler's number.
    pub fn new() -> Self {
        let mut env = Self::empty();
        for name in RESERVED {
            env.store.insert(name, Binding::Reserved);
        }
        env.set('e', Operand::Scalar(Scalar::e()));
        env
    }

    pub fn empty() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    pub fn get(&self, name: char) -> Result<&Operand> {
        match self.store.get(&name) {
            Some(Binding::Value(value)) => Ok(value),
            Some(Binding::Reserved) => bail!(EvalError::ReservedKeyword(name)),
            None => bail!(EvalError::UnknownVariable(name)),
        }
    }

    pub fn set(&mut self, name: char, value: Operand) {
        self.store.insert(name, Binding::Value(value));
    }

    pub fn reserve(&mut self, name: char) {
        self.store.insert(name, Binding::Reserved);
    }

    pub fn contains(&self, name: char) -> bool {
        self.store.contains_key(&name)
    }

    /// Copies every binding of `other` over this environment.
    pub fn extend(&mut self, other: Environment) {
        self.store.extend(other.store);
    }

    /// Bound names in sorted order, reserved names excluded.
    pub fn names(&self) -> Vec<char> {
        let mut names: Vec<char> = self
            .store
            .iter()
            .filter(|(_, binding)| matches!(binding, Binding::Value(_)))
            .map(|(name, _)| *name)
            .collect();
        names.sort_unstable();
        names
    }
}
