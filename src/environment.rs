use crate::evaluator::is_operator_keyword;
use crate::types::Expression;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

// --- Environment Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),
    #[error("cannot redefine '{0}'")]
    Redefinition(String),
}

/// The flat symbol table of one session. A name binds exactly once for the
/// lifetime of the interpreter: no rebinding, no update operation, and the
/// operator keywords can never be bound at all.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Expression>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Binds `name -> value`. Fails if the name is an operator keyword or is
    /// already bound.
    pub fn define(&mut self, name: &str, value: Expression) -> Result<(), EnvError> {
        if is_operator_keyword(name) {
            return Err(EnvError::Redefinition(name.to_string()));
        }
        match self.bindings.entry(name.to_string()) {
            Entry::Occupied(_) => Err(EnvError::Redefinition(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Looks up a binding, returning a copy of the bound value.
    pub fn get(&self, name: &str) -> Result<Expression, EnvError> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::UndefinedSymbol(name.to_string()))
    }

    /// All bound names. The REPL completer reads these.
    pub fn identifiers(&self) -> HashSet<String> {
        self.bindings.keys().cloned().collect()
    }
}
