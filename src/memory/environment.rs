//! Lexical scopes
//!
//! An [`Environment`] is one scope: a map of bindings plus an optional parent.
//! Scopes are shared as `Rc<RefCell<Environment>>` because closures keep their
//! defining scope alive after the block that created it has finished.

use crate::memory::value::Value;
use crate::parser::ast::Location;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
    pub location: Location,
}

/// Why a define or assign was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    AlreadyDeclared,
    ShadowingDisabled,
    AssignmentToConstant,
}

#[derive(Debug, Default)]
pub struct Environment {
    bindings: FxHashMap<String, Binding>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            bindings: FxHashMap::default(),
            enclosing: Some(enclosing),
        }))
    }

    pub fn enclosing(&self) -> Option<Rc<RefCell<Environment>>> {
        self.enclosing.clone()
    }

    /// Declare `name` in this scope.
    pub fn define(&mut self, name: &str, binding: Binding, allow_shadowing: bool) -> Result<(), ScopeError> {
        if self.bindings.contains_key(name) {
            return Err(ScopeError::AlreadyDeclared);
        }
        if !allow_shadowing && self.is_defined_in_enclosing_scope(name) {
            return Err(ScopeError::ShadowingDisabled);
        }
        self.bindings.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(binding) => Some(binding.value.clone()),
            None => self.enclosing.as_ref()?.borrow().get(name),
        }
    }

    /// Assign to the nearest binding of `name`; `Ok(false)` if there is none.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<bool, ScopeError> {
        match self.bindings.get_mut(name) {
            Some(binding) if binding.is_const => Err(ScopeError::AssignmentToConstant),
            Some(binding) => {
                binding.value = value;
                Ok(true)
            }
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow_mut().assign(name, value),
                None => Ok(false),
            },
        }
    }

    pub fn is_const(&self, name: &str) -> bool {
        match self.bindings.get(name) {
            Some(binding) => binding.is_const,
            None => self
                .enclosing
                .as_ref()
                .is_some_and(|enclosing| enclosing.borrow().is_const(name)),
        }
    }

    pub fn is_defined_in_enclosing_scope(&self, name: &str) -> bool {
        self.enclosing
            .as_ref()
            .is_some_and(|enclosing| enclosing.borrow().is_defined(name))
    }

    fn is_defined(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.is_defined_in_enclosing_scope(name)
    }

    /// Every visible binding, inner scopes winning over outer ones.
    pub fn get_all_variables(&self) -> BTreeMap<String, Value> {
        let mut variables = match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get_all_variables(),
            None => BTreeMap::new(),
        };
        for (name, binding) in &self.bindings {
            variables.insert(name.clone(), binding.value.clone());
        }
        variables
    }
}
