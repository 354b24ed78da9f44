// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module records and their exports

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{LoaderError, Result};

/// An exported native function
pub type Function = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// A single exported binding
#[derive(Clone)]
pub enum Export {
    /// Plain data
    Value(Value),
    /// Callable
    Function(Function),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Function(_) => f.write_str("Function"),
        }
    }
}

/// A shared exports object.
///
/// Clones alias the same bindings, like references to a JS object.
#[derive(Clone, Default)]
pub struct Exports {
    bindings: Rc<RefCell<HashMap<String, Export>>>,
}

impl Exports {
    /// Create an empty exports object
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a value
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings
            .borrow_mut()
            .insert(name.into(), Export::Value(value));
    }

    /// Bind `name` to a function
    pub fn function<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.bindings
            .borrow_mut()
            .insert(name.into(), Export::Function(Rc::new(f)));
    }

    /// Look up a binding
    pub fn get(&self, name: &str) -> Option<Export> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Look up a plain value binding
    pub fn value(&self, name: &str) -> Option<Value> {
        match self.get(name)? {
            Export::Value(v) => Some(v),
            Export::Function(_) => None,
        }
    }

    /// Call the function bound to `function`.
    ///
    /// `module` only names the owner in the error.
    pub fn call(&self, module: &str, function: &str, args: &[Value]) -> Result<Value> {
        // The binding is cloned out so the callee may modify these exports.
        match self.get(function) {
            Some(Export::Function(f)) => f(args),
            _ => Err(LoaderError::NotAFunction {
                module: module.to_string(),
                function: function.to_string(),
            }),
        }
    }

    /// Whether two handles alias the same object
    pub fn ptr_eq(&self, other: &Exports) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
    }
}

impl fmt::Debug for Exports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.bindings.borrow().iter()).finish()
    }
}

/// The `module` object handed to a payload
#[derive(Debug)]
pub struct ModuleRecord {
    name: String,
    exports: RefCell<Exports>,
}

impl ModuleRecord {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: RefCell::new(Exports::new()),
        }
    }

    /// The module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current exports object
    pub fn exports(&self) -> Exports {
        self.exports.borrow().clone()
    }

    /// Replace the exports object (`module.exports = ...`)
    pub fn set_exports(&self, exports: Exports) {
        *self.exports.borrow_mut() = exports;
    }
}
