// Copyright 2025 Cowboy AI, LLC.

//! Instances of runtime classes

use crate::class::{Class, Invocation};
use crate::errors::MixinResult;
use dashmap::DashMap;
use serde_json::Value;
use std::fmt;

/// An object of some [`Class`]
///
/// Holds its class and a bag of named fields that mixin methods can use
/// for per-object state.
pub struct Instance {
    class: Class,
    fields: DashMap<String, Value>,
}

impl Instance {
    /// Create an instance of `class`
    pub fn new(class: &Class) -> Self {
        Self {
            class: class.clone(),
            fields: DashMap::new(),
        }
    }

    /// The concrete class of this instance
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Call a method, dispatching from the concrete class
    pub fn call(&self, method: &str, args: &[Value]) -> MixinResult<Value> {
        Invocation::dispatch(self, &self.class, method, args)
    }

    /// Check whether this instance's class is `class` or derives from it
    pub fn instance_of(&self, class: &Class) -> bool {
        self.class.is_subclass_of(class)
    }

    /// Read a field
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field).map(|entry| entry.value().clone())
    }

    /// Write a field, returning the previous value
    pub fn set(&self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("fields", &self.fields.len())
            .finish()
    }
}
