// Copyright 2025 Cowboy AI, LLC.

//! Runtime classes: single-parent chains of behavioral templates
//!
//! A [`Class`] is an immutable, cheaply cloned handle. Extending a class
//! never touches it; the new class simply links to it as its parent.
//!
//! ```mermaid
//! graph BT
//!     C[C] -->|parent| M2["M2(M1(Base))"]
//!     M2 -->|parent| M1["M1(Base)"]
//!     M1 -->|parent| B[Base]
//! ```

use crate::cache::CacheTable;
use crate::errors::{MixinError, MixinResult};
use crate::identifiers::{ClassId, ExtensionId};
use crate::instance::Instance;
use crate::tags::{Marker, TagStore};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// A method body
///
/// Receives the running [`Invocation`] (for `this` and super calls) and the
/// call arguments.
pub type Method = Arc<dyn Fn(&Invocation<'_>, &[Value]) -> MixinResult<Value> + Send + Sync>;

/// The shared behavior of a class: its own methods plus identity tags
pub struct Template {
    class_id: ClassId,
    methods: HashMap<String, Method>,
    tags: TagStore<ExtensionId>,
}

impl Template {
    /// ID of the class owning this template
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Method defined directly on this template
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Check if this template defines `name` itself
    pub fn defines(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Names of the methods defined directly on this template
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Identity tags attached to this template
    pub fn tags(&self) -> &TagStore<ExtensionId> {
        &self.tags
    }

    /// Extension recorded as having produced this template
    pub fn applied_extension(&self) -> Option<ExtensionId> {
        self.tags.read_tag(&Marker::applied())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.method_names().collect();
        methods.sort_unstable();
        f.debug_struct("Template")
            .field("class_id", &self.class_id)
            .field("methods", &methods)
            .field("applied", &self.applied_extension())
            .finish()
    }
}

struct ClassInner {
    id: ClassId,
    name: String,
    parent: Option<Class>,
    template: Template,
    caches: TagStore<Arc<CacheTable>>,
}

/// A runtime class
///
/// Equality and hashing follow class identity, never structure.
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    /// Start building a class with no parent
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name, None)
    }

    /// A fresh, empty root class
    pub fn root() -> Self {
        Self::builder("Object").build()
    }

    /// Start building a subclass of this class
    pub fn extend(&self, name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name, Some(self.clone()))
    }

    /// Class identity
    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    /// Class name, for diagnostics only
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The class this one was derived from
    pub fn parent(&self) -> Option<&Class> {
        self.inner.parent.as_ref()
    }

    /// This class's behavioral template
    pub fn template(&self) -> &Template {
        &self.inner.template
    }

    /// Per-class side table for memoized applications
    pub(crate) fn caches(&self) -> &TagStore<Arc<CacheTable>> {
        &self.inner.caches
    }

    /// Walk this class and its ancestors, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors::new(self)
    }

    /// Check if this class is `other` or derives from it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestors().any(|class| class == other)
    }

    /// Find the nearest definition of `name`, starting at this class
    pub fn find_method(&self, name: &str) -> Option<(&Class, &Method)> {
        self.ancestors()
            .find_map(|class| class.template().method(name).map(|method| (class, method)))
    }

    /// Create an instance of this class
    pub fn instantiate(&self) -> Instance {
        Instance::new(self)
    }

    /// A handle that does not keep this class alive
    pub fn downgrade(&self) -> WeakClass {
        WeakClass(Arc::downgrade(&self.inner))
    }
}

/// Non-owning handle to a class
///
/// Held by cache tables so that a base never keeps its derived classes
/// (and, through their parent links, itself) alive.
#[derive(Clone, Default)]
pub struct WeakClass(Weak<ClassInner>);

impl WeakClass {
    /// Recover the class if any strong handle to it remains
    pub fn upgrade(&self) -> Option<Class> {
        self.0.upgrade().map(|inner| Class { inner })
    }
}

impl fmt::Debug for WeakClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakClass")
            .field(&self.upgrade().map(|class| class.id()))
            .finish()
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(Class::name))
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

/// Builder for a new class
pub struct ClassBuilder {
    name: String,
    parent: Option<Class>,
    methods: HashMap<String, Method>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>, parent: Option<Class>) -> Self {
        Self {
            name: name.into(),
            parent,
            methods: HashMap::new(),
        }
    }

    /// Define (or override) a method
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>, &[Value]) -> MixinResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(body));
        self
    }

    /// Finish the class
    pub fn build(self) -> Class {
        let id = ClassId::new();
        Class {
            inner: Arc::new(ClassInner {
                id,
                name: self.name,
                parent: self.parent,
                template: Template {
                    class_id: id,
                    methods: self.methods,
                    tags: TagStore::new(),
                },
                caches: TagStore::new(),
            }),
        }
    }
}

/// Iterator over a class and its ancestors
///
/// Stops at the root, or early if a class would be visited twice.
pub struct Ancestors<'a> {
    next: Option<&'a Class>,
    seen: HashSet<ClassId>,
}

impl<'a> Ancestors<'a> {
    fn new(start: &'a Class) -> Self {
        Self {
            next: Some(start),
            seen: HashSet::new(),
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.seen.insert(current.id()) {
            return None;
        }
        self.next = current.parent();
        Some(current)
    }
}

/// A running method call
pub struct Invocation<'a> {
    this: &'a Instance,
    owner: &'a Class,
    method: &'a str,
}

impl<'a> Invocation<'a> {
    pub(crate) fn dispatch(
        this: &'a Instance,
        start: &'a Class,
        method: &'a str,
        args: &[Value],
    ) -> MixinResult<Value> {
        let (owner, body) = start
            .find_method(method)
            .ok_or_else(|| MixinError::MethodNotFound {
                class: start.name().to_string(),
                method: method.to_string(),
            })?;
        let invocation = Invocation {
            this,
            owner,
            method,
        };
        body(&invocation, args)
    }

    /// The receiver
    pub fn this(&self) -> &Instance {
        self.this
    }

    /// The class whose template defines the running method
    pub fn owner(&self) -> &Class {
        self.owner
    }

    /// Name of the running method
    pub fn method_name(&self) -> &str {
        self.method
    }

    /// Call a method on the receiver, dispatching from its concrete class
    pub fn call(&self, method: &str, args: &[Value]) -> MixinResult<Value> {
        self.this.call(method, args)
    }

    /// Call the next definition of the running method above its owner
    pub fn call_super(&self, args: &[Value]) -> MixinResult<Value> {
        self.call_super_method(self.method, args)
    }

    /// Call the next definition of `method` above the running method's owner
    pub fn call_super_method(&self, method: &str, args: &[Value]) -> MixinResult<Value> {
        let parent = self.owner.parent().ok_or_else(|| MixinError::NoSuperMethod {
            class: self.owner.name().to_string(),
            method: method.to_string(),
        })?;
        if parent.find_method(method).is_none() {
            return Err(MixinError::NoSuperMethod {
                class: self.owner.name().to_string(),
                method: method.to_string(),
            });
        }
        Invocation::dispatch(self.this, parent, method, args)
    }
}
