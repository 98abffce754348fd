// Copyright 2025 Cowboy AI, LLC.

//! Extensions and the wrap/unwrap identity protocol
//!
//! An [`Extension`] maps a base class to a derived class. Decorators such
//! as caching build a new extension around an existing one; [`wrap`] links
//! the two so that every layer still answers to the innermost original.
//!
//! ```mermaid
//! graph LR
//!     H[dedupe layer] -->|delegate| G[cache layer]
//!     G -->|delegate| F[original]
//!     H -.->|wrapped marker| F
//!     G -.->|wrapped marker| F
//! ```

use crate::class::Class;
use crate::errors::MixinResult;
use crate::identifiers::ExtensionId;
use crate::membership::Ancestry;
use crate::tags::{Marker, TagStore};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

type Body = Arc<dyn Fn(&Class) -> MixinResult<Class> + Send + Sync>;

/// A type-membership predicate attached to an extension
///
/// Called with the extension it was installed on and the candidate value.
pub type InstancePredicate = Arc<dyn Fn(&Extension, &dyn Ancestry) -> bool + Send + Sync>;

struct ExtensionInner {
    id: ExtensionId,
    name: Option<String>,
    body: Body,
    stamps: bool,
    delegate: OnceCell<Extension>,
    tags: TagStore<WeakExtension>,
    instance_predicate: OnceCell<InstancePredicate>,
}

/// A function from a base class to a derived class, with identity
///
/// Clones share identity; separately constructed extensions never do.
#[derive(Clone)]
pub struct Extension {
    inner: Arc<ExtensionInner>,
}

/// Non-owning handle to an extension
///
/// Used for the wrapped marker so an original can name itself without
/// keeping itself alive.
#[derive(Clone)]
pub struct WeakExtension(Weak<ExtensionInner>);

impl WeakExtension {
    /// Recover the extension if it is still alive
    pub fn upgrade(&self) -> Option<Extension> {
        self.0.upgrade().map(|inner| Extension { inner })
    }
}

impl Extension {
    /// Create an anonymous extension
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Class) -> MixinResult<Class> + Send + Sync + 'static,
    {
        Self::build(None, false, Arc::new(body))
    }

    /// An anonymous layer whose body stamps what it produces
    pub(crate) fn stamping<F>(body: F) -> Self
    where
        F: Fn(&Class) -> MixinResult<Class> + Send + Sync + 'static,
    {
        Self::build(None, true, Arc::new(body))
    }

    /// Create a named extension
    ///
    /// # Example
    ///
    /// ```
    /// use cim_mixin::{Class, Extension};
    /// use serde_json::json;
    ///
    /// let greeter = Extension::named("Greeter", |base: &Class| {
    ///     Ok(base
    ///         .extend("Greeter")
    ///         .method("greet", |_, _| Ok(json!("hello")))
    ///         .build())
    /// });
    ///
    /// let derived = greeter.invoke(&Class::root()).unwrap();
    /// assert_eq!(derived.instantiate().call("greet", &[]).unwrap(), json!("hello"));
    /// ```
    pub fn named<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Class) -> MixinResult<Class> + Send + Sync + 'static,
    {
        Self::build(Some(name.into()), false, Arc::new(body))
    }

    fn build(name: Option<String>, stamps: bool, body: Body) -> Self {
        Self {
            inner: Arc::new(ExtensionInner {
                id: ExtensionId::new(),
                name,
                body,
                stamps,
                delegate: OnceCell::new(),
                tags: TagStore::new(),
                instance_predicate: OnceCell::new(),
            }),
        }
    }

    /// Identity of this extension value
    pub fn id(&self) -> ExtensionId {
        self.inner.id
    }

    /// Name, looked up through the delegate chain
    pub fn name(&self) -> &str {
        match (&self.inner.name, self.inner.delegate.get()) {
            (Some(name), _) => name.as_str(),
            (None, Some(delegate)) => delegate.name(),
            (None, None) => "<anonymous>",
        }
    }

    /// Check whether two handles denote the same extension value
    pub fn is_same(&self, other: &Extension) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run the body against `base`
    pub fn invoke(&self, base: &Class) -> MixinResult<Class> {
        (self.inner.body)(base)
    }

    /// The extension this one decorates, if it was wrapped
    pub fn delegate(&self) -> Option<&Extension> {
        self.inner.delegate.get()
    }

    /// Check whether this extension or a layer it delegates to stamps results
    pub fn stamps(&self) -> bool {
        self.layers().any(|layer| layer.inner.stamps)
    }

    /// This extension followed by every layer it delegates to, outermost first
    pub fn layers(&self) -> impl Iterator<Item = &Extension> {
        std::iter::successors(Some(self), |layer| layer.delegate())
    }

    /// Identity tags attached to this extension
    pub fn tags(&self) -> &TagStore<WeakExtension> {
        &self.inner.tags
    }

    /// Supply a custom membership predicate
    ///
    /// Has no effect if this extension already owns one.
    pub fn with_instance_predicate<F>(self, predicate: F) -> Self
    where
        F: Fn(&Extension, &dyn Ancestry) -> bool + Send + Sync + 'static,
    {
        self.install_instance_predicate(Arc::new(predicate));
        self
    }

    /// Check if this extension owns a membership predicate (delegates ignored)
    pub fn has_own_instance_predicate(&self) -> bool {
        self.inner.instance_predicate.get().is_some()
    }

    /// Check if this extension or any layer it delegates to has a predicate
    pub fn defines_instance_predicate(&self) -> bool {
        self.layers().any(Extension::has_own_instance_predicate)
    }

    pub(crate) fn install_instance_predicate(&self, predicate: InstancePredicate) -> bool {
        self.inner.instance_predicate.set(predicate).is_ok()
    }

    /// The `instanceof`-style check
    ///
    /// Uses the nearest predicate on this extension or its delegates. With
    /// none installed the answer is `false`: an extension is a function, and
    /// no object descends from a function's own template.
    pub fn is_instance(&self, candidate: &dyn Ancestry) -> bool {
        self.layers()
            .find_map(|layer| {
                layer
                    .inner
                    .instance_predicate
                    .get()
                    .map(|predicate| predicate(layer, candidate))
            })
            .unwrap_or(false)
    }

    fn downgrade(&self) -> WeakExtension {
        WeakExtension(Arc::downgrade(&self.inner))
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Extension {}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .field("canonical", &unwrap(self).id())
            .finish()
    }
}

/// Make `wrapper` stand in for `original`
///
/// The wrapper delegates name and predicate lookups to `original`, and both
/// are tagged with the innermost original so that [`unwrap`] resolves any
/// number of layers in one step. Returns `wrapper`.
pub fn wrap(original: &Extension, wrapper: Extension) -> Extension {
    if wrapper.is_same(original) {
        return wrapper;
    }
    let canonical = unwrap(original);
    original.tags().tag(Marker::wrapped(), canonical.downgrade());
    wrapper.tags().tag(Marker::wrapped(), canonical.downgrade());

    if wrapper.inner.delegate.set(original.clone()).is_err() {
        debug!(
            wrapper = %wrapper.id(),
            original = %original.id(),
            "Wrapper already delegates elsewhere, keeping first delegate"
        );
    }
    wrapper
}

/// The innermost original behind `candidate`, or `candidate` itself
pub fn unwrap(candidate: &Extension) -> Extension {
    candidate
        .tags()
        .read_tag(&Marker::wrapped())
        .and_then(|original| original.upgrade())
        .unwrap_or_else(|| candidate.clone())
}
