// Copyright 2025 Cowboy AI, LLC.

//! `instanceof`-style membership for extensions

use crate::extension::{Extension, InstancePredicate};
use crate::membership::{has_extension, Ancestry};
use std::sync::Arc;
use tracing::debug;

/// Give `extension` a membership predicate backed by the ancestry walk
///
/// After this, `extension.is_instance(&obj)` is true for every object whose
/// ancestry carries an application of the extension. An extension that
/// already has a predicate, on itself or on any layer it delegates to, is
/// left alone. Returns the same extension.
pub fn has_instance(extension: Extension) -> Extension {
    if extension.defines_instance_predicate() {
        debug!(extension = %extension.name(), "Membership predicate already defined");
        return extension;
    }
    let predicate: InstancePredicate = Arc::new(|owner: &Extension, candidate: &dyn Ancestry| {
        has_extension(Some(candidate), owner)
    });
    if extension.install_instance_predicate(predicate) {
        debug!(extension = %extension.name(), "Installed membership predicate");
    }
    extension
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bare_mixin;
    use crate::class::Class;

    fn marking(name: &'static str) -> Extension {
        bare_mixin(Extension::named(name, move |base: &Class| {
            Ok(base.extend(name).build())
        }))
    }

    /// Test transitive instanceof
    ///
    /// ```mermaid
    /// graph LR
    ///     O[obj of C] -->|is_instance| M["M (via C → M(Base))"]
    /// ```
    #[test]
    fn test_is_instance_walks_ancestry() {
        let m = has_instance(marking("M"));
        let unrelated = has_instance(marking("Unrelated"));
        let base = Class::builder("Base").build();
        let c = m.invoke(&base).unwrap().extend("C").build();

        let obj = c.instantiate();
        assert!(m.is_instance(&obj));
        assert!(m.is_instance(&c));
        assert!(!unrelated.is_instance(&obj));
        assert!(!m.is_instance(&base.instantiate()));
    }

    #[test]
    fn test_returns_same_extension() {
        let m = marking("M");
        let adapted = has_instance(m.clone());
        assert!(adapted.is_same(&m));
        assert!(m.has_own_instance_predicate());
    }

    #[test]
    fn test_existing_predicate_is_kept() {
        let never = marking("M").with_instance_predicate(|_, _| false);
        let adapted = has_instance(never);
        let obj = adapted.invoke(&Class::root()).unwrap().instantiate();

        assert!(!adapted.is_instance(&obj));
    }

    #[test]
    fn test_without_adapter_is_instance_is_false() {
        let m = marking("M");
        let obj = m.invoke(&Class::root()).unwrap().instantiate();
        assert!(!m.is_instance(&obj));
    }

    #[test]
    fn test_delegate_predicate_is_kept() {
        let f = Extension::named("F", |base: &Class| Ok(base.extend("F").build()))
            .with_instance_predicate(|_, _| false);
        let g = has_instance(bare_mixin(f));
        let obj = g.invoke(&Class::root()).unwrap().instantiate();

        assert!(!g.has_own_instance_predicate());
        assert!(!g.is_instance(&obj));
    }
}
