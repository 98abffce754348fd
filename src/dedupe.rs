// Copyright 2025 Cowboy AI, LLC.

//! Skipping extensions already present in a base's ancestry

use crate::class::Class;
use crate::extension::{wrap, Extension};
use crate::membership::has_extension;
use tracing::debug;

/// Decorate `extension` so it is a no-op on bases that already carry it
///
/// When the base's ancestry already has an application of the extension,
/// the base itself is returned and the body does not run.
pub fn dedupe(extension: Extension) -> Extension {
    let inner = extension.clone();
    let variant = Extension::new(move |base: &Class| {
        if has_extension(Some(base), &inner) {
            debug!(
                base = %base.name(),
                extension = %inner.name(),
                "Extension already in ancestry, skipping"
            );
            return Ok(base.clone());
        }
        inner.invoke(base)
    });
    wrap(&extension, variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bare_mixin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(name: &'static str, calls: Arc<AtomicUsize>) -> Extension {
        bare_mixin(Extension::named(name, move |base: &Class| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(base.extend(name).build())
        }))
    }

    /// Test de-dup no-op
    ///
    /// ```mermaid
    /// graph LR
    ///     B[Base] -->|E| D["E(Base)"]
    ///     D -->|dedupe E| D
    /// ```
    #[test]
    fn test_reapplication_returns_base_unchanged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let e = dedupe(counting("E", calls.clone()));
        let base = Class::builder("Base").build();

        let once = e.invoke(&base).unwrap();
        let again = e.invoke(&once).unwrap();

        assert_eq!(again, once);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detects_extension_deeper_in_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let e = dedupe(counting("E", calls.clone()));
        let other = counting("Other", Arc::new(AtomicUsize::new(0)));
        let base = Class::builder("Base").build();

        let with_e = e.invoke(&base).unwrap();
        let with_other = other.invoke(&with_e).unwrap();
        let subclass = with_other.extend("Sub").build();

        assert_eq!(e.invoke(&subclass).unwrap(), subclass);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fresh_base_still_applies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let e = dedupe(counting("E", calls.clone()));

        let a = e.invoke(&Class::builder("A").build()).unwrap();
        let b = e.invoke(&Class::builder("B").build()).unwrap();

        assert_ne!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
