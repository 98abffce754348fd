// Copyright 2025 Cowboy AI, LLC.

//! Fluent composition: `mix(base).with(extensions)`

use crate::class::Class;
use crate::errors::MixinResult;
use crate::extension::Extension;

/// Applies extensions to a base, first to last
#[derive(Debug, Clone)]
pub struct MixinBuilder {
    base: Class,
}

impl MixinBuilder {
    /// Start from `base`, or from a fresh empty root class
    pub fn new(base: Option<&Class>) -> Self {
        Self {
            base: base.cloned().unwrap_or_else(Class::root),
        }
    }

    /// The class extensions will be applied to
    pub fn base(&self) -> &Class {
        &self.base
    }

    /// Fold the extensions over the base
    ///
    /// `with([e1, e2])` yields `e2(e1(base))`. The first failing extension
    /// stops the fold and its error is returned.
    pub fn with<'a, I>(self, extensions: I) -> MixinResult<Class>
    where
        I: IntoIterator<Item = &'a Extension>,
    {
        extensions
            .into_iter()
            .try_fold(self.base, |class, extension| extension.invoke(&class))
    }
}

/// Start composing a class
///
/// # Example
///
/// ```
/// use cim_mixin::{mix, mixin, Class, Extension};
/// use serde_json::json;
///
/// let base = Class::builder("Base")
///     .method("bar", |_, _| Ok(json!(["Base.bar"])))
///     .build();
/// let m = mixin(Extension::named("M", |base: &Class| {
///     Ok(base.extend("M").method("bar", |_, _| Ok(json!(["M.bar"]))).build())
/// }));
///
/// let c = mix(Some(&base)).with([&m]).unwrap().extend("C").build();
/// assert_eq!(c.instantiate().call("bar", &[]).unwrap(), json!(["M.bar"]));
/// ```
pub fn mix(base: Option<&Class>) -> MixinBuilder {
    MixinBuilder::new(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MixinError;
    use crate::policy::mixin;

    fn marking(name: &'static str) -> Extension {
        mixin(Extension::named(name, move |base: &Class| {
            Ok(base.extend(name).build())
        }))
    }

    /// Test ordered composition
    ///
    /// ```mermaid
    /// graph LR
    ///     Base --> M1' --> M2'
    /// ```
    #[test]
    fn test_with_folds_left_to_right() {
        let base = Class::builder("Base").build();
        let m1 = marking("M1");
        let m2 = marking("M2");

        let composed = mix(Some(&base)).with([&m1, &m2]).unwrap();
        let names: Vec<&str> = composed.ancestors().map(Class::name).collect();
        assert_eq!(names, vec!["M2", "M1", "Base"]);

        let manual = m2.invoke(&m1.invoke(&base).unwrap()).unwrap();
        assert_eq!(composed, manual);
    }

    #[test]
    fn test_missing_base_uses_empty_root() {
        let builder = mix(None);
        assert_eq!(builder.base().name(), "Object");
        assert!(builder.base().parent().is_none());

        let composed = builder.with([&marking("M")]).unwrap();
        assert_eq!(composed.parent().map(Class::name), Some("Object"));
    }

    #[test]
    fn test_no_extensions_returns_base() {
        let base = Class::builder("Base").build();
        let composed = mix(Some(&base)).with(std::iter::empty()).unwrap();
        assert_eq!(composed, base);
    }

    #[test]
    fn test_failure_stops_the_fold() {
        let failing = Extension::named("Failing", |_: &Class| {
            Err(MixinError::extension_failed("Failing", "nope"))
        });
        let never = Extension::named("Never", |_: &Class| {
            panic!("must not run after a failure")
        });

        let err = mix(None).with([&failing, &never]).unwrap_err();
        assert_eq!(err, MixinError::extension_failed("Failing", "nope"));
    }
}
