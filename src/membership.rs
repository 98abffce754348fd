// Copyright 2025 Cowboy AI, LLC.

//! Membership queries over the ancestry chain
//!
//! ```mermaid
//! graph TD
//!     O[object] -->|class| C[C]
//!     C -->|parent| M2["M2 application (tag: M2)"]
//!     M2 -->|parent| M1["M1 application (tag: M1)"]
//!     M1 -->|parent| B[Base]
//! ```
//!
//! `has_extension(object, M1)` walks `C → M2 → M1` and stops at the first
//! template tagged with `M1`'s canonical identity.

use crate::class::{Class, Template};
use crate::extension::{unwrap, Extension};
use crate::identifiers::{ClassId, ExtensionId};
use crate::instance::Instance;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Anything with an ancestry chain to walk
pub trait Ancestry {
    /// The class whose template starts the walk
    fn ancestry_start(&self) -> Option<&Class>;
}

impl Ancestry for Class {
    fn ancestry_start(&self) -> Option<&Class> {
        Some(self)
    }
}

impl Ancestry for Instance {
    fn ancestry_start(&self) -> Option<&Class> {
        Some(self.class())
    }
}

impl<T: Ancestry> Ancestry for Option<T> {
    fn ancestry_start(&self) -> Option<&Class> {
        self.as_ref().and_then(Ancestry::ancestry_start)
    }
}

impl<T: Ancestry + ?Sized> Ancestry for &T {
    fn ancestry_start(&self) -> Option<&Class> {
        (**self).ancestry_start()
    }
}

/// Check whether `template` was produced directly by `extension`
///
/// Both sides are compared in canonical form, so any decorated layer of an
/// extension matches templates produced by any other layer of it.
pub fn is_application_of(template: Option<&Template>, extension: &Extension) -> bool {
    let canonical = unwrap(extension).id();
    template.is_some_and(|template| is_tagged_with(template, canonical))
}

fn is_tagged_with(template: &Template, canonical: ExtensionId) -> bool {
    template.applied_extension() == Some(canonical)
}

/// Check whether `extension` was applied anywhere in `obj`'s ancestry
///
/// Absent input yields `false`.
pub fn has_extension<O>(obj: Option<&O>, extension: &Extension) -> bool
where
    O: Ancestry + ?Sized,
{
    let Some(start) = obj.and_then(Ancestry::ancestry_start) else {
        return false;
    };
    let canonical = unwrap(extension).id();
    let found = start
        .ancestors()
        .any(|class| is_tagged_with(class.template(), canonical));
    trace!(
        start = %start.name(),
        extension = %extension.name(),
        found,
        "Walked ancestry"
    );
    found
}

/// One application found on an ancestry chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// The produced class
    pub class: ClassId,
    /// Name of the produced class
    pub class_name: String,
    /// The class the extension was applied to
    pub base: Option<ClassId>,
    /// Canonical identity of the extension that produced the class
    pub extension: ExtensionId,
}

impl Application {
    /// Read the application recorded on `class`, if it was produced by one
    pub fn of(class: &Class) -> Option<Self> {
        let extension = class.template().applied_extension()?;
        Some(Self {
            class: class.id(),
            class_name: class.name().to_string(),
            base: class.parent().map(Class::id),
            extension,
        })
    }
}

/// Every application on `obj`'s ancestry, nearest first
pub fn applications<O>(obj: Option<&O>) -> Vec<Application>
where
    O: Ancestry + ?Sized,
{
    obj.and_then(Ancestry::ancestry_start)
        .map(|start| start.ancestors().filter_map(Application::of).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::Marker;

    fn marking(name: &'static str) -> Extension {
        Extension::named(name, move |base: &Class| Ok(base.extend(name).build()))
    }

    fn stamp(class: &Class, extension: &Extension) {
        class
            .template()
            .tags()
            .tag(Marker::applied(), unwrap(extension).id());
    }

    #[test]
    fn test_absent_inputs_are_false() {
        let m = marking("M");
        assert!(!is_application_of(None, &m));
        assert!(!has_extension::<Class>(None, &m));
        assert!(!has_extension(Some(&None::<Instance>), &m));
        assert!(applications::<Class>(None).is_empty());
    }

    #[test]
    fn test_direct_check_uses_canonical_form() {
        let m = marking("M");
        let layer = crate::extension::wrap(&m, Extension::new(|base: &Class| Ok(base.clone())));
        let derived = m.invoke(&Class::root()).unwrap();
        stamp(&derived, &layer);

        assert!(is_application_of(Some(derived.template()), &m));
        assert!(is_application_of(Some(derived.template()), &layer));
        assert!(!is_application_of(Some(derived.template()), &marking("M")));
    }

    #[test]
    fn test_walk_finds_any_link() {
        let m1 = marking("M1");
        let m2 = marking("M2");
        let m3 = marking("M3");
        let base = Class::builder("Base").build();
        let a1 = m1.invoke(&base).unwrap();
        stamp(&a1, &m1);
        let a2 = m2.invoke(&a1).unwrap();
        stamp(&a2, &m2);
        let leaf = a2.extend("C").build();
        let obj = leaf.instantiate();

        assert!(has_extension(Some(&obj), &m1));
        assert!(has_extension(Some(&obj), &m2));
        assert!(!has_extension(Some(&obj), &m3));
        assert!(!has_extension(Some(&base), &m1));

        let found: Vec<ExtensionId> = applications(Some(&obj))
            .into_iter()
            .map(|application| application.extension)
            .collect();
        assert_eq!(found, vec![m2.id(), m1.id()]);
    }

    #[test]
    fn test_application_view() {
        let m = marking("M");
        let base = Class::builder("Base").build();
        let derived = m.invoke(&base).unwrap();
        assert!(Application::of(&derived).is_none());

        stamp(&derived, &m);
        let application = Application::of(&derived).unwrap();
        assert_eq!(application.base, Some(base.id()));
        assert_eq!(application.extension, m.id());
        assert_eq!(application.class_name, "M");

        let json = serde_json::to_string(&application).unwrap();
        let back: Application = serde_json::from_str(&json).unwrap();
        assert_eq!(back, application);
    }
}
