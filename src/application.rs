// Copyright 2025 Cowboy AI, LLC.

//! Stamped application of an extension to a base class

use crate::class::Class;
use crate::errors::MixinResult;
use crate::extension::{unwrap, wrap, Extension};
use crate::tags::Marker;
use tracing::debug;

/// Apply `extension` to `base` and tag the result with the extension's identity
///
/// Each call writes exactly one stamp, on the class the body produced.
/// The one exception is a body that returns `base` itself. Such a body
/// produced no new class, so nothing is stamped and `base` is returned as
/// is; stamping it would make the base claim an extension that never
/// produced it. Errors from the body are returned untouched.
pub fn apply(base: &Class, extension: &Extension) -> MixinResult<Class> {
    let derived = extension.invoke(base)?;
    if derived == *base {
        debug!(
            base = %base.name(),
            extension = %extension.name(),
            "Extension returned its base unchanged, not stamping"
        );
        return Ok(derived);
    }

    let canonical = unwrap(extension);
    derived
        .template()
        .tags()
        .tag(Marker::applied(), canonical.id());
    debug!(
        base = %base.name(),
        derived = %derived.name(),
        extension = %canonical.name(),
        "Applied extension"
    );
    Ok(derived)
}

/// Decorate `extension` so that every application is stamped
pub fn bare_mixin(extension: Extension) -> Extension {
    let inner = extension.clone();
    wrap(
        &extension,
        Extension::stamping(move |base: &Class| apply(base, &inner)),
    )
}
