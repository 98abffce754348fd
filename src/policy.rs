// Copyright 2025 Cowboy AI, LLC.

//! Composed decorators and the policy selecting them
//!
//! The recommended way to author a trait is [`mixin`]:
//!
//! ```text
//! mixin(e) = dedupe(cached(bare_mixin(e)))
//! ```
//!
//! De-duplication runs first so a redundant application never reaches the
//! cache; the cache memoizes the stamped application underneath it.

use crate::application::bare_mixin;
use crate::cache::cached;
use crate::dedupe::dedupe;
use crate::errors::MixinResult;
use crate::extension::Extension;
use crate::has_instance::has_instance;
use serde::{Deserialize, Serialize};

/// Which decorator layers to put around a stamped application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixinPolicy {
    /// Memoize one derived class per base
    pub cache: bool,
    /// Skip bases that already carry the extension
    pub dedupe: bool,
    /// Install an ancestry-backed membership predicate
    pub has_instance: bool,
}

impl Default for MixinPolicy {
    fn default() -> Self {
        Self {
            cache: true,
            dedupe: true,
            has_instance: false,
        }
    }
}

impl MixinPolicy {
    /// Only the stamped application, no extra layers
    pub fn bare() -> Self {
        Self {
            cache: false,
            dedupe: false,
            has_instance: false,
        }
    }

    /// Set whether applications are memoized
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Set whether redundant applications are skipped
    pub fn with_dedupe(mut self, enabled: bool) -> Self {
        self.dedupe = enabled;
        self
    }

    /// Set whether a membership predicate is installed
    pub fn with_has_instance(mut self, enabled: bool) -> Self {
        self.has_instance = enabled;
        self
    }

    /// Load a policy from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> MixinResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Build the decorator stack `policy` asks for around `extension`
pub fn compose(extension: Extension, policy: &MixinPolicy) -> Extension {
    let mut composed = bare_mixin(extension);
    if policy.cache {
        composed = cached(composed);
    }
    if policy.dedupe {
        composed = dedupe(composed);
    }
    if policy.has_instance {
        composed = has_instance(composed);
    }
    composed
}

/// The default decorator stack: de-duplicated, cached, stamped
pub fn mixin(extension: Extension) -> Extension {
    compose(extension, &MixinPolicy::default())
}
