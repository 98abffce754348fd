// Copyright 2025 Cowboy AI, LLC.

//! # CIM Mixin
//!
//! Runtime mixin composition for the Composable Information Machine.
//!
//! A class is built by applying an ordered list of extensions to a base
//! class. Nothing existing is mutated: every application adds one new class
//! to the chain. What makes this useful is the identity bookkeeping on top:
//!
//! - **Tags**: every produced template records which extension made it
//! - **Membership**: `has_extension` walks an object's ancestry to find one
//! - **Wrapping**: decorated extensions still answer to their original
//! - **Caching**: the same extension on the same base yields the same class
//! - **De-duplication**: re-applying an extension already present is a no-op
//! - **Membership predicates**: `is_instance` checks that see through the chain
//!
//! ## Example
//!
//! ```
//! use cim_mixin::{has_extension, mix, mixin, Class, Extension};
//! use serde_json::{json, Value};
//!
//! let base = Class::builder("Base")
//!     .method("baz", |_, _| Ok(json!(["Base.baz"])))
//!     .build();
//!
//! let a = mixin(Extension::named("A", |base: &Class| {
//!     Ok(base
//!         .extend("A")
//!         .method("baz", |ctx, args| {
//!             let mut out = vec![json!("A.before")];
//!             if let Value::Array(inner) = ctx.call_super(args)? {
//!                 out.extend(inner);
//!             }
//!             out.push(json!("A.after"));
//!             Ok(Value::Array(out))
//!         })
//!         .build())
//! }));
//!
//! let c = mix(Some(&base)).with([&a]).unwrap().extend("C").build();
//! let obj = c.instantiate();
//!
//! assert_eq!(obj.call("baz", &[]).unwrap(), json!(["A.before", "Base.baz", "A.after"]));
//! assert!(has_extension(Some(&obj), &a));
//! ```

#![warn(missing_docs)]

mod application;
mod builder;
mod cache;
mod class;
mod dedupe;
mod errors;
mod extension;
mod has_instance;
mod identifiers;
mod instance;
mod membership;
mod policy;
mod tags;

pub use application::{apply, bare_mixin};
pub use builder::{mix, MixinBuilder};
pub use cache::{cache_table, cached, CacheKey, CacheTable};
pub use class::{Ancestors, Class, ClassBuilder, Invocation, Method, Template, WeakClass};
pub use dedupe::dedupe;
pub use errors::{MixinError, MixinResult};
pub use extension::{unwrap, wrap, Extension, InstancePredicate, WeakExtension};
pub use has_instance::has_instance;
pub use identifiers::{ClassId, ExtensionId};
pub use instance::Instance;
pub use membership::{applications, has_extension, is_application_of, Ancestry, Application};
pub use policy::{compose, mixin, MixinPolicy};
pub use tags::{Marker, MarkerKind, TagStore};
