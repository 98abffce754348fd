// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for classes and extensions

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Class ID - identifies one class and its behavioral template
///
/// Every built class gets a fresh ID, so two classes with the same name
/// and methods are still distinct points in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(Uuid);

impl ClassId {
    /// Create a new random class ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ClassId> for Uuid {
    fn from(id: ClassId) -> Self {
        id.0
    }
}

/// Extension ID - the reference identity of one extension value
///
/// Assigned when the extension is constructed. Two extensions built from
/// identical closures still get different IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionId(Uuid);

impl ExtensionId {
    /// Create a new random extension ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExtensionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ExtensionId> for Uuid {
    fn from(id: ExtensionId) -> Self {
        id.0
    }
}
