//! Persistent identifiers
//!
//! A [`PersistentId`] names an entity across serialization, scene copies and
//! the scripting bridge. It is a random 128-bit UUID and never changes once assigned.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique, stable entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistentId(Uuid);

impl PersistentId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil identifier, used as "no entity" in script fields
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Reconstruct from the raw 128-bit value
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Raw 128-bit value
    pub const fn as_u128(self) -> u128 {
        self.0.as_u128()
    }

    /// Whether this is the nil identifier
    pub fn is_nil(self) -> bool {
        self.0.is_nil()
    }

    /// Parse the hyphenated textual form
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok().map(Self)
    }
}

impl Default for PersistentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PersistentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
