//! Identity and naming components

use crate::ecs::Component;
use crate::foundation::id::PersistentId;

/// Persistent identity of an entity
///
/// Attached at creation, never replaced or removed while the entity lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdComponent {
    /// Stable identifier used by serialization, scripting and scene copies
    pub id: PersistentId,
}

impl Component for IdComponent {}

/// Display name of an entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagComponent {
    /// The name shown in the editor and used by name lookups
    pub tag: String,
}

impl TagComponent {
    /// Create a tag from any string-like value
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Component for TagComponent {}
