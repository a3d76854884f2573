//! Entity identifiers

use std::fmt;

/// Transient entity identifier, unique within one component store.
///
/// Identifiers are allocated monotonically and never handed out twice by
/// the same store, even after the entity is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    id: u32,
}

impl EntityId {
    /// Create an entity id with the given raw value
    pub(super) const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the raw entity id
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Integer tag written into vertices for mouse picking
    #[allow(clippy::cast_possible_wrap)]
    pub const fn tag(self) -> i32 {
        self.id as i32
    }

    pub(super) const fn index(self) -> usize {
        self.id as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}
