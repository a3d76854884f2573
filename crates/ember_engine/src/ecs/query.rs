//! Views over entities matching a set of component types
//!
//! `world.view::<(TransformComponent, SpriteRendererComponent)>()` yields every
//! entity carrying all listed types. The view snapshots matching ids up front,
//! so the world can be mutated while walking it. Order follows the dense
//! order of the first listed type and is stable until that storage changes.
//!
//! Destroying or duplicating entities of a type while walking a view of that
//! same type is the caller's responsibility; the snapshot will still name the
//! destroyed entity.

use super::{storage::AnyStorage, Component, EntityId, World};
use std::any::TypeId;

/// A set of component types usable as a view filter
pub trait ComponentSet {
    /// Type ids of every member; the first drives iteration order
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);

/// Snapshot iterator over entities matching a [`ComponentSet`]
pub struct View {
    entities: std::vec::IntoIter<EntityId>,
}

impl View {
    pub(super) fn collect<Q: ComponentSet>(world: &World) -> Self {
        let type_ids = Q::type_ids();
        let storages: Option<Vec<&dyn AnyStorage>> =
            type_ids.iter().map(|type_id| world.storage_by_type(*type_id)).collect();

        let entities = match storages.as_deref() {
            Some([driver, rest @ ..]) => driver
                .entity_ids()
                .iter()
                .copied()
                .filter(|entity| rest.iter().all(|storage| storage.contains_entity(*entity)))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            entities: entities.into_iter(),
        }
    }
}

impl Iterator for View {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        self.entities.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl ExactSizeIterator for View {}
