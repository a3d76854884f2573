//! Entity-Component-System implementation
//!
//! [`World`] is the component store: typed sparse-set storage keyed by
//! [`EntityId`], views over component-type intersections, and on-add hooks.

pub mod component;
pub mod components;
pub mod entity;
pub mod query;
pub mod storage;
pub mod world;

pub use component::Component;
pub use entity::EntityId;
pub use query::{ComponentSet, View};
pub use world::{ComponentHook, HookContext, World};
