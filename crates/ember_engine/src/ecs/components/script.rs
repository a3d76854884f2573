//! Script components

use crate::ecs::Component;
use crate::scripting::ScriptableEntity;

/// Binds an entity to a script class from the loaded assembly
///
/// Field overrides are kept by the script engine's field cache, keyed by the
/// entity's persistent id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptComponent {
    /// Fully qualified class name, e.g. `Sandbox.Player`
    pub class_name: String,
}

impl ScriptComponent {
    /// Bind to a class by name
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }
}

impl Component for ScriptComponent {}

type ScriptFactory = fn() -> Box<dyn ScriptableEntity>;

/// In-process behaviour created from a Rust type
///
/// Copies carry the factory only; instances are created per running scene.
pub struct NativeScriptComponent {
    factory: ScriptFactory,
    type_name: &'static str,
    /// Live behaviour, present only while the scene is running
    pub instance: Option<Box<dyn ScriptableEntity>>,
}

impl NativeScriptComponent {
    /// Bind a default-constructible behaviour type
    pub fn bind<T: ScriptableEntity + Default + 'static>() -> Self {
        Self {
            factory: || -> Box<dyn ScriptableEntity> { Box::new(T::default()) },
            type_name: std::any::type_name::<T>(),
            instance: None,
        }
    }

    /// Create a fresh behaviour from the bound factory
    pub fn instantiate(&self) -> Box<dyn ScriptableEntity> {
        (self.factory)()
    }

    /// Name of the bound type
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Clone for NativeScriptComponent {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory,
            type_name: self.type_name,
            instance: None,
        }
    }
}

impl std::fmt::Debug for NativeScriptComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeScriptComponent")
            .field("type_name", &self.type_name)
            .field("instantiated", &self.instance.is_some())
            .finish()
    }
}

impl Component for NativeScriptComponent {}
