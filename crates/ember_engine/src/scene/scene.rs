//! Scene - entities, state machine and frame update
//!
//! A scene owns its component store and, while Runtime or Simulate, its
//! physics world. The edit-time scene is never played directly: the editor
//! session plays a [`Scene::copy`] and throws it away on stop.
//!
//! ## States
//!
//! ```text
//!          on_runtime_start            on_simulation_start
//!   Runtime ◀────────────── Edit ──────────────────▶ Simulate
//!           ──────────────▶      ◀──────────────────
//!          on_runtime_stop             on_simulation_stop
//! ```
//!
//! Transitions from any other state fail with
//! [`SceneError::InvalidTransition`] and leave the scene untouched.
//!
//! ## Frame order
//!
//! Scripts, then native behaviours, then one fixed physics step with
//! transform sync, then rendering through the primary camera.

use crate::core::config::PhysicsConfig;
use crate::ecs::components::{
    BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent, CircleRendererComponent, IdComponent,
    NativeScriptComponent, RigidBody2DComponent, ScriptComponent, SpriteRendererComponent, TagComponent,
    TextComponent, TransformComponent,
};
use crate::ecs::{Component, EntityId, World};
use crate::foundation::id::PersistentId;
use crate::foundation::time::Timestep;
use crate::physics::{build_physics_world, clear_runtime_handles, sync_transforms, PhysicsWorld2D};
use crate::render::{EditorCamera, Renderer2D};
use crate::scene::entity::{EntityMut, EntityRef};
use crate::scene::{SceneError, SceneResult};
use crate::scripting::{native, ScriptEngine};
use std::collections::HashMap;
use std::fmt;

/// Name given to entities created without one
pub const DEFAULT_ENTITY_NAME: &str = "Entity";
/// Name of a scene that was never named
pub const DEFAULT_SCENE_NAME: &str = "Untitled";

/// Scene lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    /// Authoring; no physics bodies and no script instances
    #[default]
    Edit,
    /// Playing; physics and scripts active
    Runtime,
    /// Physics preview; scripts inactive
    Simulate,
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Edit => "Edit",
            Self::Runtime => "Runtime",
            Self::Simulate => "Simulate",
        };
        f.write_str(name)
    }
}

/// Data a scene lends to the script host during callbacks
#[derive(Default)]
pub struct SceneStorage {
    /// Component store
    pub world: World,
    /// Persistent id to entity lookup
    pub entity_map: HashMap<PersistentId, EntityId>,
    /// Solver world, present between physics start and stop
    pub physics: Option<PhysicsWorld2D>,
}

impl SceneStorage {
    /// First entity whose tag equals `name`
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.world
            .iter::<TagComponent>()
            .find(|(_, tag)| tag.tag == name)
            .map(|(entity, _)| entity)
    }

    /// Persistent id of a live entity
    pub fn persistent_id(&self, entity: EntityId) -> Option<PersistentId> {
        self.world.get_component::<IdComponent>(entity).map(|identity| identity.id)
    }
}

fn on_camera_added(world: &mut World, entity: EntityId) {
    let context = world.hook_context();
    if context.viewport_width == 0 || context.viewport_height == 0 {
        return;
    }
    if let Some(camera) = world.get_component_mut::<CameraComponent>(entity) {
        camera
            .camera
            .set_viewport_size(context.viewport_width, context.viewport_height);
    }
}

fn copy_component<T: Component + Clone>(src: &World, dst: &mut World, map: &HashMap<PersistentId, EntityId>) {
    for (entity, component) in src.iter::<T>() {
        let Some(target) = src
            .get_component::<IdComponent>(entity)
            .and_then(|identity| map.get(&identity.id))
        else {
            continue;
        };
        dst.add_or_replace_component(*target, component.clone());
    }
}

fn copy_component_if_exists<T: Component + Clone>(world: &mut World, from: EntityId, to: EntityId) {
    if let Some(component) = world.get_component::<T>(from).cloned() {
        world.add_or_replace_component(to, component);
    }
}

// Every copyable component type. Identity and tag are recreated by hand.
macro_rules! all_components {
    ($apply:ident ( $($arg:expr),* )) => {
        $apply::<TransformComponent>($($arg),*);
        $apply::<SpriteRendererComponent>($($arg),*);
        $apply::<CircleRendererComponent>($($arg),*);
        $apply::<CameraComponent>($($arg),*);
        $apply::<ScriptComponent>($($arg),*);
        $apply::<NativeScriptComponent>($($arg),*);
        $apply::<RigidBody2DComponent>($($arg),*);
        $apply::<BoxCollider2DComponent>($($arg),*);
        $apply::<CircleCollider2DComponent>($($arg),*);
        $apply::<TextComponent>($($arg),*);
    };
}

/// A world of entities plus its runtime state
pub struct Scene {
    name: String,
    storage: SceneStorage,
    state: SceneState,
    paused: bool,
    step_frames: u32,
    viewport_width: u32,
    viewport_height: u32,
    physics_config: PhysicsConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("paused", &self.paused)
            .field("entities", &self.storage.world.entity_count())
            .field("viewport", &(self.viewport_width, self.viewport_height))
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create an empty scene with default physics settings
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create an empty scene with the given physics settings
    pub fn with_config(physics_config: PhysicsConfig) -> Self {
        let mut world = World::new();
        world.on_add::<CameraComponent>(on_camera_added);
        world.on_add::<NativeScriptComponent>(native::on_native_script_added);

        Self {
            name: DEFAULT_SCENE_NAME.to_string(),
            storage: SceneStorage {
                world,
                ..SceneStorage::default()
            },
            state: SceneState::Edit,
            paused: false,
            step_frames: 0,
            viewport_width: 0,
            viewport_height: 0,
            physics_config,
        }
    }

    /// Deep copy for play mode.
    ///
    /// Entities keep their persistent ids; runtime handles and native
    /// instances are not carried over.
    pub fn copy(other: &Self) -> Self {
        let mut scene = Self::with_config(other.physics_config.clone());
        scene.name.clone_from(&other.name);
        scene.on_viewport_resize(other.viewport_width, other.viewport_height);

        let src = &other.storage.world;
        for (entity, identity) in src.iter::<IdComponent>() {
            let Some(tag) = src.get_component::<TagComponent>(entity) else {
                continue;
            };
            scene.create_entity_with_id(identity.id, &tag.tag);
        }

        let map = scene.storage.entity_map.clone();
        let dst = &mut scene.storage.world;
        all_components!(copy_component(src, dst, &map));
        clear_runtime_handles(dst);

        log::debug!("Copied scene '{}' ({} entities)", scene.name, map.len());
        scene
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Component store
    pub const fn world(&self) -> &World {
        &self.storage.world
    }

    /// Mutable component store
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.storage.world
    }

    /// Everything the script host needs during a callback
    pub const fn storage(&self) -> &SceneStorage {
        &self.storage
    }

    /// Mutable storage
    pub fn storage_mut(&mut self) -> &mut SceneStorage {
        &mut self.storage
    }

    /// Physics settings used when physics starts
    pub const fn physics_config(&self) -> &PhysicsConfig {
        &self.physics_config
    }

    /// Live solver world, if physics is running
    pub const fn physics(&self) -> Option<&PhysicsWorld2D> {
        self.storage.physics.as_ref()
    }

    // ----- Entities -----

    /// Create an entity with a fresh persistent id.
    ///
    /// An empty name becomes `"Entity"`.
    pub fn create_entity(&mut self, name: &str) -> EntityId {
        self.create_entity_with_id(PersistentId::new(), name)
    }

    /// Create an entity with a known persistent id.
    ///
    /// An id already owned by a live entity is replaced with a fresh one.
    pub fn create_entity_with_id(&mut self, id: PersistentId, name: &str) -> EntityId {
        let id = if self.storage.entity_map.contains_key(&id) {
            let fresh = PersistentId::new();
            log::warn!("Entity ID {id} is already in use, assigning {fresh}");
            fresh
        } else {
            id
        };
        let world = &mut self.storage.world;
        let entity = world.create_entity();
        world.add_component(entity, IdComponent { id });
        world.add_component(entity, TransformComponent::default());
        let name = if name.is_empty() { DEFAULT_ENTITY_NAME } else { name };
        world.add_component(entity, TagComponent::new(name));

        self.storage.entity_map.insert(id, entity);
        entity
    }

    /// Remove an entity and all its components.
    ///
    /// Must not be called while walking a view of one of its component types.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        if let Some(id) = self.storage.persistent_id(entity) {
            self.storage.entity_map.remove(&id);
        }
        self.storage.world.destroy_entity(entity)
    }

    /// Clone an entity under a fresh persistent id
    pub fn duplicate_entity(&mut self, entity: EntityId) -> Option<EntityId> {
        let name = self.storage.world.get_component::<TagComponent>(entity)?.tag.clone();
        let duplicate = self.create_entity(&name);

        let world = &mut self.storage.world;
        all_components!(copy_component_if_exists(world, entity, duplicate));
        if let Some(body) = world.get_component_mut::<RigidBody2DComponent>(duplicate) {
            body.runtime_body = None;
        }
        Some(duplicate)
    }

    /// Look up an entity by persistent id
    pub fn get_entity_by_id(&self, id: PersistentId) -> Option<EntityId> {
        self.storage.entity_map.get(&id).copied()
    }

    /// First entity whose tag equals `name`
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.storage.find_entity_by_name(name)
    }

    /// First camera marked primary
    pub fn primary_camera_entity(&self) -> Option<EntityId> {
        self.storage
            .world
            .iter::<CameraComponent>()
            .find(|(_, camera)| camera.primary)
            .map(|(entity, _)| entity)
    }

    /// Read handle to an entity
    pub fn entity(&self, entity: EntityId) -> EntityRef<'_> {
        EntityRef::new(entity, self)
    }

    /// Write handle to an entity
    pub fn entity_mut(&mut self, entity: EntityId) -> EntityMut<'_> {
        EntityMut::new(entity, self)
    }

    // ----- State machine -----

    /// Current state
    pub const fn state(&self) -> SceneState {
        self.state
    }

    /// Whether the scene is in Runtime
    pub fn is_running(&self) -> bool {
        self.state == SceneState::Runtime
    }

    /// Whether the scene is in Simulate
    pub fn is_simulating(&self) -> bool {
        self.state == SceneState::Simulate
    }

    fn transition(&self, expected: SceneState, to: SceneState) -> SceneResult<()> {
        if self.state == expected {
            return Ok(());
        }
        let err = SceneError::InvalidTransition { from: self.state, to };
        log::error!("{err}");
        Err(err)
    }

    fn set_state(&mut self, state: SceneState) {
        self.state = state;
        self.storage.world.hook_context_mut().running = state == SceneState::Runtime;
    }

    /// Edit to Runtime: physics bodies, script instances, native behaviours
    pub fn on_runtime_start(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        self.transition(SceneState::Edit, SceneState::Runtime)?;
        self.set_state(SceneState::Runtime);
        self.on_physics_2d_start();

        scripts.on_runtime_start();
        for entity in self.storage.world.view::<(ScriptComponent,)>() {
            scripts.on_create_entity(&mut self.storage, entity);
        }
        native::instantiate_all(&mut self.storage.world);

        log::info!("Scene '{}' started", self.name);
        Ok(())
    }

    /// Runtime to Edit
    pub fn on_runtime_stop(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        self.transition(SceneState::Runtime, SceneState::Edit)?;
        native::destroy_all(&mut self.storage.world);
        self.on_physics_2d_stop();
        scripts.on_runtime_stop();
        self.set_state(SceneState::Edit);

        log::info!("Scene '{}' stopped", self.name);
        Ok(())
    }

    /// Edit to Simulate: physics only
    pub fn on_simulation_start(&mut self) -> SceneResult<()> {
        self.transition(SceneState::Edit, SceneState::Simulate)?;
        self.set_state(SceneState::Simulate);
        self.on_physics_2d_start();
        Ok(())
    }

    /// Simulate to Edit
    pub fn on_simulation_stop(&mut self) -> SceneResult<()> {
        self.transition(SceneState::Simulate, SceneState::Edit)?;
        self.on_physics_2d_stop();
        self.set_state(SceneState::Edit);
        Ok(())
    }

    fn on_physics_2d_start(&mut self) {
        let physics = build_physics_world(&mut self.storage.world, &self.physics_config);
        log::debug!("Physics started with {} bodies", physics.body_count());
        self.storage.physics = Some(physics);
    }

    fn on_physics_2d_stop(&mut self) {
        self.storage.physics = None;
        clear_runtime_handles(&mut self.storage.world);
    }

    // ----- Pause and step -----

    /// Whether stepping is suspended
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend or resume stepping
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advance `frames` frames even while paused
    pub fn step(&mut self, frames: u32) {
        self.step_frames = frames;
    }

    fn consume_frame(&mut self) -> bool {
        if !self.paused {
            return true;
        }
        if self.step_frames > 0 {
            self.step_frames -= 1;
            return true;
        }
        false
    }

    // ----- Frame update -----

    /// One Runtime frame. Returns whether a primary camera was found.
    pub fn on_update_runtime(&mut self, ts: Timestep, scripts: &mut ScriptEngine, renderer: &mut Renderer2D) -> bool {
        if self.consume_frame() {
            for entity in self.storage.world.view::<(ScriptComponent,)>() {
                scripts.on_update_entity(&mut self.storage, entity, ts);
            }
            native::update_all(&mut self.storage.world, ts);
            self.step_physics();
        }

        let Some(camera_entity) = self.primary_camera_entity() else {
            return false;
        };
        let world = &self.storage.world;
        let (Some(camera), Some(transform)) = (
            world.get_component::<CameraComponent>(camera_entity),
            world.get_component::<TransformComponent>(camera_entity),
        ) else {
            return false;
        };

        renderer.begin_scene(&camera.camera, &transform.to_matrix());
        self.render_entities(renderer);
        renderer.end_scene();
        true
    }

    /// One Simulate frame: physics only, rendered through the editor camera
    pub fn on_update_simulation(&mut self, _ts: Timestep, camera: &EditorCamera, renderer: &mut Renderer2D) {
        if self.consume_frame() {
            self.step_physics();
        }
        self.render_editor(camera, renderer);
    }

    /// One Edit frame: render through the editor camera
    pub fn on_update_editor(&mut self, _ts: Timestep, camera: &EditorCamera, renderer: &mut Renderer2D) {
        self.render_editor(camera, renderer);
    }

    fn step_physics(&mut self) {
        let SceneStorage { world, physics, .. } = &mut self.storage;
        if let Some(physics) = physics {
            physics.step();
            sync_transforms(world, physics);
        }
    }

    fn render_editor(&self, camera: &EditorCamera, renderer: &mut Renderer2D) {
        renderer.begin_scene_editor(camera);
        self.render_entities(renderer);
        renderer.end_scene();
    }

    fn render_entities(&self, renderer: &mut Renderer2D) {
        let world = &self.storage.world;

        for entity in world.view::<(TransformComponent, SpriteRendererComponent)>() {
            if let (Some(transform), Some(sprite)) = (
                world.get_component::<TransformComponent>(entity),
                world.get_component::<SpriteRendererComponent>(entity),
            ) {
                renderer.draw_sprite(&transform.to_matrix(), sprite, entity.tag());
            }
        }

        for entity in world.view::<(TransformComponent, CircleRendererComponent)>() {
            if let (Some(transform), Some(circle)) = (
                world.get_component::<TransformComponent>(entity),
                world.get_component::<CircleRendererComponent>(entity),
            ) {
                renderer.draw_circle(&transform.to_matrix(), &circle.color, circle.thickness, circle.fade, entity.tag());
            }
        }

        for entity in world.view::<(TransformComponent, TextComponent)>() {
            if let (Some(transform), Some(text)) = (
                world.get_component::<TransformComponent>(entity),
                world.get_component::<TextComponent>(entity),
            ) {
                renderer.draw_text_component(&transform.to_matrix(), text, entity.tag());
            }
        }
    }

    /// Propagate a new viewport size to every non-fixed camera
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        if self.viewport_width == width && self.viewport_height == height {
            return;
        }
        self.viewport_width = width;
        self.viewport_height = height;

        let world = &mut self.storage.world;
        let context = world.hook_context_mut();
        context.viewport_width = width;
        context.viewport_height = height;

        for (_, camera) in world.iter_mut::<CameraComponent>() {
            if !camera.fixed_aspect_ratio {
                camera.camera.set_viewport_size(width, height);
            }
        }
    }

    /// Current viewport size
    pub const fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }
}
