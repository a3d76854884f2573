//! Editor play-mode orchestration
//!
//! The session keeps the authored scene untouched while playing: `play` and
//! `simulate` run a [`Scene::copy`], `stop` throws the copy away. It also
//! owns the open project and its asset manager.

use crate::assets::{AssetType, EditorAssetManager};
use crate::core::config::PhysicsConfig;
use crate::ecs::EntityId;
use crate::foundation::time::Timestep;
use crate::project::Project;
use crate::render::{EditorCamera, Renderer2D, Texture2D};
use crate::scene::scene::{Scene, SceneState};
use crate::scene::serializer::SceneSerializer;
use crate::scene::{SceneError, SceneResult};
use crate::scripting::ScriptEngine;
use std::path::{Path, PathBuf};

/// Edit scene, play copy, project and assets
#[derive(Debug)]
pub struct EditorSession {
    physics_config: PhysicsConfig,
    edit_scene: Scene,
    runtime_scene: Option<Scene>,
    scene_path: Option<PathBuf>,
    project: Option<Project>,
    assets: Option<EditorAssetManager>,
    editor_camera: EditorCamera,
    viewport: (u32, u32),
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl EditorSession {
    /// Session with an empty scene
    pub fn new(physics_config: PhysicsConfig) -> Self {
        Self {
            edit_scene: Scene::with_config(physics_config.clone()),
            physics_config,
            runtime_scene: None,
            scene_path: None,
            project: None,
            assets: None,
            editor_camera: EditorCamera::new(30.0_f32.to_radians(), 1.778, 0.1, 1000.0),
            viewport: (0, 0),
        }
    }

    /// Current state of the active scene
    pub fn state(&self) -> SceneState {
        self.runtime_scene.as_ref().map_or(SceneState::Edit, Scene::state)
    }

    /// The authored scene
    pub const fn edit_scene(&self) -> &Scene {
        &self.edit_scene
    }

    /// Mutable authored scene
    pub fn edit_scene_mut(&mut self) -> &mut Scene {
        &mut self.edit_scene
    }

    /// The play copy while playing, the authored scene otherwise
    pub fn active_scene(&self) -> &Scene {
        self.runtime_scene.as_ref().unwrap_or(&self.edit_scene)
    }

    /// Mutable active scene
    pub fn active_scene_mut(&mut self) -> &mut Scene {
        self.runtime_scene.as_mut().unwrap_or(&mut self.edit_scene)
    }

    /// File the edit scene was loaded from or saved to
    pub fn scene_path(&self) -> Option<&Path> {
        self.scene_path.as_deref()
    }

    /// The open project
    pub const fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Asset manager of the open project
    pub const fn assets(&self) -> Option<&EditorAssetManager> {
        self.assets.as_ref()
    }

    /// Mutable asset manager of the open project
    pub fn assets_mut(&mut self) -> Option<&mut EditorAssetManager> {
        self.assets.as_mut()
    }

    /// Camera used in Edit and Simulate
    pub const fn editor_camera(&self) -> &EditorCamera {
        &self.editor_camera
    }

    /// Mutable editor camera
    pub fn editor_camera_mut(&mut self) -> &mut EditorCamera {
        &mut self.editor_camera
    }

    // ----- Play mode -----

    /// Start Runtime on a copy of the edit scene
    pub fn play(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        match self.state() {
            SceneState::Edit => {}
            SceneState::Simulate => self.stop(scripts)?,
            SceneState::Runtime => {
                return Err(SceneError::InvalidTransition {
                    from: SceneState::Runtime,
                    to: SceneState::Runtime,
                })
            }
        }

        let mut scene = Scene::copy(&self.edit_scene);
        scene.on_runtime_start(scripts)?;
        self.runtime_scene = Some(scene);
        Ok(())
    }

    /// Start Simulate on a copy of the edit scene
    pub fn simulate(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        match self.state() {
            SceneState::Edit => {}
            SceneState::Runtime => self.stop(scripts)?,
            SceneState::Simulate => {
                return Err(SceneError::InvalidTransition {
                    from: SceneState::Simulate,
                    to: SceneState::Simulate,
                })
            }
        }

        let mut scene = Scene::copy(&self.edit_scene);
        scene.on_simulation_start()?;
        self.runtime_scene = Some(scene);
        Ok(())
    }

    /// Stop the play copy and return to the edit scene
    pub fn stop(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        let Some(scene) = self.runtime_scene.as_mut() else {
            let err = SceneError::InvalidTransition {
                from: SceneState::Edit,
                to: SceneState::Edit,
            };
            log::error!("{err}");
            return Err(err);
        };

        match scene.state() {
            SceneState::Runtime => scene.on_runtime_stop(scripts)?,
            SceneState::Simulate => scene.on_simulation_stop()?,
            SceneState::Edit => {}
        }
        self.runtime_scene = None;
        Ok(())
    }

    /// Suspend or resume the play copy; ignored while editing
    pub fn pause(&mut self, paused: bool) {
        if let Some(scene) = self.runtime_scene.as_mut() {
            scene.set_paused(paused);
        }
    }

    /// Advance a paused play copy by one frame
    pub fn step(&mut self) {
        if let Some(scene) = self.runtime_scene.as_mut() {
            scene.step(1);
        }
    }

    /// Duplicate an entity of the edit scene along with its script fields
    pub fn duplicate_entity(&mut self, entity: EntityId, scripts: &mut ScriptEngine) -> SceneResult<Option<EntityId>> {
        let state = self.state();
        if state != SceneState::Edit {
            return Err(SceneError::NotEditing(state));
        }

        let Some(duplicate) = self.edit_scene.duplicate_entity(entity) else {
            return Ok(None);
        };
        let storage = self.edit_scene.storage();
        if let (Some(from), Some(to)) = (storage.persistent_id(entity), storage.persistent_id(duplicate)) {
            scripts.copy_field_map(from, to);
        }
        Ok(Some(duplicate))
    }

    /// One frame of whatever state the session is in
    pub fn on_update(&mut self, ts: Timestep, scripts: &mut ScriptEngine, renderer: &mut Renderer2D) {
        match self.runtime_scene.as_mut() {
            Some(scene) if scene.is_running() => {
                scene.on_update_runtime(ts, scripts, renderer);
            }
            Some(scene) => scene.on_update_simulation(ts, &self.editor_camera, renderer),
            None => self.edit_scene.on_update_editor(ts, &self.editor_camera, renderer),
        }
    }

    /// Resize the viewport of every scene and the editor camera
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.editor_camera.set_viewport_size(width, height);
        self.edit_scene.on_viewport_resize(width, height);
        if let Some(scene) = self.runtime_scene.as_mut() {
            scene.on_viewport_resize(width, height);
        }
    }

    // ----- Documents -----

    fn stop_if_playing(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        if self.runtime_scene.is_some() {
            self.stop(scripts)?;
        }
        Ok(())
    }

    /// Replace the edit scene with an empty one
    pub fn new_scene(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        self.stop_if_playing(scripts)?;
        let mut scene = Scene::with_config(self.physics_config.clone());
        scene.on_viewport_resize(self.viewport.0, self.viewport.1);
        self.edit_scene = scene;
        self.scene_path = None;
        Ok(())
    }

    /// Load a scene document as the new edit scene.
    ///
    /// On failure the current edit scene is kept.
    pub fn open_scene(
        &mut self,
        path: impl AsRef<Path>,
        scripts: &mut ScriptEngine,
        renderer: &mut Renderer2D,
    ) -> SceneResult<()> {
        let path = path.as_ref();
        self.stop_if_playing(scripts)?;

        if AssetType::from_extension(path) != AssetType::Scene {
            log::warn!("Could not load {} - not a scene file", path.display());
            return Err(SceneError::NotASceneFile(path.to_path_buf()));
        }

        let mut scene = Scene::with_config(self.physics_config.clone());
        scene.on_viewport_resize(self.viewport.0, self.viewport.1);
        match self.assets.as_mut() {
            Some(assets) => {
                let mut loader = |texture: &Path| load_scene_texture(assets, renderer, texture);
                let mut serializer = SceneSerializer::new(&mut scene)
                    .with_scripts(scripts)
                    .with_textures(&mut loader);
                serializer.deserialize(path)?;
            }
            None => {
                let mut serializer = SceneSerializer::new(&mut scene).with_scripts(scripts);
                serializer.deserialize(path)?;
            }
        }

        self.edit_scene = scene;
        self.scene_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Save the edit scene to the path it came from
    pub fn save_scene(&mut self, scripts: &mut ScriptEngine) -> SceneResult<()> {
        let path = self.scene_path.clone().ok_or(SceneError::NoScenePath)?;
        self.save_scene_as(path, scripts)
    }

    /// Save the edit scene to `path` and remember it
    pub fn save_scene_as(&mut self, path: impl AsRef<Path>, scripts: &mut ScriptEngine) -> SceneResult<()> {
        let path = path.as_ref();
        SceneSerializer::new(&mut self.edit_scene)
            .with_scripts(scripts)
            .serialize(path)?;
        self.scene_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Open a project: asset registry, script assembly, then start scene.
    ///
    /// A missing registry or assembly is logged and skipped. Without a
    /// start scene the session starts from an empty scene.
    pub fn open_project(
        &mut self,
        path: impl AsRef<Path>,
        scripts: &mut ScriptEngine,
        renderer: &mut Renderer2D,
    ) -> SceneResult<()> {
        let project = Project::load(path)?;

        let mut assets = EditorAssetManager::new(project.asset_directory(), project.asset_registry_path());
        if project.asset_registry_path().exists() {
            assets.deserialize_asset_registry()?;
        } else {
            log::warn!("Project '{}' has no asset registry yet", project.config().name);
        }

        match project.script_module_path() {
            Some(module) if module.is_dir() => {
                scripts.load_app_assembly(&module)?;
            }
            _ => log::warn!("Current project does not have a script assembly or it was not found."),
        }

        let start_scene = assets.get_metadata(project.config().start_scene);
        self.assets = Some(assets);
        self.project = Some(project);

        if start_scene.asset_type == AssetType::Scene {
            let scene_path = self.asset_path(&start_scene.file_path)?;
            self.open_scene(scene_path, scripts, renderer)
        } else {
            self.new_scene(scripts)
        }
    }

    /// Absolute path of an asset in the open project
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> SceneResult<PathBuf> {
        let project = self.project.as_ref().ok_or(SceneError::NoProject)?;
        Ok(project.asset_file_system_path(relative))
    }

    /// Write the open project's document back to `path`
    pub fn save_project(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let project = self.project.as_ref().ok_or(SceneError::NoProject)?;
        Ok(project.save_active(path)?)
    }
}

fn load_scene_texture(assets: &mut EditorAssetManager, renderer: &mut Renderer2D, path: &Path) -> Option<Texture2D> {
    let handle = match assets.import_asset(path, renderer) {
        Ok(handle) => handle,
        Err(err) => {
            log::warn!("Could not load texture {}: {err}", path.display());
            return None;
        }
    };
    assets
        .get_asset(handle, renderer)
        .and_then(|asset| asset.as_texture().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ScriptingConfig;
    use crate::ecs::components::{BodyType, RigidBody2DComponent, TransformComponent};
    use crate::render::HeadlessBackend;

    fn services() -> (ScriptEngine, Renderer2D) {
        (
            ScriptEngine::new(ScriptingConfig::default()).unwrap(),
            Renderer2D::new(Box::new(HeadlessBackend::new())).unwrap(),
        )
    }

    #[test]
    fn test_play_runs_a_copy() {
        let (mut scripts, mut renderer) = services();
        let mut session = EditorSession::default();
        let ball = session.edit_scene_mut().create_entity("Ball");
        session
            .edit_scene_mut()
            .world_mut()
            .add_component(ball, RigidBody2DComponent::new(BodyType::Dynamic));

        session.play(&mut scripts).unwrap();
        assert_eq!(session.state(), SceneState::Runtime);
        assert!(matches!(session.play(&mut scripts), Err(SceneError::InvalidTransition { .. })));

        for _ in 0..10 {
            session.on_update(Timestep::from_seconds(1.0 / 60.0), &mut scripts, &mut renderer);
        }
        let y = |scene: &Scene| scene.world().get_component::<TransformComponent>(ball).unwrap().translation.y;
        assert!(y(session.active_scene()) < 0.0);
        assert_eq!(y(session.edit_scene()), 0.0);

        session.stop(&mut scripts).unwrap();
        assert_eq!(session.state(), SceneState::Edit);
        assert!(session.stop(&mut scripts).is_err());
    }

    #[test]
    fn test_simulate_replaces_play() {
        let (mut scripts, _) = services();
        let mut session = EditorSession::default();
        session.play(&mut scripts).unwrap();
        session.simulate(&mut scripts).unwrap();
        assert_eq!(session.state(), SceneState::Simulate);
        session.pause(true);
        assert!(session.active_scene().is_paused());
        assert!(!session.edit_scene().is_paused());
    }

    #[test]
    fn test_duplicate_only_while_editing() {
        let (mut scripts, _) = services();
        let mut session = EditorSession::default();
        let entity = session.edit_scene_mut().create_entity("Crate");
        assert!(session.duplicate_entity(entity, &mut scripts).unwrap().is_some());

        session.play(&mut scripts).unwrap();
        assert!(matches!(
            session.duplicate_entity(entity, &mut scripts),
            Err(SceneError::NotEditing(SceneState::Runtime))
        ));
    }

    #[test]
    fn test_save_and_open_scene() {
        let (mut scripts, mut renderer) = services();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Level.ember");

        let mut session = EditorSession::default();
        assert!(matches!(session.save_scene(&mut scripts), Err(SceneError::NoScenePath)));
        session.edit_scene_mut().set_name("Level");
        session.edit_scene_mut().create_entity("Player");
        session.save_scene_as(&path, &mut scripts).unwrap();

        session.new_scene(&mut scripts).unwrap();
        assert_eq!(session.edit_scene().world().entity_count(), 0);

        session.open_scene(&path, &mut scripts, &mut renderer).unwrap();
        assert_eq!(session.edit_scene().name(), "Level");
        assert!(session.edit_scene().find_entity_by_name("Player").is_some());
        assert_eq!(session.scene_path(), Some(path.as_path()));

        assert!(matches!(
            session.open_scene(dir.path().join("notes.txt"), &mut scripts, &mut renderer),
            Err(SceneError::NotASceneFile(_))
        ));
        assert!(session.edit_scene().find_entity_by_name("Player").is_some());
    }

    #[test]
    fn test_project_required() {
        let session = EditorSession::default();
        assert!(matches!(session.asset_path("a.png"), Err(SceneError::NoProject)));
        assert!(matches!(session.save_project("x.eproj"), Err(SceneError::NoProject)));
    }
}
