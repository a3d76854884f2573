//! Core engine implementation
//!
//! The engine owns the shared services (script host, renderer, editor
//! session, keyboard state) and a stack of layers. Each frame it first runs
//! the work other threads queued for the main thread, then updates the
//! layers in the order they were pushed.

use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::core::tasks::{MainThreadQueue, MainThreadSender};
use crate::foundation::time::Timestep;
use crate::input::{InputState, KeyboardState};
use crate::render::{GraphicsBackend, RenderError, Renderer2D};
use crate::scene::{EditorSession, SceneError};
use crate::scripting::{AssemblyWatcher, ScriptEngine, ScriptError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Services every layer can reach
pub struct EngineServices {
    /// Script host
    pub scripts: ScriptEngine,
    /// Batch renderer
    pub renderer: Renderer2D,
    /// Edit scene, play copy and open project
    pub session: EditorSession,
    /// Key state fed by the platform layer
    pub input: Arc<KeyboardState>,
}

/// A slice of per-frame behaviour
///
/// Layers are updated in push order after the main-thread queue is drained.
pub trait Layer {
    /// Name used in logs
    fn name(&self) -> &str {
        "Layer"
    }

    /// Called once when pushed
    fn on_attach(&mut self, _services: &mut EngineServices) {}

    /// Called once per frame
    fn on_update(&mut self, services: &mut EngineServices, ts: Timestep);

    /// Called once when popped or when the engine shuts down
    fn on_detach(&mut self, _services: &mut EngineServices) {}
}

/// Main engine struct
///
/// The engine coordinates all subsystems and drives the frame.
pub struct Engine {
    config: EngineConfig,
    services: EngineServices,
    layers: Vec<Box<dyn Layer>>,
    queue: MainThreadQueue<EngineServices>,
    watcher: Option<AssemblyWatcher>,
    frame_count: u64,
    running: bool,
}

impl Engine {
    /// Create a new engine instance drawing through `backend`
    pub fn new(config: EngineConfig, backend: Box<dyn GraphicsBackend>) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        let renderer = Renderer2D::with_config(backend, config.renderer.clone())?;
        let mut scripts = ScriptEngine::new(config.scripting.clone())?;
        let input = Arc::new(KeyboardState::new());
        let shared: Arc<dyn InputState> = input.clone();
        scripts.set_input(shared);
        let session = EditorSession::new(config.physics.clone());

        Ok(Self {
            config,
            services: EngineServices {
                scripts,
                renderer,
                session,
                input,
            },
            layers: Vec::new(),
            queue: MainThreadQueue::new(),
            watcher: None,
            frame_count: 0,
            running: true,
        })
    }

    /// Engine configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared services
    pub const fn services(&self) -> &EngineServices {
        &self.services
    }

    /// Mutable shared services
    pub fn services_mut(&mut self) -> &mut EngineServices {
        &mut self.services
    }

    /// Push a layer on top of the stack and attach it
    pub fn push_layer(&mut self, mut layer: Box<dyn Layer>) {
        log::debug!("Attaching layer '{}'", layer.name());
        layer.on_attach(&mut self.services);
        self.layers.push(layer);
    }

    /// Detach and return the top layer
    pub fn pop_layer(&mut self) -> Option<Box<dyn Layer>> {
        let mut layer = self.layers.pop()?;
        log::debug!("Detaching layer '{}'", layer.name());
        layer.on_detach(&mut self.services);
        Some(layer)
    }

    /// Number of attached layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Queue work for the start of the next frame
    pub fn submit_to_main_thread(&self, task: impl FnOnce(&mut EngineServices) + Send + 'static) {
        self.queue.submit(task);
    }

    /// Handle other threads use to queue main-thread work
    pub fn main_thread_sender(&self) -> MainThreadSender<EngineServices> {
        self.queue.sender()
    }

    /// Run one frame: queued tasks, then every layer in order
    pub fn run_frame(&mut self, ts: Timestep) {
        self.queue.execute(&mut self.services);
        for layer in &mut self.layers {
            layer.on_update(&mut self.services, ts);
        }
        self.frame_count += 1;
    }

    /// Run frames of a fixed length until `frames` have run or `quit` is called
    pub fn run(&mut self, frames: u64, ts: Timestep) {
        log::info!("Starting main loop...");
        let mut remaining = frames;
        while self.running && remaining > 0 {
            self.run_frame(ts);
            remaining -= 1;
        }
        log::info!("Main loop finished after {} frame(s)", self.frame_count);
    }

    /// Frames run so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Whether `quit` has not been called
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Request the main loop to stop
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Open a project in the editor session and start watching its scripts
    pub fn open_project(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let EngineServices {
            scripts,
            renderer,
            session,
            ..
        } = &mut self.services;
        session.open_project(path, scripts, renderer)?;
        self.watch_app_assembly();
        Ok(())
    }

    /// Load an app assembly directly and start watching it
    pub fn load_app_assembly(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        let count = self.services.scripts.load_app_assembly(path)?;
        self.watch_app_assembly();
        Ok(count)
    }

    /// Whether the assembly watcher thread is running
    pub const fn is_watching_scripts(&self) -> bool {
        self.watcher.is_some()
    }

    fn watch_app_assembly(&mut self) {
        self.watcher = None;
        if !self.config.scripting.hot_reload {
            return;
        }
        let Some(path) = self.services.scripts.app_assembly_path() else {
            return;
        };
        self.watcher = Some(AssemblyWatcher::spawn(
            path,
            Duration::from_millis(self.config.scripting.watch_interval_ms),
            self.services.scripts.reload_flag(),
            self.queue.sender(),
            reload_scripts,
        ));
    }
}

fn reload_scripts(services: &mut EngineServices) {
    if let Err(err) = services.scripts.reload_assembly() {
        log::error!("Script reload failed: {err}");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        while self.pop_layer().is_some() {}
        self.watcher = None;
        log::info!("Engine shutdown complete");
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The renderer could not be created
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// The script host failed
    #[error("Scripting error: {0}")]
    Script(#[from] ScriptError),

    /// Opening a project or scene failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Layer for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_attach(&mut self, _services: &mut EngineServices) {
            self.log.borrow_mut().push(format!("attach {}", self.name));
        }

        fn on_update(&mut self, services: &mut EngineServices, _ts: Timestep) {
            let scene = services.session.edit_scene().name().to_string();
            self.log.borrow_mut().push(format!("update {} {scene}", self.name));
        }

        fn on_detach(&mut self, _services: &mut EngineServices) {
            self.log.borrow_mut().push(format!("detach {}", self.name));
        }
    }

    fn engine() -> Engine {
        let config = EngineConfig::default().with_hot_reload(false);
        Engine::new(config, Box::new(HeadlessBackend::new())).unwrap()
    }

    #[test]
    fn test_queue_runs_before_layers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine();
        for name in ["first", "second"] {
            engine.push_layer(Box::new(Recorder {
                name,
                log: Rc::clone(&log),
            }));
        }

        engine.submit_to_main_thread(|services| services.session.edit_scene_mut().set_name("Queued"));
        engine.run_frame(Timestep::from_seconds(0.016));

        assert_eq!(
            *log.borrow(),
            vec!["attach first", "attach second", "update first Queued", "update second Queued"]
        );
        assert_eq!(engine.frame_count(), 1);

        drop(engine);
        assert_eq!(log.borrow()[4..], ["detach second", "detach first"]);
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut engine = engine();
        engine.run(3, Timestep::from_seconds(0.016));
        assert_eq!(engine.frame_count(), 3);

        engine.quit();
        engine.run(3, Timestep::from_seconds(0.016));
        assert_eq!(engine.frame_count(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.physics.fixed_timestep = 0.0;
        assert!(matches!(
            Engine::new(config, Box::new(HeadlessBackend::new())),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_no_watcher_without_hot_reload() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = dir.path().join("Sandbox");
        std::fs::create_dir(&assembly).unwrap();

        let mut engine = engine();
        assert_eq!(engine.load_app_assembly(&assembly).unwrap(), 0);
        assert!(!engine.is_watching_scripts());
    }
}
