//! # Script Engine
//!
//! Owns the Rhai engine, the discovered classes, live instances and the
//! per-entity field cache.
//!
//! ## Assembly layout
//!
//! The app assembly is a directory. Every `.rhai` file in it is a candidate
//! class named `<directory name>.<file stem>`; files defining neither
//! `on_create()` nor `on_update(ts)` are helpers and are skipped.
//!
//! ## Reload
//!
//! [`ScriptEngine::reload_assembly`] rebuilds the Rhai engine from scratch,
//! recompiles the base module and the app assembly and drops every instance.
//! Cached field values survive and are applied to the next instances.

use crate::core::config::ScriptingConfig;
use crate::ecs::components::{IdComponent, ScriptComponent};
use crate::ecs::EntityId;
use crate::foundation::id::PersistentId;
use crate::foundation::time::Timestep;
use crate::input::InputState;
use crate::scene::SceneStorage;
use crate::scripting::api::{register_api, ScriptContext, SharedContext, CORE_SOURCE};
use crate::scripting::class::{coerce_field_value, ScriptClass, ScriptInstance};
use crate::scripting::field::{ScriptFieldInstance, ScriptFieldMap};
use crate::scripting::{ScriptError, ScriptResult};
use rhai::{Dynamic, Engine, AST};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Script host for one process
pub struct ScriptEngine {
    config: ScriptingConfig,
    engine: Engine,
    context: SharedContext,
    core_ast: AST,
    app_assembly_path: Option<PathBuf>,
    classes: BTreeMap<String, Rc<ScriptClass>>,
    instances: HashMap<PersistentId, ScriptInstance>,
    field_cache: HashMap<PersistentId, ScriptFieldMap>,
    reload_pending: Arc<AtomicBool>,
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("app_assembly_path", &self.app_assembly_path)
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("instances", &self.instances.len())
            .field("cached_entities", &self.field_cache.len())
            .finish_non_exhaustive()
    }
}

fn build_engine(context: &SharedContext) -> Engine {
    let mut engine = Engine::new();
    register_api(&mut engine, context);
    engine
}

fn read_source(path: &Path) -> ScriptResult<String> {
    fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl ScriptEngine {
    /// Create the host and compile the base module
    pub fn new(config: ScriptingConfig) -> ScriptResult<Self> {
        let context = SharedContext::default();
        let engine = build_engine(&context);
        let core_ast = Self::compile_core(&engine, &config)?;
        log::info!("Script engine initialized");

        Ok(Self {
            config,
            engine,
            context,
            core_ast,
            app_assembly_path: None,
            classes: BTreeMap::new(),
            instances: HashMap::new(),
            field_cache: HashMap::new(),
            reload_pending: Arc::new(AtomicBool::new(false)),
        })
    }

    fn compile_core(engine: &Engine, config: &ScriptingConfig) -> ScriptResult<AST> {
        let source = match &config.core_assembly_path {
            Some(path) => read_source(path)?,
            None => CORE_SOURCE.to_string(),
        };
        engine.compile(&source).map_err(|err| ScriptError::Compile {
            class: "core".to_string(),
            message: err.to_string(),
        })
    }

    /// Load the app assembly directory and discover its classes.
    ///
    /// Returns the number of classes found. On failure the previous classes
    /// stay registered.
    pub fn load_app_assembly(&mut self, path: impl AsRef<Path>) -> ScriptResult<usize> {
        let path = path.as_ref();
        let classes = self.scan_classes(path)?;
        log::info!("Loaded app assembly '{}' with {} class(es)", path.display(), classes.len());

        self.classes = classes;
        self.app_assembly_path = Some(path.to_path_buf());
        self.reload_pending.store(false, Ordering::Release);
        Ok(self.classes.len())
    }

    fn scan_classes(&self, directory: &Path) -> ScriptResult<BTreeMap<String, Rc<ScriptClass>>> {
        let io_error = |source| ScriptError::Io {
            path: directory.to_path_buf(),
            source,
        };
        let namespace = directory
            .file_name()
            .map_or_else(|| "App".to_string(), |name| name.to_string_lossy().into_owned());

        let mut files: Vec<PathBuf> = fs::read_dir(directory)
            .map_err(io_error)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "rhai"))
            .collect();
        files.sort();

        let mut classes = BTreeMap::new();
        for file in files {
            let Some(name) = file.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
                continue;
            };
            let source = read_source(&file)?;
            if let Some(class) = ScriptClass::compile(&self.engine, &self.core_ast, &namespace, &name, &source)? {
                classes.insert(class.full_name(), Rc::new(class));
            }
        }
        Ok(classes)
    }

    /// Rebuild the engine, recompile everything and drop all instances
    pub fn reload_assembly(&mut self) -> ScriptResult<()> {
        log::info!("Reloading assemblies.");
        self.reload_pending.store(false, Ordering::Release);
        let path = self.app_assembly_path.clone().ok_or(ScriptError::NoAppAssembly)?;

        self.instances.clear();
        let input = self.context.borrow_mut().input.take();
        self.context = Rc::new(RefCell::new(ScriptContext {
            input,
            ..ScriptContext::default()
        }));
        self.engine = build_engine(&self.context);
        self.core_ast = Self::compile_core(&self.engine, &self.config)?;

        self.load_app_assembly(&path).map(|_| ())
    }

    /// Flag set by the assembly watcher while a reload is queued
    pub fn reload_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.reload_pending)
    }

    /// Scripting configuration
    pub const fn config(&self) -> &ScriptingConfig {
        &self.config
    }

    /// Directory of the loaded app assembly
    pub fn app_assembly_path(&self) -> Option<&Path> {
        self.app_assembly_path.as_deref()
    }

    /// Whether a class with this full name was discovered
    pub fn entity_class_exists(&self, full_name: &str) -> bool {
        self.classes.contains_key(full_name)
    }

    /// Look up a discovered class
    pub fn entity_class(&self, full_name: &str) -> Option<&ScriptClass> {
        self.classes.get(full_name).map(AsRef::as_ref)
    }

    /// All discovered classes by full name
    pub fn entity_classes(&self) -> impl Iterator<Item = (&str, &ScriptClass)> {
        self.classes.iter().map(|(name, class)| (name.as_str(), class.as_ref()))
    }

    /// Route script key queries to an input source
    pub fn set_input(&mut self, input: Arc<dyn InputState>) {
        self.context.borrow_mut().input = Some(input);
    }

    /// Make the scene visible to native functions
    pub fn on_runtime_start(&mut self) {
        self.context.borrow_mut().running = true;
    }

    /// Hide the scene again and drop every instance
    pub fn on_runtime_stop(&mut self) {
        self.context.borrow_mut().running = false;
        self.instances.clear();
    }

    /// Whether a scene is currently running scripts
    pub fn is_running(&self) -> bool {
        self.context.borrow().running
    }

    fn lend<R>(context: &SharedContext, storage: &mut SceneStorage, f: impl FnOnce() -> R) -> R {
        std::mem::swap(&mut context.borrow_mut().storage, storage);
        let result = f();
        std::mem::swap(&mut context.borrow_mut().storage, storage);
        result
    }

    /// Instantiate the script of `entity`, apply cached fields, run `on_create`
    pub fn on_create_entity(&mut self, storage: &mut SceneStorage, entity: EntityId) {
        let world = &storage.world;
        let (Some(script), Some(identity)) = (
            world.get_component::<ScriptComponent>(entity),
            world.get_component::<IdComponent>(entity),
        ) else {
            return;
        };
        let entity_id = identity.id;
        let Some(class) = self.classes.get(&script.class_name).cloned() else {
            log::warn!("Script class '{}' not found for entity {entity_id}", script.class_name);
            return;
        };

        let mut instance = ScriptInstance::new(Rc::clone(&class), entity_id);
        if let Some(fields) = self.field_cache.get(&entity_id) {
            for (name, cached) in fields {
                let applied = class.field(name).is_some_and(|field| field.field_type == cached.field_type())
                    && cached
                        .to_dynamic()
                        .is_some_and(|value| instance.set_field_value(name, &value));
                if !applied {
                    log::warn!("Field '{name}' could not be applied to class '{}'", class.full_name());
                }
            }
        }

        let engine = &self.engine;
        if let Err(err) = Self::lend(&self.context, storage, || instance.invoke_on_create(engine)) {
            log::error!("{err}");
        }
        self.instances.insert(entity_id, instance);
    }

    /// Run `on_update` on the instance of `entity`
    pub fn on_update_entity(&mut self, storage: &mut SceneStorage, entity: EntityId, ts: Timestep) {
        let Some(entity_id) = storage.world.get_component::<IdComponent>(entity).map(|identity| identity.id) else {
            return;
        };
        let Some(instance) = self.instances.get_mut(&entity_id) else {
            log::error!("Could not find ScriptInstance for entity {entity_id}");
            return;
        };

        let engine = &self.engine;
        if let Err(err) = Self::lend(&self.context, storage, || instance.invoke_on_update(engine, ts.seconds())) {
            log::error!("{err}");
        }
    }

    /// Live instance of an entity
    pub fn instance(&self, entity_id: PersistentId) -> Option<&ScriptInstance> {
        self.instances.get(&entity_id)
    }

    /// Number of live instances
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Cached field values of an entity, created on first access
    pub fn script_field_map(&mut self, entity_id: PersistentId) -> &mut ScriptFieldMap {
        self.field_cache.entry(entity_id).or_default()
    }

    /// Cached field values of an entity, if any
    pub fn field_map(&self, entity_id: PersistentId) -> Option<&ScriptFieldMap> {
        self.field_cache.get(&entity_id)
    }

    /// Copy cached field values from one entity to another
    pub fn copy_field_map(&mut self, from: PersistentId, to: PersistentId) {
        if let Some(fields) = self.field_cache.get(&from).cloned() {
            self.field_cache.insert(to, fields);
        }
    }

    /// Forget the cached values of an entity
    pub fn remove_field_map(&mut self, entity_id: PersistentId) {
        self.field_cache.remove(&entity_id);
    }

    /// Set a field value for an entity of class `class_name`.
    ///
    /// The value is cached for future instances and written into the live
    /// instance, if there is one.
    pub fn set_field_value(
        &mut self,
        entity_id: PersistentId,
        class_name: &str,
        field_name: &str,
        value: &Dynamic,
    ) -> ScriptResult<()> {
        let class = self
            .classes
            .get(class_name)
            .ok_or_else(|| ScriptError::ClassNotFound(class_name.to_string()))?;
        let field = class.field(field_name).ok_or_else(|| ScriptError::FieldNotFound {
            class: class_name.to_string(),
            field: field_name.to_string(),
        })?;
        let mismatch = || ScriptError::TypeMismatch {
            field: field_name.to_string(),
            expected: field.field_type,
        };
        if coerce_field_value(field, value).is_none() {
            return Err(mismatch());
        }

        if field.field_type.is_persistable() {
            let mut slot = ScriptFieldInstance::new(field.clone());
            if !slot.set_from_dynamic(value) {
                return Err(mismatch());
            }
            self.field_cache
                .entry(entity_id)
                .or_default()
                .insert(field_name.to_string(), slot);
        } else {
            log::warn!("Field '{field_name}' of kind {} is not persisted", field.field_type);
        }

        if let Some(instance) = self.instances.get_mut(&entity_id) {
            instance.set_field_value(field_name, value);
        }
        Ok(())
    }

    /// Current value of a field: live instance first, then cache, then default
    pub fn field_value(&self, entity_id: PersistentId, class_name: &str, field_name: &str) -> Option<Dynamic> {
        if let Some(value) = self.instances.get(&entity_id).and_then(|instance| instance.field_value(field_name)) {
            return Some(value);
        }
        if let Some(value) = self
            .field_cache
            .get(&entity_id)
            .and_then(|fields| fields.get(field_name))
            .and_then(ScriptFieldInstance::to_dynamic)
        {
            return Some(value);
        }
        self.classes.get(class_name)?.default_value(field_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;
    use crate::scripting::field::ScriptFieldType;

    const MOVER: &str = r"
        let speed = 2.0;
        let steps = 0;

        fn on_create() {
            this.steps = 0;
        }

        fn on_update(ts) {
            let position = this.get_translation();
            position.x += this.speed * ts;
            this.set_translation(position);
            this.steps += 1;
        }
    ";

    fn assembly(source: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let assembly = dir.path().join("Sandbox");
        fs::create_dir(&assembly).unwrap();
        fs::write(assembly.join("Mover.rhai"), source).unwrap();
        fs::write(assembly.join("util.rhai"), "fn double_it(x) { x * 2 }").unwrap();
        (dir, assembly)
    }

    fn storage_with_script() -> (SceneStorage, EntityId, PersistentId) {
        let mut storage = SceneStorage::default();
        let id = PersistentId::new();
        let entity = storage.world.create_entity();
        storage.world.add_component(entity, IdComponent { id });
        storage.world.add_component(entity, TransformComponent::default());
        storage.world.add_component(entity, ScriptComponent::new("Sandbox.Mover"));
        storage.entity_map.insert(id, entity);
        (storage, entity, id)
    }

    #[test]
    fn test_classes_discovered() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        assert_eq!(scripts.load_app_assembly(&path).unwrap(), 1);
        assert!(scripts.entity_class_exists("Sandbox.Mover"));
        assert!(!scripts.entity_class_exists("Sandbox.util"));

        let class = scripts.entity_class("Sandbox.Mover").unwrap();
        assert_eq!(class.field("speed").unwrap().field_type, ScriptFieldType::Float);
    }

    #[test]
    fn test_update_moves_entity() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        scripts.load_app_assembly(&path).unwrap();
        let (mut storage, entity, id) = storage_with_script();

        scripts.on_runtime_start();
        scripts.on_create_entity(&mut storage, entity);
        scripts.on_update_entity(&mut storage, entity, Timestep::from_seconds(0.5));

        let transform = storage.world.get_component::<TransformComponent>(entity).unwrap();
        assert!((transform.translation.x - 1.0).abs() < 1e-6);
        assert_eq!(scripts.instance(id).unwrap().field_value("steps").unwrap().as_int(), Ok(1));

        scripts.on_runtime_stop();
        assert_eq!(scripts.instance_count(), 0);
    }

    #[test]
    fn test_cached_field_applied_on_create() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        scripts.load_app_assembly(&path).unwrap();
        let (mut storage, entity, id) = storage_with_script();

        scripts
            .set_field_value(id, "Sandbox.Mover", "speed", &Dynamic::from_float(10.0))
            .unwrap();
        scripts.on_runtime_start();
        scripts.on_create_entity(&mut storage, entity);
        assert_eq!(scripts.instance(id).unwrap().field_value("speed").unwrap().as_float(), Ok(10.0));
    }

    #[test]
    fn test_field_errors() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        scripts.load_app_assembly(&path).unwrap();
        let id = PersistentId::new();

        assert!(matches!(
            scripts.set_field_value(id, "Sandbox.Nope", "speed", &Dynamic::from_float(1.0)),
            Err(ScriptError::ClassNotFound(_))
        ));
        assert!(matches!(
            scripts.set_field_value(id, "Sandbox.Mover", "nope", &Dynamic::from_float(1.0)),
            Err(ScriptError::FieldNotFound { .. })
        ));
        assert!(matches!(
            scripts.set_field_value(id, "Sandbox.Mover", "speed", &Dynamic::from_bool(true)),
            Err(ScriptError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_class_is_skipped() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        scripts.load_app_assembly(&path).unwrap();
        let (mut storage, entity, id) = storage_with_script();
        storage.world.get_component_mut::<ScriptComponent>(entity).unwrap().class_name = "Sandbox.Ghost".into();

        scripts.on_runtime_start();
        scripts.on_create_entity(&mut storage, entity);
        assert!(scripts.instance(id).is_none());
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        scripts.load_app_assembly(&path).unwrap();
        assert!(scripts.reload_assembly().is_ok());

        fs::write(path.join("Spinner.rhai"), "let rate = 1.0; fn on_update(ts) { }").unwrap();
        scripts.reload_assembly().unwrap();
        assert!(scripts.entity_class_exists("Sandbox.Spinner"));
        assert!(!scripts.reload_flag().load(Ordering::Acquire));
    }

    #[test]
    fn test_failed_core_reload_clears_pending_flag() {
        let (dir, path) = assembly(MOVER);
        let core = dir.path().join("core.rhai");
        fs::write(&core, CORE_SOURCE).unwrap();
        let config = ScriptingConfig {
            core_assembly_path: Some(core.clone()),
            ..ScriptingConfig::default()
        };
        let mut scripts = ScriptEngine::new(config).unwrap();
        scripts.load_app_assembly(&path).unwrap();

        fs::write(&core, "fn broken( {").unwrap();
        let flag = scripts.reload_flag();
        flag.store(true, Ordering::Release);
        assert!(matches!(scripts.reload_assembly(), Err(ScriptError::Compile { .. })));
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_compile_error_keeps_previous_classes() {
        let (_dir, path) = assembly(MOVER);
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        scripts.load_app_assembly(&path).unwrap();

        fs::write(path.join("Broken.rhai"), "fn on_update(ts) { let = ; }").unwrap();
        assert!(matches!(scripts.load_app_assembly(&path), Err(ScriptError::Compile { .. })));
        assert!(scripts.entity_class_exists("Sandbox.Mover"));
    }

    #[test]
    fn test_reload_without_assembly_fails() {
        let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
        assert!(matches!(scripts.reload_assembly(), Err(ScriptError::NoAppAssembly)));
    }
}
