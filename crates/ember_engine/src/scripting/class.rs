//! Script classes and their instances
//!
//! A class is one compiled script file merged with the base module. An
//! instance is an object map holding the entity handle (`id`) and one entry
//! per top-level binding; callbacks run with the map bound to `this`. Only
//! public bindings are reflected as fields.

use crate::foundation::id::PersistentId;
use crate::scripting::field::{infer_field, EntityHandle, ScriptField, ScriptFieldInstance, ScriptFieldType};
use crate::scripting::{ScriptError, ScriptResult};
use rhai::{CallFnOptions, Dynamic, Engine, FuncArgs, Map, Scope, AST, FLOAT};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Name of the creation callback
pub const ON_CREATE: &str = "on_create";
/// Name of the per-frame callback, taking the timestep in seconds
pub const ON_UPDATE: &str = "on_update";

/// A discovered entity class
#[derive(Debug, Clone)]
pub struct ScriptClass {
    namespace: String,
    name: String,
    ast: AST,
    fields: BTreeMap<String, ScriptField>,
    defaults: BTreeMap<String, Dynamic>,
    private_members: BTreeMap<String, Dynamic>,
    has_on_create: bool,
    has_on_update: bool,
}

impl ScriptClass {
    /// Compile a class and reflect its public fields
    ///
    /// Returns `Ok(None)` when the source defines neither callback and is
    /// therefore not an entity class.
    pub fn compile(engine: &Engine, core: &AST, namespace: &str, name: &str, source: &str) -> ScriptResult<Option<Self>> {
        let full_name = format!("{namespace}.{name}");
        let class_ast = engine.compile(source).map_err(|err| ScriptError::Compile {
            class: full_name.clone(),
            message: err.to_string(),
        })?;

        let has_function = |function: &str, arity: usize| {
            class_ast
                .iter_functions()
                .any(|metadata| metadata.name == function && metadata.params.len() == arity)
        };
        let has_on_create = has_function(ON_CREATE, 0);
        let has_on_update = has_function(ON_UPDATE, 1);
        if !has_on_create && !has_on_update {
            return Ok(None);
        }

        let ast = core.merge(&class_ast);

        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| ScriptError::Evaluation {
                class: full_name.clone(),
                message: err.to_string(),
            })?;

        let mut fields = BTreeMap::new();
        let mut defaults = BTreeMap::new();
        let mut private_members = BTreeMap::new();
        for (field_name, is_constant, value) in scope.iter() {
            if field_name == "id" {
                continue;
            }
            if is_constant || field_name.starts_with('_') {
                private_members.insert(field_name.to_string(), infer_field(&value).1);
                continue;
            }
            let (field_type, default) = infer_field(&value);
            log::debug!("    {field_name} ({field_type})");
            fields.insert(field_name.to_string(), ScriptField::new(field_name, field_type));
            defaults.insert(field_name.to_string(), default);
        }

        log::info!("{full_name} has {} public field(s)", fields.len());
        Ok(Some(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ast,
            fields,
            defaults,
            private_members,
            has_on_create,
            has_on_update,
        }))
    }

    /// `<namespace>.<name>`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Namespace (the assembly name)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Class name without namespace
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public fields by name
    pub const fn fields(&self) -> &BTreeMap<String, ScriptField> {
        &self.fields
    }

    /// Look up a public field
    pub fn field(&self, name: &str) -> Option<&ScriptField> {
        self.fields.get(name)
    }

    /// Value a fresh instance starts with
    pub fn default_value(&self, name: &str) -> Option<&Dynamic> {
        self.defaults.get(name)
    }

    /// Compiled class merged with the base module
    pub const fn ast(&self) -> &AST {
        &self.ast
    }
}

/// Check `value` against a field and return it in canonical script form
pub(crate) fn coerce_field_value(field: &ScriptField, value: &Dynamic) -> Option<Dynamic> {
    match field.field_type {
        ScriptFieldType::None => Some(value.clone()),
        ScriptFieldType::String => value.is_string().then(|| value.clone()),
        _ => {
            let mut slot = ScriptFieldInstance::new(field.clone());
            if slot.set_from_dynamic(value) {
                slot.to_dynamic()
            } else {
                None
            }
        }
    }
}

/// One live script object bound to an entity
#[derive(Debug)]
pub struct ScriptInstance {
    class: Rc<ScriptClass>,
    this: Dynamic,
}

impl ScriptInstance {
    /// Create an instance with default field values
    pub fn new(class: Rc<ScriptClass>, entity_id: PersistentId) -> Self {
        let mut map = Map::new();
        map.insert("id".into(), Dynamic::from(EntityHandle(entity_id)));
        for (name, value) in class.private_members.iter().chain(&class.defaults) {
            map.insert(name.as_str().into(), value.clone());
        }
        Self {
            class,
            this: Dynamic::from_map(map),
        }
    }

    /// Class of this instance
    pub fn class(&self) -> &ScriptClass {
        &self.class
    }

    /// Current value of a public field
    pub fn field_value(&self, name: &str) -> Option<Dynamic> {
        self.class.field(name)?;
        self.this.read_lock::<Map>()?.get(name).cloned()
    }

    /// Assign a public field; the value is checked against the field kind
    pub fn set_field_value(&mut self, name: &str, value: &Dynamic) -> bool {
        let Some(coerced) = self.class.field(name).and_then(|field| coerce_field_value(field, value)) else {
            return false;
        };
        self.this
            .write_lock::<Map>()
            .map(|mut map| map.insert(name.into(), coerced))
            .is_some()
    }

    /// Invoke the creation callback if the class defines one
    pub fn invoke_on_create(&mut self, engine: &Engine) -> ScriptResult<()> {
        if self.class.has_on_create {
            self.invoke(engine, ON_CREATE, ())?;
        }
        Ok(())
    }

    /// Invoke the per-frame callback if the class defines one
    pub fn invoke_on_update(&mut self, engine: &Engine, seconds: f32) -> ScriptResult<()> {
        if self.class.has_on_update {
            self.invoke(engine, ON_UPDATE, (FLOAT::from(seconds),))?;
        }
        Ok(())
    }

    fn invoke(&mut self, engine: &Engine, function: &str, args: impl FuncArgs) -> ScriptResult<()> {
        let mut scope = Scope::new();
        let options = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .bind_this_ptr(&mut self.this);
        engine
            .call_fn_with_options::<Dynamic>(options, &mut scope, &self.class.ast, function, args)
            .map(|_| ())
            .map_err(|err| ScriptError::Runtime {
                class: self.class.full_name(),
                function: function.to_string(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: &str = r"
        let speed = 2.5;
        let jumps = byte(3);
        let _cooldown = 0.0;
        const GRAVITY = 9.8;

        fn on_create() {
            this.jumps = 0;
        }

        fn on_update(ts) {
            this._cooldown += ts;
            this.speed += ts * this.GRAVITY / 9.8;
        }
    ";

    fn compile(source: &str) -> Option<ScriptClass> {
        let mut engine = Engine::new();
        crate::scripting::api::register_api(&mut engine, &Default::default());
        let core = engine.compile(crate::scripting::api::CORE_SOURCE).unwrap();
        ScriptClass::compile(&engine, &core, "Sandbox", "Player", source).unwrap()
    }

    #[test]
    fn test_public_fields_reflected() {
        let class = compile(PLAYER).unwrap();
        assert_eq!(class.full_name(), "Sandbox.Player");
        assert_eq!(class.fields().len(), 2);
        assert_eq!(class.field("speed").unwrap().field_type, ScriptFieldType::Float);
        assert_eq!(class.field("jumps").unwrap().field_type, ScriptFieldType::Byte);
        assert!(class.field("_cooldown").is_none());
        assert!(class.field("GRAVITY").is_none());
    }

    #[test]
    fn test_non_entity_source_skipped() {
        assert!(compile("fn helper(x) { x * 2 }").is_none());
    }

    #[test]
    fn test_callbacks_mutate_instance() {
        let mut engine = Engine::new();
        crate::scripting::api::register_api(&mut engine, &Default::default());
        let core = engine.compile(crate::scripting::api::CORE_SOURCE).unwrap();
        let class = ScriptClass::compile(&engine, &core, "Sandbox", "Player", PLAYER)
            .unwrap()
            .unwrap();

        let mut instance = ScriptInstance::new(Rc::new(class), PersistentId::new());
        instance.invoke_on_create(&engine).unwrap();
        assert_eq!(instance.field_value("jumps").unwrap().as_int(), Ok(0));

        instance.invoke_on_update(&engine, 0.5).unwrap();
        assert_eq!(instance.field_value("speed").unwrap().as_float(), Ok(3.0));
    }

    #[test]
    fn test_field_assignment_is_type_checked() {
        let class = compile(PLAYER).unwrap();
        let mut instance = ScriptInstance::new(Rc::new(class), PersistentId::new());
        assert!(instance.set_field_value("speed", &Dynamic::from_int(4)));
        assert_eq!(instance.field_value("speed").unwrap().as_float(), Ok(4.0));
        assert!(!instance.set_field_value("jumps", &Dynamic::from_int(999)));
        assert!(!instance.set_field_value("missing", &Dynamic::from_int(1)));
    }
}
