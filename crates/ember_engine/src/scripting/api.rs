//! Native functions callable from scripts
//!
//! Every function reaches the scene through [`ScriptContext`]. The scene
//! storage is lent to the context for the duration of a script callback and
//! taken back afterwards, so these functions only see entities while a
//! callback is running.

use crate::ecs::components::{
    BodyType, CameraComponent, CircleCollider2DComponent, CircleRendererComponent, BoxCollider2DComponent,
    RigidBody2DComponent, ScriptComponent, SpriteRendererComponent, TextComponent, TransformComponent,
};
use crate::ecs::{Component, EntityId};
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::input::{InputState, KeyCode};
use crate::physics::simulated_body_mut;
use crate::scene::SceneStorage;
use crate::scripting::field::{EntityHandle, ScriptFieldType, TypedDefault};
use rapier2d::prelude::{RigidBody, RigidBodyType, Vector};
use rhai::{Dynamic, Engine, EvalAltResult, Module, FLOAT, INT};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Base module merged into every script class
pub const CORE_SOURCE: &str = include_str!("core.rhai");

type ApiResult<T> = Result<T, Box<EvalAltResult>>;

/// State shared between the script engine and its native functions
#[derive(Default)]
pub struct ScriptContext {
    pub(crate) storage: SceneStorage,
    pub(crate) running: bool,
    pub(crate) input: Option<Arc<dyn InputState>>,
}

/// Context handle captured by registered functions
pub type SharedContext = Rc<RefCell<ScriptContext>>;

impl ScriptContext {
    fn resolve(&self, handle: EntityHandle) -> ApiResult<EntityId> {
        if !self.running {
            return Err("no scene is running".into());
        }
        self.storage
            .entity_map
            .get(&handle.0)
            .copied()
            .ok_or_else(|| format!("entity {} does not exist", handle.0).into())
    }
}

fn component_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

fn with_component<T: Component, R>(
    context: &SharedContext,
    handle: EntityHandle,
    f: impl FnOnce(&mut T) -> R,
) -> ApiResult<R> {
    let mut context = context.borrow_mut();
    let entity = context.resolve(handle)?;
    context
        .storage
        .world
        .get_component_mut::<T>(entity)
        .map(f)
        .ok_or_else(|| format!("entity {} has no {}", handle.0, component_name::<T>()).into())
}

fn with_body<R>(context: &SharedContext, handle: EntityHandle, f: impl FnOnce(&mut RigidBody) -> R) -> ApiResult<R> {
    let mut context = context.borrow_mut();
    let entity = context.resolve(handle)?;
    let storage = &mut context.storage;
    simulated_body_mut(&storage.world, storage.physics.as_mut(), entity)
        .map(f)
        .map_err(|err| err.to_string().into())
}

fn has_component_named(storage: &SceneStorage, entity: EntityId, name: &str) -> ApiResult<bool> {
    let world = &storage.world;
    let present = match name {
        "TransformComponent" => world.has_component::<TransformComponent>(entity),
        "SpriteRendererComponent" => world.has_component::<SpriteRendererComponent>(entity),
        "CircleRendererComponent" => world.has_component::<CircleRendererComponent>(entity),
        "CameraComponent" => world.has_component::<CameraComponent>(entity),
        "ScriptComponent" => world.has_component::<ScriptComponent>(entity),
        "RigidBody2DComponent" => world.has_component::<RigidBody2DComponent>(entity),
        "BoxCollider2DComponent" => world.has_component::<BoxCollider2DComponent>(entity),
        "CircleCollider2DComponent" => world.has_component::<CircleCollider2DComponent>(entity),
        "TextComponent" => world.has_component::<TextComponent>(entity),
        other => return Err(format!("unknown component '{other}'").into()),
    };
    Ok(present)
}

/// Install every native function, type and constant module into `engine`
pub fn register_api(engine: &mut Engine, context: &SharedContext) {
    register_math(engine);
    register_field_constructors(engine);
    register_logging(engine);
    register_entity(engine, context);
    register_transform(engine, context);
    register_rigid_body(engine, context);
    register_renderers(engine, context);
    register_input(engine, context);
}

#[allow(clippy::cast_possible_truncation)]
fn register_math(engine: &mut Engine) {
    engine
        .register_type_with_name::<Vec2>("Vector2")
        .register_fn("vec2", |x: FLOAT, y: FLOAT| Vec2::new(x as f32, y as f32))
        .register_get_set("x", |v: &mut Vec2| FLOAT::from(v.x), |v: &mut Vec2, x: FLOAT| v.x = x as f32)
        .register_get_set("y", |v: &mut Vec2| FLOAT::from(v.y), |v: &mut Vec2, y: FLOAT| v.y = y as f32)
        .register_fn("+", |a: Vec2, b: Vec2| a + b)
        .register_fn("-", |a: Vec2, b: Vec2| a - b)
        .register_fn("*", |a: Vec2, s: FLOAT| a * s as f32)
        .register_fn("length", |v: &mut Vec2| FLOAT::from(v.norm()))
        .register_fn("to_string", |v: &mut Vec2| format!("Vector2({}, {})", v.x, v.y));

    engine
        .register_type_with_name::<Vec3>("Vector3")
        .register_fn("vec3", |x: FLOAT, y: FLOAT, z: FLOAT| Vec3::new(x as f32, y as f32, z as f32))
        .register_get_set("x", |v: &mut Vec3| FLOAT::from(v.x), |v: &mut Vec3, x: FLOAT| v.x = x as f32)
        .register_get_set("y", |v: &mut Vec3| FLOAT::from(v.y), |v: &mut Vec3, y: FLOAT| v.y = y as f32)
        .register_get_set("z", |v: &mut Vec3| FLOAT::from(v.z), |v: &mut Vec3, z: FLOAT| v.z = z as f32)
        .register_get_set("xy", |v: &mut Vec3| v.xy(), |v: &mut Vec3, xy: Vec2| {
            v.x = xy.x;
            v.y = xy.y;
        })
        .register_fn("+", |a: Vec3, b: Vec3| a + b)
        .register_fn("-", |a: Vec3, b: Vec3| a - b)
        .register_fn("*", |a: Vec3, s: FLOAT| a * s as f32)
        .register_fn("length", |v: &mut Vec3| FLOAT::from(v.norm()))
        .register_fn("to_string", |v: &mut Vec3| format!("Vector3({}, {}, {})", v.x, v.y, v.z));

    engine
        .register_type_with_name::<Vec4>("Vector4")
        .register_fn("vec4", |x: FLOAT, y: FLOAT, z: FLOAT, w: FLOAT| {
            Vec4::new(x as f32, y as f32, z as f32, w as f32)
        })
        .register_get_set("x", |v: &mut Vec4| FLOAT::from(v.x), |v: &mut Vec4, x: FLOAT| v.x = x as f32)
        .register_get_set("y", |v: &mut Vec4| FLOAT::from(v.y), |v: &mut Vec4, y: FLOAT| v.y = y as f32)
        .register_get_set("z", |v: &mut Vec4| FLOAT::from(v.z), |v: &mut Vec4, z: FLOAT| v.z = z as f32)
        .register_get_set("w", |v: &mut Vec4| FLOAT::from(v.w), |v: &mut Vec4, w: FLOAT| v.w = w as f32)
        .register_fn("+", |a: Vec4, b: Vec4| a + b)
        .register_fn("-", |a: Vec4, b: Vec4| a - b)
        .register_fn("*", |a: Vec4, s: FLOAT| a * s as f32)
        .register_fn("to_string", |v: &mut Vec4| format!("Vector4({}, {}, {}, {})", v.x, v.y, v.z, v.w));

    engine
        .register_type_with_name::<EntityHandle>("EntityHandle")
        .register_fn("entity", EntityHandle::none)
        .register_fn("is_valid", |handle: &mut EntityHandle| handle.is_valid())
        .register_fn("==", |a: EntityHandle, b: EntityHandle| a == b)
        .register_fn("!=", |a: EntityHandle, b: EntityHandle| a != b)
        .register_fn("to_string", |handle: &mut EntityHandle| handle.0.to_string());
}

#[allow(clippy::cast_possible_truncation)]
fn register_field_constructors(engine: &mut Engine) {
    engine.register_type_with_name::<TypedDefault>("TypedDefault");

    let integers = [
        ("byte", ScriptFieldType::Byte),
        ("sbyte", ScriptFieldType::SByte),
        ("ushort", ScriptFieldType::UShort),
        ("short", ScriptFieldType::Short),
        ("uint", ScriptFieldType::UInt),
        ("ulong", ScriptFieldType::ULong),
        ("long", ScriptFieldType::Long),
    ];
    for (name, field_type) in integers {
        engine.register_fn(name, move |value: INT| TypedDefault {
            field_type,
            value: Dynamic::from_int(value),
        });
    }

    for (name, field_type) in [("double", ScriptFieldType::Double), ("decimal", ScriptFieldType::Decimal)] {
        engine.register_fn(name, move |value: FLOAT| TypedDefault {
            field_type,
            value: Dynamic::from_float(value),
        });
    }

    engine.register_fn("color", |r: FLOAT, g: FLOAT, b: FLOAT, a: FLOAT| TypedDefault {
        field_type: ScriptFieldType::Color,
        value: Dynamic::from(Vec4::new(r as f32, g as f32, b as f32, a as f32)),
    });
}

fn register_logging(engine: &mut Engine) {
    engine.on_print(|text| log::info!("[script] {text}"));
    engine.on_debug(|text, source, position| {
        log::debug!("[script] {}{position:?} {text}", source.unwrap_or_default());
    });
    engine
        .register_fn("log", |text: &str| log::info!("[script] {text}"))
        .register_fn("log_warn", |text: &str| log::warn!("[script] {text}"))
        .register_fn("log_error", |text: &str| log::error!("[script] {text}"))
        .register_fn("native_log", |text: &str, parameter: INT| log::info!("{text}, {parameter}"))
        .register_fn("native_log_vector", |value: Vec3| {
            log::info!("Value: vec3({}, {}, {})", value.x, value.y, value.z);
        });
}

fn register_entity(engine: &mut Engine, context: &SharedContext) {
    let ctx = Rc::clone(context);
    engine.register_fn("entity_has_component", move |handle: EntityHandle, name: &str| -> ApiResult<bool> {
        let context = ctx.borrow();
        let entity = context.resolve(handle)?;
        has_component_named(&context.storage, entity, name)
    });

    let ctx = Rc::clone(context);
    engine.register_fn("entity_find_by_name", move |name: &str| -> ApiResult<EntityHandle> {
        let context = ctx.borrow();
        if !context.running {
            return Err("no scene is running".into());
        }
        Ok(context
            .storage
            .find_entity_by_name(name)
            .and_then(|entity| context.storage.persistent_id(entity))
            .map_or_else(EntityHandle::none, EntityHandle))
    });
}

fn register_transform(engine: &mut Engine, context: &SharedContext) {
    let ctx = Rc::clone(context);
    engine.register_fn("transform_get_translation", move |handle: EntityHandle| {
        with_component(&ctx, handle, |transform: &mut TransformComponent| transform.translation)
    });
    let ctx = Rc::clone(context);
    engine.register_fn("transform_set_translation", move |handle: EntityHandle, value: Vec3| {
        with_component(&ctx, handle, |transform: &mut TransformComponent| transform.translation = value)
    });

    let ctx = Rc::clone(context);
    engine.register_fn("transform_get_rotation", move |handle: EntityHandle| {
        with_component(&ctx, handle, |transform: &mut TransformComponent| transform.rotation)
    });
    let ctx = Rc::clone(context);
    engine.register_fn("transform_set_rotation", move |handle: EntityHandle, value: Vec3| {
        with_component(&ctx, handle, |transform: &mut TransformComponent| transform.rotation = value)
    });

    let ctx = Rc::clone(context);
    engine.register_fn("transform_get_scale", move |handle: EntityHandle| {
        with_component(&ctx, handle, |transform: &mut TransformComponent| transform.scale)
    });
    let ctx = Rc::clone(context);
    engine.register_fn("transform_set_scale", move |handle: EntityHandle, value: Vec3| {
        with_component(&ctx, handle, |transform: &mut TransformComponent| transform.scale = value)
    });
}

fn register_rigid_body(engine: &mut Engine, context: &SharedContext) {
    let ctx = Rc::clone(context);
    engine.register_fn(
        "rigidbody2d_apply_linear_impulse",
        move |handle: EntityHandle, impulse: Vec2, wake: bool| {
            with_body(&ctx, handle, |body| body.apply_impulse(Vector::new(impulse.x, impulse.y), wake))
        },
    );

    let ctx = Rc::clone(context);
    engine.register_fn("rigidbody2d_get_linear_velocity", move |handle: EntityHandle| {
        with_body(&ctx, handle, |body| {
            let velocity = body.linvel();
            Vec2::new(velocity.x, velocity.y)
        })
    });

    let ctx = Rc::clone(context);
    engine.register_fn("rigidbody2d_get_type", move |handle: EntityHandle| {
        with_component(&ctx, handle, |rigid_body: &mut RigidBody2DComponent| {
            rigid_body.body_type.as_str().to_string()
        })
    });

    let ctx = Rc::clone(context);
    engine.register_fn(
        "rigidbody2d_set_type",
        move |handle: EntityHandle, name: &str| -> ApiResult<()> {
            let body_type: BodyType = name.parse().map_err(|err: String| -> Box<EvalAltResult> { err.into() })?;
            with_component(&ctx, handle, |rigid_body: &mut RigidBody2DComponent| {
                rigid_body.body_type = body_type;
            })?;
            // A body only exists while the simulation runs
            let _ = with_body(&ctx, handle, |body| body.set_body_type(RigidBodyType::from(body_type), true));
            Ok(())
        },
    );
}

#[allow(clippy::cast_possible_truncation)]
fn register_renderers(engine: &mut Engine, context: &SharedContext) {
    let ctx = Rc::clone(context);
    engine.register_fn("sprite_renderer_get_color", move |handle: EntityHandle| {
        with_component(&ctx, handle, |sprite: &mut SpriteRendererComponent| sprite.color)
    });
    let ctx = Rc::clone(context);
    engine.register_fn("sprite_renderer_set_color", move |handle: EntityHandle, color: Vec4| {
        with_component(&ctx, handle, |sprite: &mut SpriteRendererComponent| sprite.color = color)
    });

    let ctx = Rc::clone(context);
    engine.register_fn("text_get_text", move |handle: EntityHandle| {
        with_component(&ctx, handle, |text: &mut TextComponent| text.text.clone())
    });
    let ctx = Rc::clone(context);
    engine.register_fn("text_set_text", move |handle: EntityHandle, value: &str| {
        with_component(&ctx, handle, |text: &mut TextComponent| text.text = value.to_string())
    });

    let ctx = Rc::clone(context);
    engine.register_fn("text_get_color", move |handle: EntityHandle| {
        with_component(&ctx, handle, |text: &mut TextComponent| text.color)
    });
    let ctx = Rc::clone(context);
    engine.register_fn("text_set_color", move |handle: EntityHandle, color: Vec4| {
        with_component(&ctx, handle, |text: &mut TextComponent| text.color = color)
    });

    let ctx = Rc::clone(context);
    engine.register_fn("text_get_kerning", move |handle: EntityHandle| {
        with_component(&ctx, handle, |text: &mut TextComponent| FLOAT::from(text.kerning))
    });
    let ctx = Rc::clone(context);
    engine.register_fn("text_set_kerning", move |handle: EntityHandle, kerning: FLOAT| {
        with_component(&ctx, handle, |text: &mut TextComponent| text.kerning = kerning as f32)
    });

    let ctx = Rc::clone(context);
    engine.register_fn("text_get_line_spacing", move |handle: EntityHandle| {
        with_component(&ctx, handle, |text: &mut TextComponent| FLOAT::from(text.line_spacing))
    });
    let ctx = Rc::clone(context);
    engine.register_fn("text_set_line_spacing", move |handle: EntityHandle, spacing: FLOAT| {
        with_component(&ctx, handle, |text: &mut TextComponent| text.line_spacing = spacing as f32)
    });
}

fn register_input(engine: &mut Engine, context: &SharedContext) {
    let mut keys = Module::new();
    for key in KeyCode::ALL {
        keys.set_var(key.script_name(), INT::from(key.code()));
    }
    engine.register_static_module("key", keys.into());

    let ctx = Rc::clone(context);
    engine.register_fn("input_is_key_down", move |key_code: INT| {
        let context = ctx.borrow();
        let Ok(code) = i32::try_from(key_code) else {
            return false;
        };
        context.input.as_ref().is_some_and(|input| input.is_key_down(code))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{IdComponent, TagComponent};
    use crate::foundation::id::PersistentId;
    use crate::input::KeyboardState;

    fn engine_with_context() -> (Engine, SharedContext) {
        let context = SharedContext::default();
        let mut engine = Engine::new();
        register_api(&mut engine, &context);
        (engine, context)
    }

    fn spawn(context: &SharedContext, name: &str) -> PersistentId {
        let mut context = context.borrow_mut();
        let storage = &mut context.storage;
        let id = PersistentId::new();
        let entity = storage.world.create_entity();
        storage.world.add_component(entity, IdComponent { id });
        storage.world.add_component(entity, TagComponent::new(name));
        storage.world.add_component(entity, TransformComponent::default());
        storage.entity_map.insert(id, entity);
        id
    }

    #[test]
    fn test_vector_math() {
        let (engine, _) = engine_with_context();
        let length: FLOAT = engine.eval("let v = vec2(3.0, 4.0); v.length()").unwrap();
        assert!((length - 5.0).abs() < 1e-6);

        let sum: Vec3 = engine.eval("vec3(1.0, 2.0, 3.0) + vec3(1.0, 1.0, 1.0) * 2.0").unwrap();
        assert_eq!(sum, Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_transform_access_requires_running_scene() {
        let (engine, context) = engine_with_context();
        let id = spawn(&context, "Player");
        let mut scope = rhai::Scope::new();
        scope.push("player", EntityHandle(id));

        let result = engine.run_with_scope(&mut scope, "transform_set_translation(player, vec3(1.0, 2.0, 0.0));");
        assert!(result.is_err());

        context.borrow_mut().running = true;
        engine
            .run_with_scope(&mut scope, "transform_set_translation(player, vec3(1.0, 2.0, 0.0));")
            .unwrap();
        let context = context.borrow();
        let entity = context.storage.entity_map[&id];
        let transform = context.storage.world.get_component::<TransformComponent>(entity).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_find_entity_by_name() {
        let (engine, context) = engine_with_context();
        let id = spawn(&context, "Camera");
        context.borrow_mut().running = true;

        let found: EntityHandle = engine.eval(r#"entity_find_by_name("Camera")"#).unwrap();
        assert_eq!(found.0, id);
        let missing: bool = engine.eval(r#"entity_find_by_name("Nobody").is_valid()"#).unwrap();
        assert!(!missing);
    }

    #[test]
    fn test_has_component_by_name() {
        let (engine, context) = engine_with_context();
        let id = spawn(&context, "Box");
        context.borrow_mut().running = true;
        let mut scope = rhai::Scope::new();
        scope.push("target", EntityHandle(id));

        let has_transform: bool = engine
            .eval_with_scope(&mut scope, r#"entity_has_component(target, "TransformComponent")"#)
            .unwrap();
        let has_body: bool = engine
            .eval_with_scope(&mut scope, r#"entity_has_component(target, "RigidBody2DComponent")"#)
            .unwrap();
        assert!(has_transform);
        assert!(!has_body);
        assert!(engine
            .eval_with_scope::<bool>(&mut scope, r#"entity_has_component(target, "Mesh")"#)
            .is_err());
    }

    #[test]
    fn test_key_queries() {
        let (engine, context) = engine_with_context();
        let keyboard = Arc::new(KeyboardState::new());
        keyboard.set_key(KeyCode::W, true);
        context.borrow_mut().input = Some(keyboard);

        assert!(engine.eval::<bool>("input_is_key_down(key::W)").unwrap());
        assert!(!engine.eval::<bool>("input_is_key_down(key::S)").unwrap());
    }

    #[test]
    fn test_typed_constructors() {
        let (engine, _) = engine_with_context();
        let typed: TypedDefault = engine.eval("byte(7)").unwrap();
        assert_eq!(typed.field_type, ScriptFieldType::Byte);
        assert_eq!(typed.value.as_int(), Ok(7));
    }
}
