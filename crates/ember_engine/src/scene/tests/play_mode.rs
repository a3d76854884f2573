//! Play mode: copies, transitions, physics and scripts over several frames

use crate::core::config::ScriptingConfig;
use crate::ecs::components::{
    BodyType, BoxCollider2DComponent, CameraComponent, RigidBody2DComponent, ScriptComponent, SpriteRendererComponent,
    TransformComponent,
};
use crate::ecs::EntityId;
use crate::foundation::math::Vec4;
use crate::foundation::time::Timestep;
use crate::render::{HeadlessBackend, Renderer2D};
use crate::scene::{EditorSession, Scene, SceneError, SceneState};
use crate::scripting::{Dynamic, ScriptEngine};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const FRAME: f32 = 1.0 / 60.0;

const CLIMBER: &str = r"
    let speed = 1.0;

    fn on_update(ts) {
        let position = this.get_translation();
        position.y += this.speed * ts;
        this.set_translation(position);
    }
";

fn services() -> (ScriptEngine, Renderer2D) {
    (
        ScriptEngine::new(ScriptingConfig::default()).unwrap(),
        Renderer2D::new(Box::new(HeadlessBackend::new())).unwrap(),
    )
}

fn write_assembly(dir: &Path, source: &str) -> PathBuf {
    let assembly = dir.join("Game");
    fs::create_dir_all(&assembly).unwrap();
    fs::write(assembly.join("Climber.rhai"), source).unwrap();
    assembly
}

fn height(scene: &Scene, entity: EntityId) -> f32 {
    scene
        .world()
        .get_component::<TransformComponent>(entity)
        .unwrap()
        .translation
        .y
}

#[test]
fn test_edits_to_the_play_copy_do_not_leak() {
    let (mut scripts, _) = services();
    let mut session = EditorSession::default();
    let crate_entity = session.edit_scene_mut().create_entity("Crate");
    session
        .edit_scene_mut()
        .world_mut()
        .add_component(crate_entity, SpriteRendererComponent::with_color(Vec4::new(1.0, 1.0, 1.0, 1.0)));

    session.play(&mut scripts).unwrap();
    {
        let runtime = session.active_scene_mut();
        let sprite = runtime
            .world_mut()
            .get_component_mut::<SpriteRendererComponent>(crate_entity)
            .unwrap();
        sprite.color = Vec4::new(1.0, 0.0, 0.0, 1.0);
        runtime.create_entity("Spawned");
        runtime.destroy_entity(crate_entity);
    }
    session.stop(&mut scripts).unwrap();

    let edit = session.edit_scene();
    assert_eq!(edit.world().entity_count(), 1);
    assert!(edit.find_entity_by_name("Spawned").is_none());
    assert_eq!(
        edit.world()
            .get_component::<SpriteRendererComponent>(crate_entity)
            .unwrap()
            .color,
        Vec4::new(1.0, 1.0, 1.0, 1.0)
    );
}

#[test]
fn test_copy_keeps_persistent_ids() {
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..5)
        .map(|index| {
            let entity = scene.create_entity(&format!("E{index}"));
            scene.storage().persistent_id(entity).unwrap()
        })
        .collect();

    let copy = Scene::copy(&scene);
    assert_eq!(copy.world().entity_count(), 5);
    for id in ids {
        let original = scene.get_entity_by_id(id).unwrap();
        let copied = copy.get_entity_by_id(id).unwrap();
        assert_eq!(scene.entity(original).name(), copy.entity(copied).name());
    }
}

#[test]
fn test_copy_is_independent_of_later_source_edits() {
    let mut source = Scene::new();
    let crate_entity = source.create_entity("Crate");
    let keeper = source.create_entity("Keeper");
    source
        .world_mut()
        .add_component(crate_entity, SpriteRendererComponent::with_color(Vec4::new(1.0, 1.0, 1.0, 1.0)));
    let crate_id = source.storage().persistent_id(crate_entity).unwrap();
    let keeper_id = source.storage().persistent_id(keeper).unwrap();

    let copy = Scene::copy(&source);

    source
        .world_mut()
        .get_component_mut::<SpriteRendererComponent>(crate_entity)
        .unwrap()
        .color = Vec4::new(0.0, 0.0, 1.0, 1.0);
    source
        .world_mut()
        .get_component_mut::<TransformComponent>(keeper)
        .unwrap()
        .translation
        .y = 42.0;
    source.create_entity("Late");
    source.destroy_entity(crate_entity);

    assert_eq!(copy.world().entity_count(), 2);
    assert!(copy.find_entity_by_name("Late").is_none());
    let copied_crate = copy.get_entity_by_id(crate_id).unwrap();
    assert_eq!(
        copy.world()
            .get_component::<SpriteRendererComponent>(copied_crate)
            .unwrap()
            .color,
        Vec4::new(1.0, 1.0, 1.0, 1.0)
    );
    assert_eq!(height(&copy, copy.get_entity_by_id(keeper_id).unwrap()), 0.0);
}

#[test]
fn test_paused_scene_advances_only_the_stepped_frames() {
    let (mut scripts, mut renderer) = services();
    let mut scene = Scene::new();
    let ball = scene.create_entity("Ball");
    scene
        .world_mut()
        .add_component(ball, RigidBody2DComponent::new(BodyType::Dynamic));
    scene.world_mut().add_component(ball, BoxCollider2DComponent::default());

    scene.on_runtime_start(&mut scripts).unwrap();
    scene.set_paused(true);
    scene.on_update_runtime(Timestep::from_seconds(FRAME), &mut scripts, &mut renderer);
    assert_eq!(height(&scene, ball), 0.0);

    scene.step(3);
    let mut moves = 0;
    let mut previous = height(&scene, ball);
    for _ in 0..5 {
        scene.on_update_runtime(Timestep::from_seconds(FRAME), &mut scripts, &mut renderer);
        let current = height(&scene, ball);
        if current != previous {
            moves += 1;
        }
        previous = current;
    }
    assert_eq!(moves, 3);
    scene.on_runtime_stop(&mut scripts).unwrap();
}

#[test]
fn test_each_start_needs_its_matching_stop() {
    let (mut scripts, _) = services();
    let mut scene = Scene::new();

    scene.on_runtime_start(&mut scripts).unwrap();
    assert_eq!(scene.state(), SceneState::Runtime);
    assert!(matches!(
        scene.on_simulation_start(),
        Err(SceneError::InvalidTransition {
            from: SceneState::Runtime,
            to: SceneState::Simulate
        })
    ));
    assert!(matches!(
        scene.on_simulation_stop(),
        Err(SceneError::InvalidTransition { .. })
    ));
    assert_eq!(scene.state(), SceneState::Runtime);

    scene.on_runtime_stop(&mut scripts).unwrap();
    assert_eq!(scene.state(), SceneState::Edit);
    scene.on_simulation_start().unwrap();
    assert!(matches!(
        scene.on_runtime_stop(&mut scripts),
        Err(SceneError::InvalidTransition {
            from: SceneState::Simulate,
            to: SceneState::Edit
        })
    ));
    scene.on_simulation_stop().unwrap();
    assert_eq!(scene.state(), SceneState::Edit);
}

#[test]
fn test_dynamic_body_keeps_falling() {
    let (mut scripts, mut renderer) = services();
    let mut scene = Scene::new();

    let ground = scene.create_entity("Ground");
    scene
        .world_mut()
        .get_component_mut::<TransformComponent>(ground)
        .unwrap()
        .translation
        .y = -100.0;
    scene
        .world_mut()
        .add_component(ground, RigidBody2DComponent::new(BodyType::Static));
    scene.world_mut().add_component(ground, BoxCollider2DComponent::default());

    let ball = scene.create_entity("Ball");
    scene
        .world_mut()
        .add_component(ball, RigidBody2DComponent::new(BodyType::Dynamic));
    scene.world_mut().add_component(ball, BoxCollider2DComponent::default());

    scene.on_runtime_start(&mut scripts).unwrap();
    let mut previous = height(&scene, ball);
    for _ in 0..30 {
        scene.on_update_runtime(Timestep::from_seconds(FRAME), &mut scripts, &mut renderer);
        let current = height(&scene, ball);
        assert!(current < previous, "{current} should be below {previous}");
        previous = current;
    }
    assert_eq!(height(&scene, ground), -100.0);
    scene.on_runtime_stop(&mut scripts).unwrap();
}

#[test]
fn test_simulation_draws_through_the_editor_camera() {
    let (mut scripts, mut renderer) = services();
    let mut session = EditorSession::default();
    let scene = session.edit_scene_mut();
    let camera = scene.create_entity("Camera");
    scene.world_mut().add_component(camera, CameraComponent::default());
    let sprite = scene.create_entity("Sprite");
    scene
        .world_mut()
        .add_component(sprite, SpriteRendererComponent::default());

    session.simulate(&mut scripts).unwrap();
    session.on_update(Timestep::from_seconds(FRAME), &mut scripts, &mut renderer);
    assert_eq!(renderer.stats().quad_count, 1);
    assert_eq!(renderer.stats().draw_calls, 1);
}

#[test]
fn test_entity_ids_are_unique_and_destroy_clears_components() {
    let mut scene = Scene::new();
    let mut seen = HashSet::new();
    let mut doomed = Vec::new();
    for index in 0..64 {
        let entity = scene.create_entity("");
        assert!(seen.insert(entity));
        if index % 2 == 0 {
            doomed.push(entity);
        }
    }
    for entity in &doomed {
        assert!(scene.destroy_entity(*entity));
    }
    for _ in 0..32 {
        let entity = scene.create_entity("Late");
        assert!(seen.insert(entity), "{entity} was handed out twice");
    }
    for entity in doomed {
        assert!(!scene.world().has_component::<TransformComponent>(entity));
        assert!(!scene.destroy_entity(entity));
    }
    assert_eq!(scene.world().entity_count(), 64);
}

#[test]
fn test_script_field_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let assembly = write_assembly(dir.path(), CLIMBER);
    let (mut scripts, mut renderer) = services();
    scripts.load_app_assembly(&assembly).unwrap();

    let mut session = EditorSession::default();
    let climber = session.edit_scene_mut().create_entity("Climber");
    session
        .edit_scene_mut()
        .world_mut()
        .add_component(climber, ScriptComponent::new("Game.Climber"));
    let id = session.edit_scene().storage().persistent_id(climber).unwrap();
    scripts
        .set_field_value(id, "Game.Climber", "speed", &Dynamic::from_float(6.0))
        .unwrap();

    fs::write(
        assembly.join("Climber.rhai"),
        CLIMBER.replace("position.y += this.speed * ts;", "position.y += this.speed * ts * 2.0;"),
    )
    .unwrap();
    scripts.reload_assembly().unwrap();
    assert_eq!(scripts.field_map(id).unwrap()["speed"].get_value::<f32>(), 6.0);

    session.play(&mut scripts).unwrap();
    session.on_update(Timestep::from_seconds(0.5), &mut scripts, &mut renderer);
    assert!((height(session.active_scene(), climber) - 6.0).abs() < 1e-4);
    session.stop(&mut scripts).unwrap();
    assert_eq!(height(session.edit_scene(), climber), 0.0);
}
