//! Scene documents written and read back

use crate::core::config::ScriptingConfig;
use crate::ecs::components::{
    BodyType, BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent, CircleRendererComponent,
    RigidBody2DComponent, ScriptComponent, SpriteRendererComponent, TagComponent, TextComponent, TransformComponent,
};
use crate::foundation::id::PersistentId;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::scene::{ProjectionType, Scene, SceneSerializer};
use crate::scripting::{Dynamic, ScriptEngine};
use approx::assert_relative_eq;
use std::fs;
use std::path::PathBuf;

const BALL: &str = r"
    let speed = 2.0;
    let jump = double(4.0);
    let hits = 0;

    fn on_update(ts) { }
";

fn scripts_with_ball() -> (tempfile::TempDir, ScriptEngine) {
    let dir = tempfile::tempdir().unwrap();
    let assembly: PathBuf = dir.path().join("Game");
    fs::create_dir(&assembly).unwrap();
    fs::write(assembly.join("Ball.rhai"), BALL).unwrap();

    let mut scripts = ScriptEngine::new(ScriptingConfig::default()).unwrap();
    scripts.load_app_assembly(&assembly).unwrap();
    (dir, scripts)
}

fn authored_scene(scripts: &mut ScriptEngine) -> (Scene, PersistentId, PersistentId) {
    let mut scene = Scene::new();
    scene.set_name("Round Trip");

    let camera = scene.create_entity("Camera");
    let mut camera_component = CameraComponent {
        primary: false,
        fixed_aspect_ratio: true,
        ..CameraComponent::default()
    };
    camera_component.camera.set_orthographic(7.5, -2.0, 3.0);
    scene.world_mut().add_component(camera, camera_component);

    let ball = scene.create_entity("Ball");
    {
        let mut entity = scene.entity_mut(ball);
        let transform = entity.get_mut::<TransformComponent>();
        transform.translation = Vec3::new(1.25, -3.5, 0.125);
        transform.rotation = Vec3::new(0.0, 0.0, 0.785_398);
        transform.scale = Vec3::new(2.0, 0.5, 1.0);
        entity.add(CircleRendererComponent {
            color: Vec4::new(0.1, 0.2, 0.3, 0.4),
            thickness: 0.6,
            fade: 0.02,
        });
        entity.add(RigidBody2DComponent {
            fixed_rotation: true,
            ..RigidBody2DComponent::new(BodyType::Kinematic)
        });
        let collider = entity.add(CircleCollider2DComponent::default());
        collider.offset = Vec2::new(0.25, -0.25);
        collider.radius = 0.75;
        collider.material.restitution = 0.9;
        entity.add(ScriptComponent::new("Game.Ball"));
    }

    let wall = scene.create_entity("Wall");
    {
        let mut entity = scene.entity_mut(wall);
        let sprite = entity.add(SpriteRendererComponent::with_color(Vec4::new(0.5, 0.5, 0.5, 1.0)));
        sprite.tiling_factor = 3.0;
        entity.add(RigidBody2DComponent::new(BodyType::Static));
        let collider = entity.add(BoxCollider2DComponent::default());
        collider.size = Vec2::new(4.0, 0.25);
        collider.material.friction = 0.1;
        entity.add(TextComponent {
            text: "Keep out".to_string(),
            kerning: 0.05,
            line_spacing: 1.5,
            ..TextComponent::default()
        });
    }

    let ball_id = scene.storage().persistent_id(ball).unwrap();
    let wall_id = scene.storage().persistent_id(wall).unwrap();
    scripts
        .set_field_value(ball_id, "Game.Ball", "speed", &Dynamic::from_float(7.5))
        .unwrap();
    scripts
        .set_field_value(ball_id, "Game.Ball", "jump", &Dynamic::from_float(-1.5))
        .unwrap();
    (scene, ball_id, wall_id)
}

#[test]
fn test_every_component_survives_a_round_trip() {
    let (_dir, mut scripts) = scripts_with_ball();
    let (mut scene, ball_id, wall_id) = authored_scene(&mut scripts);
    let text = SceneSerializer::new(&mut scene)
        .with_scripts(&mut scripts)
        .serialize_to_string()
        .unwrap();

    let (_dir, mut fresh_scripts) = scripts_with_ball();
    let mut restored = Scene::new();
    SceneSerializer::new(&mut restored)
        .with_scripts(&mut fresh_scripts)
        .deserialize_str(&text)
        .unwrap();

    assert_eq!(restored.name(), "Round Trip");
    assert_eq!(restored.world().entity_count(), 3);
    let world = restored.world();

    let camera = restored.find_entity_by_name("Camera").unwrap();
    let camera = world.get_component::<CameraComponent>(camera).unwrap();
    assert!(!camera.primary);
    assert!(camera.fixed_aspect_ratio);
    assert_eq!(camera.camera.projection_type(), ProjectionType::Orthographic);
    assert_relative_eq!(camera.camera.orthographic_size(), 7.5, epsilon = 1e-5);
    assert_relative_eq!(camera.camera.orthographic_near(), -2.0, epsilon = 1e-5);
    assert_relative_eq!(camera.camera.orthographic_far(), 3.0, epsilon = 1e-5);

    let ball = restored.get_entity_by_id(ball_id).unwrap();
    assert_eq!(world.get_component::<TagComponent>(ball).unwrap().tag, "Ball");
    let transform = world.get_component::<TransformComponent>(ball).unwrap();
    assert_relative_eq!(transform.translation, Vec3::new(1.25, -3.5, 0.125), epsilon = 1e-5);
    assert_relative_eq!(transform.rotation, Vec3::new(0.0, 0.0, 0.785_398), epsilon = 1e-5);
    assert_relative_eq!(transform.scale, Vec3::new(2.0, 0.5, 1.0), epsilon = 1e-5);

    let circle = world.get_component::<CircleRendererComponent>(ball).unwrap();
    assert_relative_eq!(circle.color, Vec4::new(0.1, 0.2, 0.3, 0.4), epsilon = 1e-5);
    assert_relative_eq!(circle.thickness, 0.6, epsilon = 1e-5);
    assert_relative_eq!(circle.fade, 0.02, epsilon = 1e-5);

    let body = world.get_component::<RigidBody2DComponent>(ball).unwrap();
    assert_eq!(body.body_type, BodyType::Kinematic);
    assert!(body.fixed_rotation);
    assert!(body.runtime_body.is_none());

    let collider = world.get_component::<CircleCollider2DComponent>(ball).unwrap();
    assert_relative_eq!(collider.offset, Vec2::new(0.25, -0.25), epsilon = 1e-5);
    assert_relative_eq!(collider.radius, 0.75, epsilon = 1e-5);
    assert_relative_eq!(collider.material.restitution, 0.9, epsilon = 1e-5);
    assert_eq!(world.get_component::<ScriptComponent>(ball).unwrap().class_name, "Game.Ball");

    let wall = restored.get_entity_by_id(wall_id).unwrap();
    let sprite = world.get_component::<SpriteRendererComponent>(wall).unwrap();
    assert_relative_eq!(sprite.tiling_factor, 3.0, epsilon = 1e-5);
    assert!(sprite.texture.is_none());
    let collider = world.get_component::<BoxCollider2DComponent>(wall).unwrap();
    assert_relative_eq!(collider.size, Vec2::new(4.0, 0.25), epsilon = 1e-5);
    assert_relative_eq!(collider.material.friction, 0.1, epsilon = 1e-5);
    let label = world.get_component::<TextComponent>(wall).unwrap();
    assert_eq!(label.text, "Keep out");
    assert_relative_eq!(label.kerning, 0.05, epsilon = 1e-5);
    assert_relative_eq!(label.line_spacing, 1.5, epsilon = 1e-5);

    let fields = fresh_scripts.field_map(ball_id).unwrap();
    assert_relative_eq!(fields["speed"].get_value::<f32>(), 7.5, epsilon = 1e-5);
    assert_relative_eq!(fields["jump"].get_value::<f64>(), -1.5, epsilon = 1e-5);
    assert!(!fields.contains_key("hits"));
}

#[test]
fn test_saved_document_reads_back_identically() {
    let (_dir, mut scripts) = scripts_with_ball();
    let (mut scene, _, _) = authored_scene(&mut scripts);
    let first = SceneSerializer::new(&mut scene)
        .with_scripts(&mut scripts)
        .serialize_to_string()
        .unwrap();

    let mut restored = Scene::new();
    SceneSerializer::new(&mut restored)
        .with_scripts(&mut scripts)
        .deserialize_str(&first)
        .unwrap();
    let second = SceneSerializer::new(&mut restored)
        .with_scripts(&mut scripts)
        .serialize_to_string()
        .unwrap();

    assert_eq!(first.lines().count(), second.lines().count());
    assert!(second.starts_with("Scene: Round Trip"));
}
