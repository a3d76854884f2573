//! Sandbox demo application
//!
//! Builds a small physics playground, plays it headless for a fixed number of
//! frames and logs what the renderer was asked to draw.
//!
//! ```text
//! sandbox [frames] [scene-output.ember]
//! ```

use ember_engine::assets::ImageData;
use ember_engine::config::Config;
use ember_engine::foundation::logging;
use ember_engine::foundation::time::Timer;
use ember_engine::prelude::*;
use ember_engine::render::Font;
use ember_engine::scripting::{Dynamic, NativeScriptContext};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_FRAMES: u64 = 240;
const BALL_COUNT: usize = 24;

/// Breathes its entity's scale in and out
#[derive(Default)]
struct Pulse {
    elapsed: f32,
}

impl ScriptableEntity for Pulse {
    fn on_create(&mut self, context: &mut NativeScriptContext<'_>) {
        log::info!("Pulse attached to {}", context.entity());
    }

    fn on_update(&mut self, context: &mut NativeScriptContext<'_>, ts: Timestep) {
        self.elapsed += ts.seconds();
        let scale = 1.0 + 0.25 * (self.elapsed * 3.0).sin();
        if let Some(transform) = context.get_component_mut::<TransformComponent>() {
            transform.scale = Vec3::new(scale, scale, 1.0);
        }
    }
}

struct SandboxLayer {
    save_path: Option<PathBuf>,
    frame: u64,
    timer: Timer,
}

impl SandboxLayer {
    fn build_scene(scene: &mut Scene) {
        let mut rng = rand::thread_rng();

        let camera = scene.create_entity("Camera");
        let mut camera_component = CameraComponent::default();
        camera_component.camera.set_orthographic(24.0, -1.0, 1.0);
        scene.world_mut().add_component(camera, camera_component);

        let ground = scene.create_entity("Ground");
        {
            let mut entity = scene.entity_mut(ground);
            let transform = entity.get_mut::<TransformComponent>();
            transform.translation = Vec3::new(0.0, -8.0, 0.0);
            transform.scale = Vec3::new(30.0, 1.0, 1.0);
            entity.add(SpriteRendererComponent::with_color(Vec4::new(0.3, 0.3, 0.35, 1.0)));
            entity.add(RigidBody2DComponent::new(BodyType::Static));
            entity.add(BoxCollider2DComponent::default());
        }

        for index in 0..BALL_COUNT {
            let ball = scene.create_entity(&format!("Ball {index}"));
            let mut entity = scene.entity_mut(ball);
            entity.get_mut::<TransformComponent>().translation =
                Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(0.0..12.0), 0.0);
            entity.add(CircleRendererComponent {
                color: Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0),
                ..CircleRendererComponent::default()
            });
            entity.add(RigidBody2DComponent::new(BodyType::Dynamic));
            entity.add(CircleCollider2DComponent::default());
        }

        let player = scene.create_entity("Player");
        {
            let mut entity = scene.entity_mut(player);
            entity.get_mut::<TransformComponent>().translation = Vec3::new(0.0, 4.0, 0.0);
            entity.add(SpriteRendererComponent::with_color(Vec4::new(0.9, 0.4, 0.2, 1.0)));
            entity.add(RigidBody2DComponent::new(BodyType::Dynamic));
            entity.add(BoxCollider2DComponent::default());
            entity.add(ScriptComponent::new("Sandbox.Player"));
        }

        let spinner = scene.create_entity("Spinner");
        {
            let mut entity = scene.entity_mut(spinner);
            entity.get_mut::<TransformComponent>().translation = Vec3::new(-6.0, 6.0, 0.0);
            entity.add(SpriteRendererComponent::default());
            entity.add(ScriptComponent::new("Sandbox.Spinner"));
            entity.add(NativeScriptComponent::bind::<Pulse>());
        }

        let title = scene.create_entity("Title");
        {
            let mut entity = scene.entity_mut(title);
            entity.get_mut::<TransformComponent>().translation = Vec3::new(-4.0, 10.0, 0.0);
            entity.add(TextComponent {
                text: "Ember Sandbox".to_string(),
                ..TextComponent::default()
            });
        }
    }

    fn load_font(renderer: &mut Renderer2D) {
        let image = ImageData::solid_color(256, 96, [255, 255, 255, 255]);
        match renderer.create_texture(image.specification(), Some(&image.data), None) {
            Ok(atlas) => renderer.set_default_font(Arc::new(Font::from_grid(atlas, 16, 6, ' '))),
            Err(err) => log::warn!("No font atlas, text disabled: {err}"),
        }
    }
}

impl Layer for SandboxLayer {
    fn name(&self) -> &str {
        "Sandbox"
    }

    fn on_attach(&mut self, services: &mut EngineServices) {
        Self::load_font(&mut services.renderer);

        let session = &mut services.session;
        session.on_viewport_resize(1280, 720);
        Self::build_scene(session.edit_scene_mut());

        if let Some(player) = session.edit_scene().find_entity_by_name("Player") {
            if let Some(id) = session.edit_scene().storage().persistent_id(player) {
                let speed = Dynamic::from_float(0.8);
                if let Err(err) = services.scripts.set_field_value(id, "Sandbox.Player", "speed", &speed) {
                    log::warn!("Could not tune player: {err}");
                }
            }
        }

        if let Err(err) = session.play(&mut services.scripts) {
            log::error!("Could not start the scene: {err}");
        }
    }

    fn on_update(&mut self, services: &mut EngineServices, ts: Timestep) {
        // Hold D for a second, then jump.
        services.input.set_key(KeyCode::D, self.frame % 120 < 60);
        services.input.set_key(KeyCode::Space, self.frame % 120 == 90);

        services.renderer.reset_stats();
        let EngineServices {
            session,
            scripts,
            renderer,
            ..
        } = services;
        session.on_update(ts, scripts, renderer);

        if self.frame % 60 == 0 {
            let stats = renderer.stats();
            log::info!(
                "frame {:>4}: {} draw calls, {} quads, {} circles, {} glyphs",
                self.frame,
                stats.draw_calls,
                stats.quad_count,
                stats.circle_count,
                stats.glyph_count
            );
        }
        self.timer.tick();
        self.frame += 1;
    }

    fn on_detach(&mut self, services: &mut EngineServices) {
        log::info!("Averaged {:.0} frames per second", self.timer.average_fps());
        let EngineServices { session, scripts, .. } = services;

        if let Some(player) = session.active_scene().find_entity_by_name("Player") {
            let transform = session.active_scene().world().get_component::<TransformComponent>(player);
            if let Some(transform) = transform {
                log::info!(
                    "Player ended at ({:.2}, {:.2})",
                    transform.translation.x,
                    transform.translation.y
                );
            }
        }

        if session.state() != SceneState::Edit {
            if let Err(err) = session.stop(scripts) {
                log::error!("{err}");
            }
        }
        if let Some(path) = &self.save_path {
            if let Err(err) = session.save_scene_as(path, scripts) {
                log::error!("Could not save scene: {err}");
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default("sandbox.toml");
    logging::init_with_level(logging::parse_level(&config.log_level));
    log::info!("Starting Ember sandbox...");

    let mut args = std::env::args().skip(1);
    let frames = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let save_path = args.next().map(PathBuf::from);

    let mut engine = Engine::new(config, Box::new(HeadlessBackend::new()))?;
    let assembly = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/scripts/Sandbox");
    let classes = engine.load_app_assembly(&assembly)?;
    log::info!("{classes} script class(es) available");

    engine.push_layer(Box::new(SandboxLayer {
        save_path,
        frame: 0,
        timer: Timer::new(),
    }));
    engine.run(frames, Timestep::from_seconds(1.0 / 60.0));
    engine.pop_layer();

    log::info!("Sandbox finished after {} frames", engine.frame_count());
    Ok(())
}
