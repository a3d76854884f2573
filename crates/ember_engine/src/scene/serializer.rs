//! # Scene Serializer
//!
//! Reads and writes scene documents in YAML.
//!
//! ```yaml
//! Scene: Untitled
//! Entities:
//!   - Entity: 5c1f0e0c-3b2a-4f7e-9d61-1f2a6b0c9e11
//!     TagComponent:
//!       Tag: Player
//!     TransformComponent:
//!       Position: [0.0, 1.0, 0.0]
//!       Rotation: [0.0, 0.0, 0.0]
//!       Scale: [1.0, 1.0, 1.0]
//!     ScriptComponent:
//!       ClassName: Sandbox.Player
//!       ScriptFields:
//!         - Name: Speed
//!           Type: Float
//!           Data: 2.5
//! ```
//!
//! Unknown component blocks and keys are ignored on read. Missing optional
//! keys fall back to component defaults. Entity ids are written as UUID
//! strings; plain integers are accepted on read.

use crate::ecs::components::{
    BodyType, BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent, CircleRendererComponent,
    IdComponent, PhysicsMaterial, RigidBody2DComponent, ScriptComponent, SpriteRendererComponent, TagComponent,
    TextComponent, TransformComponent,
};
use crate::ecs::EntityId;
use crate::foundation::id::PersistentId;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::render::Texture2D;
use crate::scene::{ProjectionType, Scene, SceneCamera};
use crate::scripting::{ScriptEngine, ScriptField, ScriptFieldInstance, ScriptFieldType};
use bytemuck::Pod;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scene document errors
#[derive(Error, Debug)]
pub enum SerializerError {
    /// Reading or writing the document failed
    #[error("scene file '{path}': {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid scene
    #[error("invalid scene document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for scene documents
pub type SerializerResult<T> = Result<T, SerializerError>;

/// Resolves `TexturePath` entries into textures
pub trait TextureLoader {
    /// Load the texture at `path`, or `None` when it cannot be loaded
    fn load_texture(&mut self, path: &Path) -> Option<Texture2D>;
}

impl<F: FnMut(&Path) -> Option<Texture2D>> TextureLoader for F {
    fn load_texture(&mut self, path: &Path) -> Option<Texture2D> {
        self(path)
    }
}

// ----- Document model -----

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

impl IdRepr {
    fn resolve(self) -> Option<PersistentId> {
        match self {
            Self::Text(text) => PersistentId::parse(&text),
            Self::Number(number) => Some(PersistentId::from_u128(u128::from(number))),
        }
    }
}

fn serialize_id<S: Serializer>(id: &PersistentId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_string())
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PersistentId, D::Error> {
    IdRepr::deserialize(deserializer)?
        .resolve()
        .ok_or_else(|| serde::de::Error::custom("invalid entity id"))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SceneDocument {
    scene: String,
    #[serde(default)]
    entities: Option<Vec<EntityDocument>>,
}

#[derive(Serialize, Deserialize)]
struct EntityDocument {
    #[serde(rename = "Entity", serialize_with = "serialize_id", deserialize_with = "deserialize_id")]
    entity: PersistentId,
    #[serde(rename = "TagComponent", default, skip_serializing_if = "Option::is_none")]
    tag: Option<TagDocument>,
    #[serde(rename = "TransformComponent", default, skip_serializing_if = "Option::is_none")]
    transform: Option<TransformDocument>,
    #[serde(rename = "CameraComponent", default, skip_serializing_if = "Option::is_none")]
    camera: Option<CameraComponentDocument>,
    #[serde(rename = "ScriptComponent", default, skip_serializing_if = "Option::is_none")]
    script: Option<ScriptDocument>,
    #[serde(rename = "SpriteRendererComponent", default, skip_serializing_if = "Option::is_none")]
    sprite: Option<SpriteDocument>,
    #[serde(rename = "CircleRendererComponent", default, skip_serializing_if = "Option::is_none")]
    circle: Option<CircleDocument>,
    #[serde(rename = "RigidBody2DComponent", default, skip_serializing_if = "Option::is_none")]
    rigid_body: Option<RigidBodyDocument>,
    #[serde(rename = "BoxCollider2DComponent", default, skip_serializing_if = "Option::is_none")]
    box_collider: Option<BoxColliderDocument>,
    #[serde(rename = "CircleCollider2DComponent", default, skip_serializing_if = "Option::is_none")]
    circle_collider: Option<CircleColliderDocument>,
    #[serde(rename = "TextComponent", default, skip_serializing_if = "Option::is_none")]
    text: Option<TextDocument>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TagDocument {
    tag: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TransformDocument {
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
}

impl Default for TransformDocument {
    fn default() -> Self {
        Self::from(&TransformComponent::default())
    }
}

impl From<&TransformComponent> for TransformDocument {
    fn from(transform: &TransformComponent) -> Self {
        Self {
            position: transform.translation.into(),
            rotation: transform.rotation.into(),
            scale: transform.scale.into(),
        }
    }
}

impl From<TransformDocument> for TransformComponent {
    fn from(document: TransformDocument) -> Self {
        Self {
            translation: Vec3::from(document.position),
            rotation: Vec3::from(document.rotation),
            scale: Vec3::from(document.scale),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CameraDocument {
    projection_type: i32,
    #[serde(rename = "PerspectiveFOV")]
    perspective_fov: f32,
    perspective_near: f32,
    perspective_far: f32,
    orthographic_size: f32,
    orthographic_near: f32,
    orthographic_far: f32,
}

impl Default for CameraDocument {
    fn default() -> Self {
        Self::from(&SceneCamera::default())
    }
}

impl From<&SceneCamera> for CameraDocument {
    fn from(camera: &SceneCamera) -> Self {
        Self {
            projection_type: camera.projection_type().as_index(),
            perspective_fov: camera.perspective_fov(),
            perspective_near: camera.perspective_near(),
            perspective_far: camera.perspective_far(),
            orthographic_size: camera.orthographic_size(),
            orthographic_near: camera.orthographic_near(),
            orthographic_far: camera.orthographic_far(),
        }
    }
}

impl CameraDocument {
    fn apply(&self, camera: &mut SceneCamera) {
        let projection_type = ProjectionType::from_index(self.projection_type).unwrap_or_else(|| {
            log::warn!("Unknown projection type {}, using orthographic", self.projection_type);
            ProjectionType::Orthographic
        });
        camera.set_projection_type(projection_type);
        camera.set_perspective_fov(self.perspective_fov);
        camera.set_perspective_near(self.perspective_near);
        camera.set_perspective_far(self.perspective_far);
        camera.set_orthographic_size(self.orthographic_size);
        camera.set_orthographic_near(self.orthographic_near);
        camera.set_orthographic_far(self.orthographic_far);
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CameraComponentDocument {
    camera: CameraDocument,
    primary: bool,
    fixed_aspect_ratio: bool,
}

impl Default for CameraComponentDocument {
    fn default() -> Self {
        Self {
            camera: CameraDocument::default(),
            primary: true,
            fixed_aspect_ratio: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScriptDocument {
    class_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    script_fields: Vec<ScriptFieldDocument>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScriptFieldDocument {
    name: String,
    #[serde(rename = "Type")]
    field_type: String,
    data: Value,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpriteDocument {
    color: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    texture_path: Option<PathBuf>,
    #[serde(default = "default_tiling_factor")]
    tiling_factor: f32,
}

const fn default_tiling_factor() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CircleDocument {
    color: [f32; 4],
    thickness: f32,
    fade: f32,
}

impl Default for CircleDocument {
    fn default() -> Self {
        let circle = CircleRendererComponent::default();
        Self {
            color: circle.color.into(),
            thickness: circle.thickness,
            fade: circle.fade,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RigidBodyDocument {
    body_type: String,
    #[serde(default)]
    fixed_rotation: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct MaterialDocument {
    density: f32,
    friction: f32,
    restitution: f32,
    restitution_threshold: f32,
}

impl Default for MaterialDocument {
    fn default() -> Self {
        Self::from(&PhysicsMaterial::default())
    }
}

impl From<&PhysicsMaterial> for MaterialDocument {
    fn from(material: &PhysicsMaterial) -> Self {
        Self {
            density: material.density,
            friction: material.friction,
            restitution: material.restitution,
            restitution_threshold: material.restitution_threshold,
        }
    }
}

impl From<MaterialDocument> for PhysicsMaterial {
    fn from(document: MaterialDocument) -> Self {
        Self {
            density: document.density,
            friction: document.friction,
            restitution: document.restitution,
            restitution_threshold: document.restitution_threshold,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BoxColliderDocument {
    #[serde(default)]
    offset: [f32; 2],
    #[serde(default = "default_box_size")]
    size: [f32; 2],
    #[serde(flatten)]
    material: MaterialDocument,
}

fn default_box_size() -> [f32; 2] {
    BoxCollider2DComponent::default().size.into()
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CircleColliderDocument {
    #[serde(default)]
    offset: [f32; 2],
    #[serde(default = "default_radius")]
    radius: f32,
    #[serde(flatten)]
    material: MaterialDocument,
}

fn default_radius() -> f32 {
    CircleCollider2DComponent::default().radius
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TextDocument {
    text_string: String,
    kerning: f32,
    line_spacing: f32,
    color: [f32; 4],
}

impl Default for TextDocument {
    fn default() -> Self {
        let text = TextComponent::default();
        Self {
            text_string: text.text,
            kerning: text.kerning,
            line_spacing: text.line_spacing,
            color: text.color.into(),
        }
    }
}

// ----- Script field data -----

fn store<T: Pod>(field: &mut ScriptFieldInstance, value: Option<T>) -> bool {
    value.map_or(false, |value| {
        field.set_value(value);
        true
    })
}

fn parse_vector<const N: usize>(data: &Value) -> Option<[f32; N]> {
    let values = serde_yaml::from_value::<Vec<f32>>(data.clone()).ok()?;
    <[f32; N]>::try_from(values).ok()
}

fn parse_entity(data: &Value) -> Option<PersistentId> {
    serde_yaml::from_value::<IdRepr>(data.clone()).ok()?.resolve()
}

/// YAML form of a stored field value, `None` for kinds that are not persisted
fn field_to_yaml(field: &ScriptFieldInstance) -> Option<Value> {
    let value = match field.field_type() {
        ScriptFieldType::None | ScriptFieldType::String => return None,
        ScriptFieldType::Boolean => Value::Bool(field.get_value::<u8>() != 0),
        ScriptFieldType::Byte => Value::from(field.get_value::<u8>()),
        ScriptFieldType::SByte => Value::from(field.get_value::<i8>()),
        ScriptFieldType::UShort => Value::from(field.get_value::<u16>()),
        ScriptFieldType::Short => Value::from(field.get_value::<i16>()),
        ScriptFieldType::UInt => Value::from(field.get_value::<u32>()),
        ScriptFieldType::Int => Value::from(field.get_value::<i32>()),
        ScriptFieldType::ULong => Value::from(field.get_value::<u64>()),
        ScriptFieldType::Long => Value::from(field.get_value::<i64>()),
        ScriptFieldType::Float => Value::from(field.get_value::<f32>()),
        ScriptFieldType::Double | ScriptFieldType::Decimal => Value::from(field.get_value::<f64>()),
        ScriptFieldType::Char => Value::from(
            char::from_u32(field.get_value::<u32>())
                .unwrap_or('\0')
                .to_string(),
        ),
        ScriptFieldType::Vector2 => Value::from(field.get_value::<[f32; 2]>().to_vec()),
        ScriptFieldType::Vector3 => Value::from(field.get_value::<[f32; 3]>().to_vec()),
        ScriptFieldType::Vector4 | ScriptFieldType::Color => Value::from(field.get_value::<[f32; 4]>().to_vec()),
        ScriptFieldType::Entity => Value::from(PersistentId::from_u128(field.get_value::<u128>()).to_string()),
    };
    Some(value)
}

/// Store YAML data into a field buffer; `false` when it does not fit the kind
#[allow(clippy::cast_possible_truncation)]
fn field_from_yaml(field: &mut ScriptFieldInstance, data: &Value) -> bool {
    match field.field_type() {
        ScriptFieldType::None | ScriptFieldType::String => false,
        ScriptFieldType::Boolean => store(field, data.as_bool().map(u8::from)),
        ScriptFieldType::Byte => store(field, data.as_u64().and_then(|v| u8::try_from(v).ok())),
        ScriptFieldType::SByte => store(field, data.as_i64().and_then(|v| i8::try_from(v).ok())),
        ScriptFieldType::UShort => store(field, data.as_u64().and_then(|v| u16::try_from(v).ok())),
        ScriptFieldType::Short => store(field, data.as_i64().and_then(|v| i16::try_from(v).ok())),
        ScriptFieldType::UInt => store(field, data.as_u64().and_then(|v| u32::try_from(v).ok())),
        ScriptFieldType::Int => store(field, data.as_i64().and_then(|v| i32::try_from(v).ok())),
        ScriptFieldType::ULong => store(field, data.as_u64()),
        ScriptFieldType::Long => store(field, data.as_i64()),
        ScriptFieldType::Float => store(field, data.as_f64().map(|v| v as f32)),
        ScriptFieldType::Double | ScriptFieldType::Decimal => store(field, data.as_f64()),
        ScriptFieldType::Char => {
            let mut chars = data.as_str().unwrap_or_default().chars();
            let single = chars.next().filter(|_| chars.next().is_none());
            store(field, single.map(u32::from))
        }
        ScriptFieldType::Vector2 => store(field, parse_vector::<2>(data)),
        ScriptFieldType::Vector3 => store(field, parse_vector::<3>(data)),
        ScriptFieldType::Vector4 | ScriptFieldType::Color => store(field, parse_vector::<4>(data)),
        ScriptFieldType::Entity => store(field, parse_entity(data).map(PersistentId::as_u128)),
    }
}

// ----- Serializer -----

/// Reads and writes one scene
pub struct SceneSerializer<'a> {
    scene: &'a mut Scene,
    scripts: Option<&'a mut ScriptEngine>,
    textures: Option<&'a mut dyn TextureLoader>,
}

impl<'a> SceneSerializer<'a> {
    /// Serializer for `scene` without script fields or textures
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            scripts: None,
            textures: None,
        }
    }

    /// Read and write script field values through the script host's cache
    #[must_use]
    pub fn with_scripts(mut self, scripts: &'a mut ScriptEngine) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Resolve sprite textures on read
    #[must_use]
    pub fn with_textures(mut self, textures: &'a mut dyn TextureLoader) -> Self {
        self.textures = Some(textures);
        self
    }

    /// Write the scene to `path`
    pub fn serialize(&self, path: impl AsRef<Path>) -> SerializerResult<()> {
        let path = path.as_ref();
        let text = self.serialize_to_string()?;
        fs::write(path, text).map_err(|source| SerializerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved scene '{}' to {}", self.scene.name(), path.display());
        Ok(())
    }

    /// The scene as a YAML document
    pub fn serialize_to_string(&self) -> SerializerResult<String> {
        let world = self.scene.world();
        let mut entities = Vec::with_capacity(world.entity_count());
        world.each(|entity| {
            if let Some(document) = self.serialize_entity(entity) {
                entities.push(document);
            }
        });

        let document = SceneDocument {
            scene: self.scene.name().to_string(),
            entities: Some(entities),
        };
        Ok(serde_yaml::to_string(&document)?)
    }

    fn serialize_entity(&self, entity: EntityId) -> Option<EntityDocument> {
        let world = self.scene.world();
        let id = world.get_component::<IdComponent>(entity)?.id;

        let script = world.get_component::<ScriptComponent>(entity).map(|script| ScriptDocument {
            class_name: script.class_name.clone(),
            script_fields: self.serialize_fields(id),
        });

        Some(EntityDocument {
            entity: id,
            tag: world
                .get_component::<TagComponent>(entity)
                .map(|tag| TagDocument { tag: tag.tag.clone() }),
            transform: world.get_component::<TransformComponent>(entity).map(TransformDocument::from),
            camera: world
                .get_component::<CameraComponent>(entity)
                .map(|camera| CameraComponentDocument {
                    camera: CameraDocument::from(&camera.camera),
                    primary: camera.primary,
                    fixed_aspect_ratio: camera.fixed_aspect_ratio,
                }),
            script,
            sprite: world
                .get_component::<SpriteRendererComponent>(entity)
                .map(|sprite| SpriteDocument {
                    color: sprite.color.into(),
                    texture_path: sprite
                        .texture
                        .as_ref()
                        .and_then(|texture| texture.path().map(Path::to_path_buf)),
                    tiling_factor: sprite.tiling_factor,
                }),
            circle: world
                .get_component::<CircleRendererComponent>(entity)
                .map(|circle| CircleDocument {
                    color: circle.color.into(),
                    thickness: circle.thickness,
                    fade: circle.fade,
                }),
            rigid_body: world
                .get_component::<RigidBody2DComponent>(entity)
                .map(|body| RigidBodyDocument {
                    body_type: body.body_type.to_string(),
                    fixed_rotation: body.fixed_rotation,
                }),
            box_collider: world
                .get_component::<BoxCollider2DComponent>(entity)
                .map(|collider| BoxColliderDocument {
                    offset: collider.offset.into(),
                    size: collider.size.into(),
                    material: MaterialDocument::from(&collider.material),
                }),
            circle_collider: world
                .get_component::<CircleCollider2DComponent>(entity)
                .map(|collider| CircleColliderDocument {
                    offset: collider.offset.into(),
                    radius: collider.radius,
                    material: MaterialDocument::from(&collider.material),
                }),
            text: world.get_component::<TextComponent>(entity).map(|text| TextDocument {
                text_string: text.text.clone(),
                kerning: text.kerning,
                line_spacing: text.line_spacing,
                color: text.color.into(),
            }),
        })
    }

    fn serialize_fields(&self, id: PersistentId) -> Vec<ScriptFieldDocument> {
        let Some(fields) = self.scripts.as_ref().and_then(|scripts| scripts.field_map(id)) else {
            return Vec::new();
        };
        fields
            .iter()
            .filter_map(|(name, field)| {
                Some(ScriptFieldDocument {
                    name: name.clone(),
                    field_type: field.field_type().as_str().to_string(),
                    data: field_to_yaml(field)?,
                })
            })
            .collect()
    }

    /// Read `path` into the scene; entities are appended
    pub fn deserialize(&mut self, path: impl AsRef<Path>) -> SerializerResult<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SerializerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.deserialize_str(&text).map_err(|err| {
            log::error!("Failed to load scene '{}': {err}", path.display());
            err
        })
    }

    /// Read a YAML document into the scene; entities are appended
    pub fn deserialize_str(&mut self, text: &str) -> SerializerResult<()> {
        let document: SceneDocument = serde_yaml::from_str(text)?;
        log::trace!("Deserializing scene '{}'", document.scene);
        self.scene.set_name(document.scene);

        for entity in document.entities.unwrap_or_default() {
            self.deserialize_entity(entity);
        }
        Ok(())
    }

    fn deserialize_entity(&mut self, document: EntityDocument) {
        let name = document.tag.map(|tag| tag.tag).unwrap_or_default();
        log::trace!("Deserialize entity with ID = {}, name = {name}", document.entity);
        let entity = self.scene.create_entity_with_id(document.entity, &name);

        let world = self.scene.world_mut();
        if let Some(transform) = document.transform {
            world.add_or_replace_component(entity, TransformComponent::from(transform));
        }

        if let Some(camera) = document.camera {
            let mut component = CameraComponent {
                primary: camera.primary,
                fixed_aspect_ratio: camera.fixed_aspect_ratio,
                ..CameraComponent::default()
            };
            camera.camera.apply(&mut component.camera);
            world.add_component(entity, component);
        }

        if let Some(sprite) = document.sprite {
            let texture = sprite.texture_path.as_deref().and_then(|path| {
                let texture = self.textures.as_mut().and_then(|loader| loader.load_texture(path));
                if texture.is_none() {
                    log::warn!("Could not load texture {}", path.display());
                }
                texture
            });
            self.scene.world_mut().add_component(
                entity,
                SpriteRendererComponent {
                    color: Vec4::from(sprite.color),
                    texture,
                    tiling_factor: sprite.tiling_factor,
                },
            );
        }

        let world = self.scene.world_mut();
        if let Some(circle) = document.circle {
            world.add_component(
                entity,
                CircleRendererComponent {
                    color: Vec4::from(circle.color),
                    thickness: circle.thickness,
                    fade: circle.fade,
                },
            );
        }

        if let Some(body) = document.rigid_body {
            let body_type = body.body_type.parse::<BodyType>().unwrap_or_else(|err| {
                log::warn!("{err}, using Static");
                BodyType::Static
            });
            world.add_component(
                entity,
                RigidBody2DComponent {
                    fixed_rotation: body.fixed_rotation,
                    ..RigidBody2DComponent::new(body_type)
                },
            );
        }

        if let Some(collider) = document.box_collider {
            world.add_component(
                entity,
                BoxCollider2DComponent {
                    offset: Vec2::from(collider.offset),
                    size: Vec2::from(collider.size),
                    material: collider.material.into(),
                    runtime_fixture: None,
                },
            );
        }

        if let Some(collider) = document.circle_collider {
            world.add_component(
                entity,
                CircleCollider2DComponent {
                    offset: Vec2::from(collider.offset),
                    radius: collider.radius,
                    material: collider.material.into(),
                    runtime_fixture: None,
                },
            );
        }

        if let Some(text) = document.text {
            world.add_component(
                entity,
                TextComponent {
                    text: text.text_string,
                    color: Vec4::from(text.color),
                    kerning: text.kerning,
                    line_spacing: text.line_spacing,
                    ..TextComponent::default()
                },
            );
        }

        if let Some(script) = document.script {
            self.deserialize_fields(document.entity, &script);
            self.scene
                .world_mut()
                .add_component(entity, ScriptComponent::new(script.class_name));
        }
    }

    fn deserialize_fields(&mut self, id: PersistentId, script: &ScriptDocument) {
        let Some(scripts) = self.scripts.as_deref_mut() else {
            return;
        };
        if script.script_fields.is_empty() {
            return;
        }

        let class_fields = scripts
            .entity_class(&script.class_name)
            .map(|class| class.fields().clone());
        if class_fields.is_none() {
            log::warn!(
                "Script class '{}' is not loaded; keeping its field values unchecked",
                script.class_name
            );
        }

        for document in &script.script_fields {
            let Ok(field_type) = document.field_type.parse::<ScriptFieldType>() else {
                log::warn!("Unknown field type '{}' for field '{}'", document.field_type, document.name);
                continue;
            };
            if let Some(fields) = &class_fields {
                match fields.get(&document.name) {
                    None => {
                        log::warn!("Field '{}' does not exist in class '{}'", document.name, script.class_name);
                        continue;
                    }
                    Some(field) if field.field_type != field_type => {
                        log::warn!(
                            "Field '{}' is {} in class '{}', document says {field_type}",
                            document.name,
                            field.field_type,
                            script.class_name
                        );
                        continue;
                    }
                    Some(_) => {}
                }
            }

            let mut instance = ScriptFieldInstance::new(ScriptField::new(document.name.clone(), field_type));
            if !field_from_yaml(&mut instance, &document.data) {
                log::warn!("Invalid {field_type} data for field '{}'", document.name);
                continue;
            }
            scripts
                .script_field_map(id)
                .insert(document.name.clone(), instance);
        }
    }
}
