//! # Script Field Reflection
//!
//! Public fields of a script class are described by a closed set of kinds.
//! Values that must outlive a script instance (editor overrides, values read
//! from a scene document) live in a fixed 16-byte buffer per field and are
//! converted to and from script values through the table in this module.
//!
//! ## Script-side representation
//!
//! | Kind                         | Script value            |
//! |------------------------------|-------------------------|
//! | Boolean                      | `bool`                  |
//! | Byte .. Long                 | `INT`                   |
//! | Float, Double, Decimal       | `FLOAT`                 |
//! | Char                         | `char`                  |
//! | String                       | `String`                |
//! | Vector2, Vector3             | `Vector2`, `Vector3`    |
//! | Vector4, Color               | `Vector4`               |
//! | Entity                       | `EntityHandle`          |

use crate::foundation::id::PersistentId;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use bytemuck::Pod;
use rhai::{Dynamic, FLOAT, INT};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Bytes reserved per cached field value
pub const MAX_SCRIPT_FIELD_BUFFER_SIZE: usize = 16;

/// Kind of a reflected script field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScriptFieldType {
    /// Unsupported type; reflected but never persisted
    #[default]
    None,
    /// `bool`
    Boolean,
    /// `u8`
    Byte,
    /// `i8`
    SByte,
    /// `u16`
    UShort,
    /// `i16`
    Short,
    /// `u32`
    UInt,
    /// `i32`
    Int,
    /// `u64`
    ULong,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `f64`, kept apart from Double for documents
    Decimal,
    /// Unicode scalar
    Char,
    /// Text; too large for the value buffer
    String,
    /// Two floats
    Vector2,
    /// Three floats
    Vector3,
    /// Four floats
    Vector4,
    /// RGBA, four floats
    Color,
    /// Reference to another entity by persistent id
    Entity,
}

impl ScriptFieldType {
    /// Every kind, in declaration order
    pub const ALL: [Self; 20] = [
        Self::None,
        Self::Boolean,
        Self::Byte,
        Self::SByte,
        Self::UShort,
        Self::Short,
        Self::UInt,
        Self::Int,
        Self::ULong,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Char,
        Self::String,
        Self::Vector2,
        Self::Vector3,
        Self::Vector4,
        Self::Color,
        Self::Entity,
    ];

    /// Name used in scene documents
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::UShort => "UShort",
            Self::Short => "Short",
            Self::UInt => "UInt",
            Self::Int => "Int",
            Self::ULong => "ULong",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Char => "Char",
            Self::String => "String",
            Self::Vector2 => "Vector2",
            Self::Vector3 => "Vector3",
            Self::Vector4 => "Vector4",
            Self::Color => "Color",
            Self::Entity => "Entity",
        }
    }

    /// Whether values of this kind fit the field buffer
    pub const fn is_persistable(self) -> bool {
        !matches!(self, Self::None | Self::String)
    }

    /// Whether the script value is an `INT`
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::SByte | Self::UShort | Self::Short | Self::UInt | Self::Int | Self::ULong | Self::Long
        )
    }

    /// Whether the script value is a `FLOAT`
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::Decimal)
    }
}

impl fmt::Display for ScriptFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptFieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown script field type '{s}'"))
    }
}

/// Script-side reference to an entity
///
/// A nil id stands for "no entity".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub PersistentId);

impl Default for EntityHandle {
    fn default() -> Self {
        Self::none()
    }
}

impl EntityHandle {
    /// Handle referring to no entity
    pub const fn none() -> Self {
        Self(PersistentId::nil())
    }

    /// Whether this refers to an entity
    pub fn is_valid(&self) -> bool {
        !self.0.is_nil()
    }
}

/// Default value with an explicitly declared kind
///
/// Produced by the typed constructors (`byte(3)`, `double(0.5)`, ...) in
/// script field declarations.
#[derive(Debug, Clone)]
pub struct TypedDefault {
    /// Declared kind
    pub field_type: ScriptFieldType,
    /// Plain script value
    pub value: Dynamic,
}

/// Infer the kind of a top-level binding and unwrap typed declarations
pub fn infer_field(value: &Dynamic) -> (ScriptFieldType, Dynamic) {
    if let Some(typed) = value.clone().try_cast::<TypedDefault>() {
        return (typed.field_type, typed.value);
    }

    let kind = if value.is::<bool>() {
        ScriptFieldType::Boolean
    } else if value.is::<INT>() {
        ScriptFieldType::Int
    } else if value.is::<FLOAT>() {
        ScriptFieldType::Float
    } else if value.is::<char>() {
        ScriptFieldType::Char
    } else if value.is_string() {
        ScriptFieldType::String
    } else if value.is::<Vec2>() {
        ScriptFieldType::Vector2
    } else if value.is::<Vec3>() {
        ScriptFieldType::Vector3
    } else if value.is::<Vec4>() {
        ScriptFieldType::Vector4
    } else if value.is::<EntityHandle>() {
        ScriptFieldType::Entity
    } else {
        ScriptFieldType::None
    };
    (kind, value.clone())
}

/// A reflected public field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptField {
    /// Field name
    pub name: String,
    /// Kind
    pub field_type: ScriptFieldType,
}

impl ScriptField {
    /// Describe a field
    pub fn new(name: impl Into<String>, field_type: ScriptFieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Cached value of one field for one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFieldInstance {
    /// Field the value belongs to
    pub field: ScriptField,
    buffer: [u8; MAX_SCRIPT_FIELD_BUFFER_SIZE],
}

/// Cached values of one entity, keyed by field name
pub type ScriptFieldMap = BTreeMap<String, ScriptFieldInstance>;

impl ScriptFieldInstance {
    /// Zeroed value for a field
    pub const fn new(field: ScriptField) -> Self {
        Self {
            field,
            buffer: [0; MAX_SCRIPT_FIELD_BUFFER_SIZE],
        }
    }

    /// Kind of the stored value
    pub const fn field_type(&self) -> ScriptFieldType {
        self.field.field_type
    }

    /// Read the buffer as `T`
    ///
    /// # Panics
    ///
    /// Panics if `T` is larger than the field buffer.
    pub fn get_value<T: Pod>(&self) -> T {
        let size = std::mem::size_of::<T>();
        assert!(size <= MAX_SCRIPT_FIELD_BUFFER_SIZE, "field type is too large");
        bytemuck::pod_read_unaligned(&self.buffer[..size])
    }

    /// Overwrite the buffer with `value`
    ///
    /// # Panics
    ///
    /// Panics if `T` is larger than the field buffer.
    pub fn set_value<T: Pod>(&mut self, value: T) {
        let bytes = bytemuck::bytes_of(&value);
        assert!(bytes.len() <= MAX_SCRIPT_FIELD_BUFFER_SIZE, "field type is too large");
        self.buffer = [0; MAX_SCRIPT_FIELD_BUFFER_SIZE];
        self.buffer[..bytes.len()].copy_from_slice(bytes);
    }

    /// Raw buffer
    pub const fn buffer(&self) -> &[u8; MAX_SCRIPT_FIELD_BUFFER_SIZE] {
        &self.buffer
    }

    /// Stored value as a script value; `None` for kinds that are not persisted
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_dynamic(&self) -> Option<Dynamic> {
        let value = match self.field_type() {
            ScriptFieldType::None | ScriptFieldType::String => return None,
            ScriptFieldType::Boolean => Dynamic::from_bool(self.get_value::<u8>() != 0),
            ScriptFieldType::Byte => Dynamic::from_int(INT::from(self.get_value::<u8>())),
            ScriptFieldType::SByte => Dynamic::from_int(INT::from(self.get_value::<i8>())),
            ScriptFieldType::UShort => Dynamic::from_int(INT::from(self.get_value::<u16>())),
            ScriptFieldType::Short => Dynamic::from_int(INT::from(self.get_value::<i16>())),
            ScriptFieldType::UInt => Dynamic::from_int(INT::from(self.get_value::<u32>())),
            ScriptFieldType::Int => Dynamic::from_int(INT::from(self.get_value::<i32>())),
            ScriptFieldType::ULong => Dynamic::from_int(self.get_value::<u64>() as INT),
            ScriptFieldType::Long => Dynamic::from_int(self.get_value::<i64>()),
            ScriptFieldType::Float => Dynamic::from_float(FLOAT::from(self.get_value::<f32>())),
            ScriptFieldType::Double | ScriptFieldType::Decimal => Dynamic::from_float(self.get_value::<f64>()),
            ScriptFieldType::Char => Dynamic::from_char(char::from_u32(self.get_value::<u32>()).unwrap_or('\0')),
            ScriptFieldType::Vector2 => Dynamic::from(Vec2::from(self.get_value::<[f32; 2]>())),
            ScriptFieldType::Vector3 => Dynamic::from(Vec3::from(self.get_value::<[f32; 3]>())),
            ScriptFieldType::Vector4 | ScriptFieldType::Color => Dynamic::from(Vec4::from(self.get_value::<[f32; 4]>())),
            ScriptFieldType::Entity => {
                Dynamic::from(EntityHandle(PersistentId::from_u128(self.get_value::<u128>())))
            }
        };
        Some(value)
    }

    /// Store a script value, checked against the field kind
    ///
    /// Returns `false`, leaving the buffer untouched, when the value does not
    /// match the kind or is out of range for it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_from_dynamic(&mut self, value: &Dynamic) -> bool {
        let kind = self.field_type();
        if kind.is_integer() {
            let Ok(int) = value.as_int() else {
                return false;
            };
            return match kind {
                ScriptFieldType::Byte => self.store(u8::try_from(int).ok()),
                ScriptFieldType::SByte => self.store(i8::try_from(int).ok()),
                ScriptFieldType::UShort => self.store(u16::try_from(int).ok()),
                ScriptFieldType::Short => self.store(i16::try_from(int).ok()),
                ScriptFieldType::UInt => self.store(u32::try_from(int).ok()),
                ScriptFieldType::Int => self.store(i32::try_from(int).ok()),
                ScriptFieldType::ULong => self.store(u64::try_from(int).ok()),
                _ => self.store(Some(int)),
            };
        }
        if kind.is_float() {
            #[allow(clippy::cast_precision_loss)]
            let float = match (value.as_float(), value.as_int()) {
                (Ok(float), _) => float,
                (_, Ok(int)) => int as FLOAT,
                _ => return false,
            };
            return if kind == ScriptFieldType::Float {
                self.store(Some(float as f32))
            } else {
                self.store(Some(float))
            };
        }

        match kind {
            ScriptFieldType::Boolean => self.store(value.as_bool().ok().map(u8::from)),
            ScriptFieldType::Char => self.store(value.as_char().ok().map(u32::from)),
            ScriptFieldType::Vector2 => self.store(value.clone().try_cast::<Vec2>().map(|v| [v.x, v.y])),
            ScriptFieldType::Vector3 => self.store(value.clone().try_cast::<Vec3>().map(|v| [v.x, v.y, v.z])),
            ScriptFieldType::Vector4 | ScriptFieldType::Color => {
                self.store(value.clone().try_cast::<Vec4>().map(|v| [v.x, v.y, v.z, v.w]))
            }
            ScriptFieldType::Entity => self.store(
                value
                    .clone()
                    .try_cast::<EntityHandle>()
                    .map(|handle| handle.0.as_u128()),
            ),
            _ => false,
        }
    }

    fn store<T: Pod>(&mut self, value: Option<T>) -> bool {
        value.map_or(false, |value| {
            self.set_value(value);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(kind: ScriptFieldType) -> ScriptFieldInstance {
        ScriptFieldInstance::new(ScriptField::new("value", kind))
    }

    #[test]
    fn test_type_names_round_trip() {
        for kind in ScriptFieldType::ALL {
            assert_eq!(kind.as_str().parse::<ScriptFieldType>(), Ok(kind));
        }
        assert!("Quaternion".parse::<ScriptFieldType>().is_err());
    }

    #[test]
    fn test_typed_buffer_access() {
        let mut field = instance(ScriptFieldType::Vector3);
        field.set_value([1.0_f32, 2.0, 3.0]);
        assert_eq!(field.get_value::<[f32; 3]>(), [1.0, 2.0, 3.0]);

        let mut entity = instance(ScriptFieldType::Entity);
        entity.set_value(u128::MAX - 7);
        assert_eq!(entity.get_value::<u128>(), u128::MAX - 7);
    }

    #[test]
    fn test_integer_range_is_checked() {
        let mut byte = instance(ScriptFieldType::Byte);
        assert!(byte.set_from_dynamic(&Dynamic::from_int(200)));
        assert!(!byte.set_from_dynamic(&Dynamic::from_int(300)));
        assert_eq!(byte.to_dynamic().unwrap().as_int(), Ok(200));

        let mut short = instance(ScriptFieldType::Short);
        assert!(short.set_from_dynamic(&Dynamic::from_int(-12)));
        assert_eq!(short.to_dynamic().unwrap().as_int(), Ok(-12));
    }

    #[test]
    fn test_mismatched_value_rejected() {
        let mut flag = instance(ScriptFieldType::Boolean);
        assert!(!flag.set_from_dynamic(&Dynamic::from_float(1.0)));
        assert!(flag.set_from_dynamic(&Dynamic::from_bool(true)));
        assert_eq!(flag.to_dynamic().unwrap().as_bool(), Ok(true));

        let mut text = instance(ScriptFieldType::String);
        assert!(!text.set_from_dynamic(&Dynamic::from("hello")));
        assert!(text.to_dynamic().is_none());
    }

    #[test]
    fn test_float_kinds_accept_integers() {
        let mut speed = instance(ScriptFieldType::Float);
        assert!(speed.set_from_dynamic(&Dynamic::from_int(3)));
        assert_eq!(speed.get_value::<f32>(), 3.0);

        let mut precise = instance(ScriptFieldType::Double);
        assert!(precise.set_from_dynamic(&Dynamic::from_float(0.1)));
        assert_eq!(precise.get_value::<f64>(), 0.1);
    }

    #[test]
    fn test_inference() {
        assert_eq!(infer_field(&Dynamic::from_int(4)).0, ScriptFieldType::Int);
        assert_eq!(infer_field(&Dynamic::from_float(4.0)).0, ScriptFieldType::Float);
        assert_eq!(infer_field(&Dynamic::from(Vec2::new(1.0, 2.0))).0, ScriptFieldType::Vector2);

        let typed = Dynamic::from(TypedDefault {
            field_type: ScriptFieldType::Double,
            value: Dynamic::from_float(2.5),
        });
        let (kind, value) = infer_field(&typed);
        assert_eq!(kind, ScriptFieldType::Double);
        assert_eq!(value.as_float(), Ok(2.5));
    }

    #[test]
    fn test_entity_field_round_trip() {
        let id = PersistentId::new();
        let mut target = instance(ScriptFieldType::Entity);
        assert!(target.set_from_dynamic(&Dynamic::from(EntityHandle(id))));
        let handle = target.to_dynamic().unwrap().cast::<EntityHandle>();
        assert_eq!(handle.0, id);
        assert!(handle.is_valid());
        assert!(!EntityHandle::none().is_valid());
    }
}
