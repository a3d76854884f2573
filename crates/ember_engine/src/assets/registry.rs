//! Asset handles, metadata and the registry document
//!
//! ```yaml
//! AssetRegistry:
//!   - Handle: 9182736451029384756
//!     FilePath: textures/player.png
//!     Type: Texture2D
//! ```

use crate::assets::{AssetError, AssetResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Opaque 64-bit asset identifier; zero is never valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(u64);

impl AssetHandle {
    /// The invalid handle
    pub const NONE: Self = Self(0);

    /// Random non-zero handle
    pub fn new() -> Self {
        loop {
            let value = rand::random::<u64>();
            if value != 0 {
                return Self(value);
            }
        }
    }

    /// Wrap a raw value
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is not the invalid handle
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of asset behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssetType {
    /// Unknown or unset
    #[default]
    None,
    /// Scene document
    Scene,
    /// 2D texture
    Texture2D,
}

impl AssetType {
    /// Name used in documents
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Scene => "Scene",
            Self::Texture2D => "Texture2D",
        }
    }

    /// Type implied by a file extension
    pub fn from_extension(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "ember" | "scene" => Self::Scene,
            "png" | "jpg" | "jpeg" => Self::Texture2D,
            _ => Self::None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = std::convert::Infallible;

    /// Unknown names map to `None`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Scene" => Self::Scene,
            "Texture2D" => Self::Texture2D,
            _ => Self::None,
        })
    }
}

/// What the registry knows about one asset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetMetadata {
    /// Kind of asset
    pub asset_type: AssetType,
    /// Path relative to the asset directory
    pub file_path: PathBuf,
}

impl AssetMetadata {
    /// Whether this describes a real asset
    pub fn is_valid(&self) -> bool {
        self.asset_type != AssetType::None
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RegistryDocument {
    #[serde(default)]
    asset_registry: Option<Vec<RegistryEntry>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RegistryEntry {
    handle: AssetHandle,
    file_path: String,
    #[serde(rename = "Type")]
    asset_type: String,
}

/// Handle to metadata map, ordered by handle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRegistry {
    entries: BTreeMap<AssetHandle, AssetMetadata>,
}

impl AssetRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, handle: AssetHandle, metadata: AssetMetadata) {
        self.entries.insert(handle, metadata);
    }

    /// Metadata for a handle
    pub fn get(&self, handle: AssetHandle) -> Option<&AssetMetadata> {
        self.entries.get(&handle)
    }

    /// Whether the handle is registered
    pub fn contains(&self, handle: AssetHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Handle registered for a path, if any
    pub fn find_by_path(&self, path: &Path) -> Option<AssetHandle> {
        self.entries
            .iter()
            .find(|(_, metadata)| metadata.file_path == path)
            .map(|(handle, _)| *handle)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries
    pub fn iter(&self) -> impl Iterator<Item = (AssetHandle, &AssetMetadata)> {
        self.entries.iter().map(|(handle, metadata)| (*handle, metadata))
    }

    /// Registry as a YAML document
    pub fn to_yaml(&self) -> AssetResult<String> {
        let entries = self
            .iter()
            .map(|(handle, metadata)| RegistryEntry {
                handle,
                // Forward slashes on every platform
                file_path: metadata
                    .file_path
                    .components()
                    .map(|part| part.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
                asset_type: metadata.asset_type.to_string(),
            })
            .collect();
        let document = RegistryDocument {
            asset_registry: Some(entries),
        };
        Ok(serde_yaml::to_string(&document)?)
    }

    /// Parse a registry document
    pub fn from_yaml(text: &str) -> AssetResult<Self> {
        let document: RegistryDocument = serde_yaml::from_str(text)?;
        let entries = document.asset_registry.ok_or(AssetError::MissingRegistryKey)?;

        let mut registry = Self::new();
        for entry in entries {
            let asset_type = entry.asset_type.parse().unwrap_or_default();
            if asset_type == AssetType::None {
                log::warn!("Asset {} has unknown type '{}'", entry.handle, entry.asset_type);
            }
            registry.insert(
                entry.handle,
                AssetMetadata {
                    asset_type,
                    file_path: PathBuf::from(entry.file_path),
                },
            );
        }
        Ok(registry)
    }

    /// Write the document to `path`
    pub fn save(&self, path: &Path) -> AssetResult<()> {
        let text = self.to_yaml()?;
        fs::write(path, text).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the document at `path`
    pub fn load(path: &Path) -> AssetResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_nonzero_and_distinct() {
        let a = AssetHandle::new();
        let b = AssetHandle::new();
        assert!(a.is_some());
        assert_ne!(a, b);
        assert!(!AssetHandle::NONE.is_some());
    }

    #[test]
    fn test_type_names_and_extensions() {
        for asset_type in [AssetType::None, AssetType::Scene, AssetType::Texture2D] {
            assert_eq!(asset_type.as_str().parse::<AssetType>().unwrap(), asset_type);
        }
        assert_eq!("Mesh".parse::<AssetType>().unwrap(), AssetType::None);
        assert_eq!(AssetType::from_extension(Path::new("a/b.PNG")), AssetType::Texture2D);
        assert_eq!(AssetType::from_extension(Path::new("level.ember")), AssetType::Scene);
        assert_eq!(AssetType::from_extension(Path::new("notes.txt")), AssetType::None);
    }

    #[test]
    fn test_document_round_trip() {
        let mut registry = AssetRegistry::new();
        let handle = AssetHandle::from_raw(77);
        registry.insert(
            handle,
            AssetMetadata {
                asset_type: AssetType::Texture2D,
                file_path: PathBuf::from("textures/player.png"),
            },
        );

        let text = registry.to_yaml().unwrap();
        assert!(text.contains("AssetRegistry"));
        let restored = AssetRegistry::from_yaml(&text).unwrap();
        assert_eq!(restored, registry);
        assert_eq!(restored.find_by_path(Path::new("textures/player.png")), Some(handle));
    }

    #[test]
    fn test_missing_root_key_fails() {
        assert!(matches!(
            AssetRegistry::from_yaml("Other: 1\n"),
            Err(AssetError::MissingRegistryKey)
        ));
    }
}
