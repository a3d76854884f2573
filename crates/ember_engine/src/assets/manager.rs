//! Editor asset manager
//!
//! Imports files from the project's asset directory, keeps the registry
//! document in sync and caches loaded textures. Scene assets are only
//! registered; scenes are opened through the scene serializer.

use crate::assets::image::ImageData;
use crate::assets::registry::{AssetHandle, AssetMetadata, AssetRegistry, AssetType};
use crate::assets::{AssetError, AssetResult};
use crate::render::{Renderer2D, Texture2D};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded asset
#[derive(Debug, Clone)]
pub enum Asset {
    /// Uploaded texture
    Texture2D(Texture2D),
}

impl Asset {
    /// Kind of this asset
    pub const fn asset_type(&self) -> AssetType {
        match self {
            Self::Texture2D(_) => AssetType::Texture2D,
        }
    }

    /// The texture, if this is one
    pub const fn as_texture(&self) -> Option<&Texture2D> {
        match self {
            Self::Texture2D(texture) => Some(texture),
        }
    }
}

/// Asset manager used while editing a project
#[derive(Debug)]
pub struct EditorAssetManager {
    asset_directory: PathBuf,
    registry_path: PathBuf,
    registry: AssetRegistry,
    loaded: HashMap<AssetHandle, Asset>,
}

impl EditorAssetManager {
    /// Manager for `asset_directory`, writing its registry to `registry_path`
    pub fn new(asset_directory: impl Into<PathBuf>, registry_path: impl Into<PathBuf>) -> Self {
        Self {
            asset_directory: asset_directory.into(),
            registry_path: registry_path.into(),
            registry: AssetRegistry::new(),
            loaded: HashMap::new(),
        }
    }

    /// Root all asset paths are relative to
    pub fn asset_directory(&self) -> &Path {
        &self.asset_directory
    }

    /// Current registry
    pub const fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.asset_directory)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }

    /// Import a file from the asset directory and register it.
    ///
    /// Textures are loaded right away. The registry document is rewritten
    /// after every successful import. Importing a registered path returns
    /// its existing handle.
    pub fn import_asset(&mut self, path: impl AsRef<Path>, renderer: &mut Renderer2D) -> AssetResult<AssetHandle> {
        let relative = self.relative_path(path.as_ref());
        if let Some(handle) = self.registry.find_by_path(&relative) {
            return Ok(handle);
        }

        let asset_type = AssetType::from_extension(&relative);
        let metadata = AssetMetadata {
            asset_type,
            file_path: relative,
        };
        let handle = AssetHandle::new();

        match asset_type {
            AssetType::Texture2D => {
                let texture = self.load_texture(&metadata.file_path, renderer)?;
                self.loaded.insert(handle, Asset::Texture2D(texture));
            }
            AssetType::Scene => {}
            AssetType::None => return Err(AssetError::UnknownType(metadata.file_path)),
        }

        log::info!("Imported {} '{}' as {handle}", asset_type, metadata.file_path.display());
        self.registry.insert(handle, metadata);
        self.serialize_asset_registry()?;
        Ok(handle)
    }

    /// Loaded asset for a handle, importing it on first use
    pub fn get_asset(&mut self, handle: AssetHandle, renderer: &mut Renderer2D) -> Option<Asset> {
        if !self.is_asset_handle_valid(handle) {
            return None;
        }
        if let Some(asset) = self.loaded.get(&handle) {
            return Some(asset.clone());
        }

        let metadata = self.registry.get(handle)?.clone();
        let asset = match metadata.asset_type {
            AssetType::Texture2D => match self.load_texture(&metadata.file_path, renderer) {
                Ok(texture) => Asset::Texture2D(texture),
                Err(err) => {
                    log::error!("Asset import failed: {err}");
                    return None;
                }
            },
            other => {
                log::error!("No importer available for asset type: {other}");
                return None;
            }
        };
        self.loaded.insert(handle, asset.clone());
        Some(asset)
    }

    /// Whether the handle is non-zero and registered
    pub fn is_asset_handle_valid(&self, handle: AssetHandle) -> bool {
        handle.is_some() && self.registry.contains(handle)
    }

    /// Whether the asset is in memory
    pub fn is_asset_loaded(&self, handle: AssetHandle) -> bool {
        self.loaded.contains_key(&handle)
    }

    /// Metadata for a handle; invalid metadata when unknown
    pub fn get_metadata(&self, handle: AssetHandle) -> AssetMetadata {
        self.registry.get(handle).cloned().unwrap_or_default()
    }

    /// Decode and upload a texture; `path` is relative to the asset directory
    pub fn load_texture(&self, path: &Path, renderer: &mut Renderer2D) -> AssetResult<Texture2D> {
        let image = ImageData::from_file(self.asset_directory.join(path))?;
        let spec = image.specification();
        Ok(renderer.create_texture(spec, Some(&image.data), Some(path.to_path_buf()))?)
    }

    /// Write the registry document
    pub fn serialize_asset_registry(&self) -> AssetResult<()> {
        self.registry.save(&self.registry_path)
    }

    /// Replace the registry with the document on disk
    pub fn deserialize_asset_registry(&mut self) -> AssetResult<()> {
        let registry = AssetRegistry::load(&self.registry_path).map_err(|err| {
            log::error!("Error reading asset registry '{}': {err}", self.registry_path.display());
            err
        })?;
        log::info!("Loaded asset registry with {} asset(s)", registry.len());
        self.registry = registry;
        self.loaded.clear();
        Ok(())
    }
}
