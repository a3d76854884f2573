//! # Assets
//!
//! Asset handles and the registry document, image decoding and the editor
//! asset manager.

pub mod image;
pub mod manager;
pub mod registry;

pub use self::image::ImageData;
pub use manager::{Asset, EditorAssetManager};
pub use registry::{AssetHandle, AssetMetadata, AssetRegistry, AssetType};

use crate::render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Reading or writing a file failed
    #[error("asset file '{path}': {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// An image could not be decoded
    #[error("could not load texture from '{path}': {source}")]
    Image {
        /// Image path
        path: PathBuf,
        /// Decoder error
        #[source]
        source: ::image::ImageError,
    },

    /// A registry document could not be parsed
    #[error("invalid asset registry: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The registry document has no `AssetRegistry` key
    #[error("asset registry document has no AssetRegistry key")]
    MissingRegistryKey,

    /// The file extension maps to no asset type
    #[error("no asset type for '{0}'")]
    UnknownType(PathBuf),

    /// Uploading to the graphics backend failed
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
