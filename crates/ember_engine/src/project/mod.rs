//! # Project
//!
//! The project document and path helpers. A project is a directory holding
//! a `.eproj` YAML document, an asset directory with the asset registry, and
//! optionally a script assembly directory.
//!
//! ```yaml
//! Project:
//!   Name: Sandbox
//!   StartScene: 4823791237712
//!   AssetDirectory: Assets
//!   AssetRegistryPath: AssetRegistry.ehr
//!   ScriptModulePath: Scripts/Sandbox
//! ```

use crate::assets::AssetHandle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Reading or writing the project file failed
    #[error("project file '{path}': {source}")]
    Io {
        /// Project file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML for a project
    #[error("error parsing project file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document has no `Project` key
    #[error("project document has no Project key")]
    MissingProjectKey,
}

/// Result type for project operations
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Settings stored in the project document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectConfig {
    /// Display name
    pub name: String,
    /// Scene opened with the project
    #[serde(default)]
    pub start_scene: AssetHandle,
    /// Asset root, relative to the project directory
    pub asset_directory: PathBuf,
    /// Registry document, relative to the asset directory
    #[serde(default = "default_registry_path")]
    pub asset_registry_path: PathBuf,
    /// Script assembly directory, relative to the asset directory
    #[serde(default)]
    pub script_module_path: PathBuf,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("AssetRegistry.ehr")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            start_scene: AssetHandle::NONE,
            asset_directory: PathBuf::from("Assets"),
            asset_registry_path: default_registry_path(),
            script_module_path: PathBuf::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProjectDocument {
    #[serde(default)]
    project: Option<ProjectConfig>,
}

/// A loaded project
#[derive(Debug, Clone, Default)]
pub struct Project {
    config: ProjectConfig,
    project_directory: PathBuf,
}

impl Project {
    /// Fresh project rooted at `project_directory`
    pub fn new(project_directory: impl Into<PathBuf>) -> Self {
        Self {
            config: ProjectConfig::default(),
            project_directory: project_directory.into(),
        }
    }

    /// Read a project document; the project directory is its parent
    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        let project_directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::info!("Loaded project '{}' from {}", config.name, path.display());
        Ok(Self {
            config,
            project_directory,
        })
    }

    /// Parse the text of a project document
    pub fn parse(text: &str) -> ProjectResult<ProjectConfig> {
        let document: ProjectDocument = serde_yaml::from_str(text)?;
        document.project.ok_or(ProjectError::MissingProjectKey)
    }

    /// Write the project document to `path`
    pub fn save_active(&self, path: impl AsRef<Path>) -> ProjectResult<()> {
        let path = path.as_ref();
        let document = ProjectDocument {
            project: Some(self.config.clone()),
        };
        let text = serde_yaml::to_string(&document)?;
        fs::write(path, text).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Project settings
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Mutable project settings
    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    /// Directory the project document lives in
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }

    /// Absolute asset directory
    pub fn asset_directory(&self) -> PathBuf {
        self.project_directory.join(&self.config.asset_directory)
    }

    /// Absolute registry document path
    pub fn asset_registry_path(&self) -> PathBuf {
        self.asset_directory().join(&self.config.asset_registry_path)
    }

    /// Absolute script assembly directory, if the project has one
    pub fn script_module_path(&self) -> Option<PathBuf> {
        if self.config.script_module_path.as_os_str().is_empty() {
            None
        } else {
            Some(self.asset_directory().join(&self.config.script_module_path))
        }
    }

    /// Resolve a path relative to the asset directory
    pub fn asset_file_system_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.asset_directory().join(path)
    }
}
