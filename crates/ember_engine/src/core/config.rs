//! # Engine Configuration
//!
//! Typed configuration for every subsystem of the runtime. All structs are
//! serde-serializable and load through the [`Config`] trait from TOML or RON.
//!
//! ## Configuration Categories
//!
//! - **Renderer**: batch capacities, texture slots, line width
//! - **Physics**: gravity, fixed timestep, solver iterations
//! - **Scripting**: base assembly override and hot-reload polling

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::config::{Config, ConfigError};

/// Upper bound on texture slots a single batch may bind
pub const MAX_TEXTURE_SLOTS: usize = 32;

/// # Renderer Configuration
///
/// Capacities of the 2D batch renderer. The defaults are the reference limits:
/// 20,000 quads per batch and 32 texture slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Maximum quads (and circles, glyphs) per batch
    pub max_quads: usize,
    /// Texture slots per batch, slot 0 being the white texture
    pub max_texture_slots: usize,
    /// Initial width of batched lines
    pub line_width: f32,
}

impl RendererConfig {
    /// Reference batch capacity
    pub const DEFAULT_MAX_QUADS: usize = 20_000;

    /// Create the default renderer configuration
    pub const fn new() -> Self {
        Self {
            max_quads: Self::DEFAULT_MAX_QUADS,
            max_texture_slots: MAX_TEXTURE_SLOTS,
            line_width: 2.0,
        }
    }

    /// Set the per-batch quad capacity
    pub const fn with_max_quads(mut self, max_quads: usize) -> Self {
        self.max_quads = max_quads;
        self
    }

    /// Set the texture slot count
    pub const fn with_max_texture_slots(mut self, slots: usize) -> Self {
        self.max_texture_slots = slots;
        self
    }

    /// Maximum vertices per quad batch
    pub const fn max_vertices(&self) -> usize {
        self.max_quads * 4
    }

    /// Maximum indices per quad batch
    pub const fn max_indices(&self) -> usize {
        self.max_quads * 6
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_quads == 0 {
            return Err(ConfigError::Invalid("max_quads must be at least 1".to_string()));
        }
        if !(2..=MAX_TEXTURE_SLOTS).contains(&self.max_texture_slots) {
            return Err(ConfigError::Invalid(format!(
                "max_texture_slots must be between 2 and {MAX_TEXTURE_SLOTS}"
            )));
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Physics Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity
    pub gravity: [f32; 2],
    /// Seconds advanced per physics step
    pub fixed_timestep: f32,
    /// Solver velocity iterations
    pub velocity_iterations: usize,
    /// Solver position (stabilization) iterations
    pub position_iterations: usize,
}

impl PhysicsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid("fixed_timestep must be positive".to_string()));
        }
        if self.velocity_iterations < self.position_iterations {
            return Err(ConfigError::Invalid(
                "velocity_iterations must be >= position_iterations".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.8],
            fixed_timestep: 1.0 / 60.0,
            velocity_iterations: 6,
            position_iterations: 2,
        }
    }
}

/// # Scripting Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Replaces the embedded base assembly when set
    pub core_assembly_path: Option<PathBuf>,
    /// Watch the app assembly and reload on change
    pub hot_reload: bool,
    /// Watcher polling interval
    pub watch_interval_ms: u64,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            core_assembly_path: None,
            hot_reload: true,
            watch_interval_ms: 500,
        }
    }
}

/// # Engine Configuration
///
/// Root configuration loaded by applications at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Renderer limits
    pub renderer: RendererConfig,
    /// Physics parameters
    pub physics: PhysicsConfig,
    /// Script host options
    pub scripting: ScriptingConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            renderer: RendererConfig::default(),
            physics: PhysicsConfig::default(),
            scripting: ScriptingConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Replace the renderer configuration
    pub const fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = renderer;
        self
    }

    /// Disable or enable script hot reload
    pub const fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.scripting.hot_reload = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.renderer.validate()?;
        self.physics.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}
