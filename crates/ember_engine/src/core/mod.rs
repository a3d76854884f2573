//! # Core Engine Module
//!
//! Shared engine-wide pieces that every subsystem depends on.
//!
//! ## Organization
//!
//! - **Config**: typed configuration for renderer, physics and scripting
//! - **Tasks**: the deferred main-thread task queue

pub mod config;
pub mod tasks;

pub use config::{Config, ConfigError, EngineConfig, PhysicsConfig, RendererConfig, ScriptingConfig};
pub use tasks::{MainThreadQueue, MainThreadSender, MainThreadTask};
