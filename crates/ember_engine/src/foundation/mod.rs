//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and transform composition
//! - Frame timing
//! - Logging setup
//! - Persistent identifiers

pub mod id;
pub mod logging;
pub mod math;
pub mod time;
