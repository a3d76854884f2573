//! # Scripting
//!
//! Bridges entities to script objects written in Rhai.
//!
//! ## Architecture
//!
//! ```text
//! app assembly dir ──scan──▶ ScriptClass (fields reflected)
//!                                  │
//! ScriptComponent ──runtime start──▶ ScriptInstance ◀── field cache
//!                                  │                    (per entity)
//!                    native API ◀──┘ (scene storage lent per callback)
//! ```
//!
//! The field cache is keyed by persistent entity id and outlives instances,
//! assembly reloads and scene copies. Reloads are requested by
//! [`AssemblyWatcher`] and executed on the main thread.

pub mod api;
pub mod class;
pub mod engine;
pub mod field;
pub mod native;
pub mod watcher;

pub use api::{ScriptContext, CORE_SOURCE};
pub use class::{ScriptClass, ScriptInstance};
pub use engine::ScriptEngine;
pub use field::{
    EntityHandle, ScriptField, ScriptFieldInstance, ScriptFieldMap, ScriptFieldType, MAX_SCRIPT_FIELD_BUFFER_SIZE,
};
pub use native::{NativeScriptContext, ScriptableEntity};
pub use watcher::AssemblyWatcher;
/// Value type script fields are read and written as
pub use rhai::Dynamic;

use std::path::PathBuf;
use thiserror::Error;

/// Scripting errors
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Reading an assembly file failed
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File or directory being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A class or the base module did not compile
    #[error("failed to compile {class}: {message}")]
    Compile {
        /// Class being compiled
        class: String,
        /// Compiler message
        message: String,
    },

    /// Top-level statements of a class failed during field reflection
    #[error("failed to evaluate {class}: {message}")]
    Evaluation {
        /// Class being reflected
        class: String,
        /// Evaluation message
        message: String,
    },

    /// A callback raised an error
    #[error("{class}::{function} failed: {message}")]
    Runtime {
        /// Class of the instance
        class: String,
        /// Callback name
        function: String,
        /// Error message
        message: String,
    },

    /// No class with this name was discovered
    #[error("script class '{0}' not found")]
    ClassNotFound(String),

    /// The class has no public field with this name
    #[error("field '{field}' does not exist in class '{class}'")]
    FieldNotFound {
        /// Class name
        class: String,
        /// Field name
        field: String,
    },

    /// The value does not match the field kind
    #[error("value for field '{field}' is not a valid {expected}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Declared kind
        expected: ScriptFieldType,
    },

    /// No app assembly has been loaded
    #[error("no app assembly loaded")]
    NoAppAssembly,
}

/// Result type for scripting operations
pub type ScriptResult<T> = Result<T, ScriptError>;
