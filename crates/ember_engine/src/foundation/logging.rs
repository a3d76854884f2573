//! Logging utilities
//!
//! The engine logs through the `log` facade; binaries pick the sink.
//! `init` wires up `env_logger`, honouring `RUST_LOG` on top of the configured level.

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system at `Info`
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize the logging system with an explicit default level.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let result = env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Parse a level name from configuration, defaulting to `Info`
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}
