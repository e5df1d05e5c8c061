// HandleIt Library - Public API

// Re-export error types
pub mod error;
pub use error::{HandleItError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use self::core::settings::{Settings, SettingsStore};

// Initialize logging
pub fn init_logging() {
    // Warn by default so log lines don't break the in-place display
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
