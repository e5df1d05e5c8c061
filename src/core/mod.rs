// Core business logic module

pub mod handle_monitor;
pub mod settings;

// Re-export commonly used items
pub use handle_monitor::{AlertLatch, MonitorRuntime, ShutdownSignal, UiMessage};
pub use settings::{Settings, SettingsStore};
