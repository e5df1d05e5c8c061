//! GDI handle monitoring core.
//!
//! A single background task samples the watched process, feeds the alert
//! latch and posts display updates to the UI queue.

pub mod alerts;
mod runtime;
mod sample;
mod task;

pub use alerts::{alert_line, AlertLatch, AlertState, ThresholdAlert};
pub use runtime::{wait_for_shutdown, MonitorRuntime, ShutdownSignal, UiMessage, UI_QUEUE_CAPACITY};
pub use sample::Sample;
pub use task::{handle_monitor_task, WAITING_TEXT};
