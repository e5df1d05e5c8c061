// Platform-specific code module

pub mod gui_resources;
pub mod process;

// Re-exports for cleaner imports
pub use gui_resources::{gdi_handle_quota, gdi_object_count, DEFAULT_GDI_HANDLE_QUOTA};
pub use process::{image_stem, ProcessProbe, SystemProcessProbe};
