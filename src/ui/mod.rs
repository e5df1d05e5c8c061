//! Terminal presentation of the handle counter.

mod overlay;
mod theme;

pub use overlay::{run_overlay, Overlay};
pub use theme::Palette;
