//! Shared value types used by every stagecraft crate.
//!
//! Nothing in here touches the GPU or the window system.

mod color;
mod types;

pub use color::{Color, ColorError, linear_to_srgb, srgb_to_linear};
pub use types::{Euler, Transform, Viewport};

pub fn crate_info() -> &'static str {
    "stagecraft-common v0.1.0"
}
