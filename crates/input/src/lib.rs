//! Pointer input for the stagecraft demos.
//!
//! The runtime translates window-system mouse events into [`PointerEvent`]s;
//! controls consume those, never raw window events.

pub mod gesture;
pub mod orbit;

pub use gesture::{PointerButton, PointerEvent};
pub use orbit::OrbitControls;

pub fn crate_info() -> &'static str {
    "stagecraft-input v0.1.0"
}
