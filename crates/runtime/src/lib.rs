//! Window, event loop and animation loop for stagecraft stages.
//!
//! [`run`] opens a window sized from [`RendererOptions`], then once per
//! display refresh calls [`Stage::update`] and draws the stage's scene with
//! [`stagecraft_render_wgpu::WgpuRenderer`]. Resizes keep the camera aspect
//! in step with the drawing buffer via [`sync_camera`].
//!
//! Keys: Escape closes the window, F1 toggles the stats overlay.

mod app;
mod clock;
mod options;
mod overlay;
mod stage;

pub use app::{RuntimeError, buffer_size, run, wheel_event};
pub use clock::{FrameClock, FrameTime};
pub use options::{ConfigError, RendererOptions};
pub use stage::{Stage, sync_camera};
pub use stagecraft_render_wgpu::ToneMapping;

pub fn crate_info() -> &'static str {
    "stagecraft-runtime v0.1.0"
}
