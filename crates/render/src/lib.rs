//! Rendering interface shared by every backend.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - A frame is a pure function of scene, camera and renderer state.

mod renderer;

pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "stagecraft-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
