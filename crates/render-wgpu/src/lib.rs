//! wgpu render backend for the stagecraft demos.
//!
//! Draws every visible mesh of a scene with one lit pipeline: Blinn-Phong for
//! Phong materials, an approximate metallic-roughness model for Standard
//! materials, up to [`MAX_LIGHTS`] directional lights.
//!
//! # Invariants
//! - The renderer never mutates the scene or camera.
//! - Geometry is uploaded once per `Geometry::uuid` and dropped when no longer drawn.
//! - Depth and multisample targets always match the drawing buffer size; a
//!   buffer smaller than the surface is drawn offscreen and stretched onto it.

mod gpu;
mod shaders;
mod upscale;

pub use gpu::{FrameStats, MAX_LIGHTS, RenderSettings, ToneMapping, WgpuRenderer};
