//! Model import for the stagecraft demos.
//!
//! [`load_gltf`] turns a `.gltf`/`.glb` file into a [`Model`] whose scene can
//! be grafted into a live scene with `Scene::add_scene`. [`ModelLoader`] runs
//! the same import on a background thread so the render loop keeps going while
//! a large model loads.
//!
//! Textures are not uploaded to the GPU. The base color texture is sampled on
//! the CPU at each vertex and folded into the vertex colors.

mod import;
mod loader;
mod texture;

use std::path::PathBuf;

pub use import::{Model, load_gltf};
pub use loader::ModelLoader;
pub use texture::Texture;

/// Errors from asset import.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("scene graph error: {0}")]
    Scene(#[from] stagecraft_scene::SceneError),
    #[error("glTF document has no scene")]
    EmptyDocument,
    #[error("model loader thread exited without a result")]
    LoaderGone,
}

pub fn crate_info() -> &'static str {
    "stagecraft-assets v0.1.0"
}
