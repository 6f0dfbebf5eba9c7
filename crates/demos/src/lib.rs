//! The two stagecraft stages: a spinning cube and a glTF model viewer.

mod first_cube;
mod model_viewer;

pub use first_cube::FirstCube;
pub use model_viewer::ModelViewer;

pub fn crate_info() -> &'static str {
    "stagecraft-demos v0.1.0"
}
