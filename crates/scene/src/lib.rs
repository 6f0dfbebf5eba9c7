//! Scene graph for the stagecraft demos.
//!
//! A [`Scene`] is an arena of nodes (groups, meshes, directional lights) with
//! parent/child links. Renderers read it through [`Scene::meshes`] and
//! [`Scene::lights`]; they never mutate it.
//!
//! # Invariants
//! - Node ids are stable for the lifetime of the scene; nodes are never removed.
//! - A node's world matrix is the product of its ancestors' local matrices.
//! - Invisible nodes hide their whole subtree.

mod camera;
mod geometry;
mod graph;
mod light;
mod material;
mod summary;

pub use camera::PerspectiveCamera;
pub use geometry::{Aabb, Geometry};
pub use graph::{LightDraw, MeshDraw, Node, NodeId, NodeKind, Scene, SceneError};
pub use light::DirectionalLight;
pub use material::{Material, Mesh};
pub use summary::SceneSummary;

pub fn crate_info() -> &'static str {
    "stagecraft-scene v0.1.0"
}
