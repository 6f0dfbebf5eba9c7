use crate::graph::{NodeKind, Scene};
use std::fmt;

/// Read-only counts over a scene, for logs, overlays and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub lights: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl SceneSummary {
    pub fn of(scene: &Scene) -> Self {
        let mut summary = SceneSummary {
            nodes: scene.len(),
            ..Default::default()
        };
        for (_, node) in scene.nodes() {
            match &node.kind {
                NodeKind::Mesh(mesh) => {
                    summary.meshes += 1;
                    summary.vertices += mesh.geometry.vertex_count();
                    summary.triangles += mesh.geometry.triangle_count();
                }
                NodeKind::DirectionalLight(_) => summary.lights += 1,
                NodeKind::Group => {}
            }
        }
        summary
    }
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} lights={} vertices={} triangles={}",
            self.nodes, self.meshes, self.lights, self.vertices, self.triangles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirectionalLight, Geometry, Material, Mesh, Node};

    #[test]
    fn counts_meshes_and_lights() {
        let mut scene = Scene::new();
        scene.add(Node::light(DirectionalLight::default()));
        scene.add(Node::mesh(Mesh::new(
            Geometry::cube(1.0, 1.0, 1.0),
            Material::default(),
        )));
        scene.add(Node::group());

        let s = SceneSummary::of(&scene);
        assert_eq!(s.nodes, 3);
        assert_eq!(s.meshes, 1);
        assert_eq!(s.lights, 1);
        assert_eq!(s.vertices, 24);
        assert_eq!(s.triangles, 12);
        assert!(s.to_string().contains("meshes=1"));
    }
}
