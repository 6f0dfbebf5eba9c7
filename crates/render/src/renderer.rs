use stagecraft_scene::{NodeKind, PerspectiveCamera, Scene};
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Produces a human-readable dump of the scene. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        let p = camera.position;
        let t = camera.target;
        let _ = writeln!(out, "=== Scene ({} nodes) ===", scene.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            p.x, p.y, p.z, t.x, t.y, t.z, camera.fov, camera.aspect
        );

        let mut depth_of = vec![0usize; scene.len()];
        scene.visit(|id, node, world| {
            let depth = node.parent().map_or(0, |parent| depth_of[parent.0] + 1);
            depth_of[id.0] = depth;

            let pos = world.w_axis;
            let detail = match &node.kind {
                NodeKind::Group => String::new(),
                NodeKind::Mesh(mesh) => format!(
                    " {} tris={} color={}",
                    mesh.material.kind_name(),
                    mesh.geometry.triangle_count(),
                    mesh.material.color()
                ),
                NodeKind::DirectionalLight(light) => {
                    format!(" color={} intensity={:.2}", light.color, light.intensity)
                }
            };
            let _ = writeln!(
                out,
                "{:indent$}[{:.8}] {} {} pos=({:.2}, {:.2}, {:.2}){}",
                "",
                node.uuid.to_string(),
                node.kind.name(),
                node.label(),
                pos.x,
                pos.y,
                pos.z,
                detail,
                indent = 2 + depth * 2
            );
        });

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use stagecraft_common::Color;
    use stagecraft_scene::{DirectionalLight, Geometry, Material, Mesh, Node};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let camera = PerspectiveCamera::default();
        let output = DebugTextRenderer::new().render(&scene, &camera);

        assert!(output.contains("(0 nodes)"));
        assert!(output.contains("fov=50"));
    }

    #[test]
    fn debug_renderer_lists_nodes_with_depth() {
        let mut scene = Scene::new();
        scene.add(
            Node::light(DirectionalLight::new(Color::WHITE, 1.0))
                .with_name("sun")
                .at(Vec3::new(-1.0, 2.0, 4.0)),
        );
        let group = scene.add(Node::group().with_name("model"));
        scene
            .add_child(
                group,
                Node::mesh(Mesh::new(
                    Geometry::cube(1.0, 1.0, 1.0),
                    Material::phong(Color::from_hex(0x44aa88)),
                ))
                .with_name("cube"),
            )
            .unwrap();

        let output = DebugTextRenderer::new().render(&scene, &PerspectiveCamera::default());
        assert!(output.contains("(3 nodes)"));
        assert!(output.contains("light sun pos=(-1.00, 2.00, 4.00) color=#ffffff"));
        assert!(output.contains("    ["));
        assert!(output.contains("mesh cube pos=(0.00, 0.00, 0.00) phong tris=12 color=#44aa88"));
    }
}
