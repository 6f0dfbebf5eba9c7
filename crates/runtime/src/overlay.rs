use egui::Context as EguiContext;
use stagecraft_render_wgpu::FrameStats;
use stagecraft_scene::{PerspectiveCamera, Scene, SceneSummary};

/// Everything the overlay shows for one frame.
pub(crate) struct OverlayInfo<'a> {
    pub fps: f32,
    pub viewport: (u32, u32),
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub stats: FrameStats,
}

impl OverlayInfo<'_> {
    pub fn lines(&self) -> Vec<String> {
        let p = self.camera.position;
        let t = self.camera.target;
        let summary = SceneSummary::of(self.scene);
        vec![
            format!("{:.1} fps", self.fps),
            format!("buffer {}x{}", self.viewport.0, self.viewport.1),
            format!(
                "nodes {}  meshes {}  lights {}",
                summary.nodes, summary.meshes, summary.lights
            ),
            format!("vertices {}  triangles {}", summary.vertices, summary.triangles),
            format!(
                "drawn: {} meshes, {} tris, {} lights",
                self.stats.draws, self.stats.triangles, self.stats.lights
            ),
            format!("camera ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
            format!("target ({:.2}, {:.2}, {:.2})", t.x, t.y, t.z),
        ]
    }
}

pub(crate) fn draw(ctx: &EguiContext, title: &str, info: &OverlayInfo<'_>) {
    egui::Window::new(title)
        .id(egui::Id::new("stage_overlay"))
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            for line in info.lines() {
                ui.monospace(line);
            }
            ui.separator();
            ui.small("F1 overlay  Esc quit");
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use stagecraft_common::Color;
    use stagecraft_scene::{Geometry, Material, Mesh, Node};

    #[test]
    fn lines_report_scene_and_camera() {
        let mut scene = Scene::new();
        scene.add(Node::mesh(Mesh::new(
            Geometry::cube(1.0, 1.0, 1.0),
            Material::phong(Color::from_hex(0x44aa88)),
        )));
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.set_position(Vec3::new(0.0, 0.0, 2.0));

        let info = OverlayInfo {
            fps: 59.94,
            viewport: (800, 600),
            scene: &scene,
            camera: &camera,
            stats: FrameStats {
                draws: 1,
                triangles: 12,
                lights: 0,
            },
        };
        let lines = info.lines();
        assert_eq!(lines[0], "59.9 fps");
        assert_eq!(lines[1], "buffer 800x600");
        assert!(lines[2].contains("meshes 1"));
        assert!(lines[3].contains("vertices 24  triangles 12"));
        assert!(lines[4].contains("1 meshes, 12 tris"));
        assert_eq!(lines[5], "camera (0.00, 0.00, 2.00)");
    }
}
