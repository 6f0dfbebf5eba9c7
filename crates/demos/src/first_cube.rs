use glam::Vec3;
use stagecraft_common::{Color, Euler};
use stagecraft_runtime::{RendererOptions, Stage};
use stagecraft_scene::{
    DirectionalLight, Geometry, Material, Mesh, Node, NodeId, PerspectiveCamera, Scene,
};

/// A Phong-shaded cube spinning about X and Y at one radian per second,
/// lit by a single directional light.
pub struct FirstCube {
    scene: Scene,
    camera: PerspectiveCamera,
    cube: NodeId,
}

impl FirstCube {
    pub const TITLE: &'static str = "First cube";
    pub const CUBE_COLOR: u32 = 0x44aa88;

    pub fn new() -> Self {
        let mut camera = PerspectiveCamera::new(75.0, 2.0, 0.1, 100.0);
        camera.set_position(Vec3::new(0.0, 0.0, 2.0));

        let mut scene = Scene::new();
        scene.add(
            Node::light(DirectionalLight::new(Color::WHITE, 1.0))
                .with_name("light")
                .at(Vec3::new(-1.0, 2.0, 4.0)),
        );
        let cube = scene.add(
            Node::mesh(Mesh::new(
                Geometry::cube(1.0, 1.0, 1.0),
                Material::phong(Color::from_hex(Self::CUBE_COLOR)),
            ))
            .with_name("cube"),
        );

        Self {
            scene,
            camera,
            cube,
        }
    }

    pub fn cube(&self) -> NodeId {
        self.cube
    }

    /// Current cube rotation.
    pub fn rotation(&self) -> Euler {
        self.scene
            .node(self.cube)
            .map(|node| node.transform.euler())
            .unwrap_or_default()
    }
}

impl Default for FirstCube {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for FirstCube {
    fn title(&self) -> &str {
        Self::TITLE
    }

    fn options(&self) -> RendererOptions {
        RendererOptions {
            antialias: true,
            max_pixel_ratio: Some(2.0),
            ..RendererOptions::default()
        }
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    fn update(&mut self, time_ms: f64) {
        let t = (time_ms * 0.001) as f32;
        if let Some(node) = self.scene.node_mut(self.cube) {
            node.transform.set_euler(Euler::new(t, t, 0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagecraft_common::Viewport;
    use stagecraft_runtime::sync_camera;
    use stagecraft_scene::{NodeKind, SceneSummary};

    #[test]
    fn scene_has_light_and_cube() {
        let stage = FirstCube::new();
        let summary = SceneSummary::of(stage.scene());
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.lights, 1);
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.triangles, 12);

        let lights = stage.scene().lights();
        assert_eq!(lights[0].position, Vec3::new(-1.0, 2.0, 4.0));
        assert_eq!(lights[0].light.intensity, 1.0);

        let Some(NodeKind::Mesh(mesh)) = stage.scene().node(stage.cube()).map(|n| &n.kind) else {
            panic!("cube node is not a mesh");
        };
        assert_eq!(mesh.material, Material::phong(Color::from_hex(0x44aa88)));
    }

    #[test]
    fn camera_matches_demo_setup() {
        let stage = FirstCube::new();
        let camera = stage.camera();
        assert_eq!(camera.fov, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 2.0));
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn update_rotates_one_radian_per_second() {
        let mut stage = FirstCube::new();
        stage.update(0.0);
        assert_eq!(stage.rotation(), Euler::default());

        stage.update(1500.0);
        let r = stage.rotation();
        assert!((r.x - 1.5).abs() < 1e-5);
        assert!((r.y - 1.5).abs() < 1e-5);
        assert!(r.z.abs() < 1e-5);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let options = FirstCube::new().options();
        assert_eq!(options.max_pixel_ratio, Some(2.0));
        assert!(options.antialias);
        assert_eq!(options.clear_color, Color::BLACK);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut stage = FirstCube::new();
        assert!(sync_camera(stage.camera_mut(), Viewport::new(1920, 1080)));
        assert!((stage.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
