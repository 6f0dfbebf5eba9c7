use crate::options::RendererOptions;
use stagecraft_common::Viewport;
use stagecraft_input::PointerEvent;
use stagecraft_scene::{PerspectiveCamera, Scene};

/// A scene, its camera and per-frame behavior, driven by [`crate::run`].
pub trait Stage {
    /// Window title.
    fn title(&self) -> &str;

    /// Renderer defaults for this stage.
    fn options(&self) -> RendererOptions {
        RendererOptions::default()
    }

    fn scene(&self) -> &Scene;

    fn camera(&self) -> &PerspectiveCamera;

    fn camera_mut(&mut self) -> &mut PerspectiveCamera;

    /// Called once per frame before drawing, with milliseconds since the loop started.
    fn update(&mut self, time_ms: f64);

    /// Pointer input in window pixels.
    fn pointer(&mut self, _event: PointerEvent, _viewport: Viewport) {}

    /// Called after the camera has been synced to a new drawing buffer size.
    fn resized(&mut self, _viewport: Viewport) {}
}

/// Match the camera's aspect to `viewport` and rebuild its projection.
///
/// Returns `false` and leaves the camera alone for a zero-sized viewport.
pub fn sync_camera(camera: &mut PerspectiveCamera, viewport: Viewport) -> bool {
    let Some(aspect) = viewport.aspect() else {
        return false;
    };
    camera.aspect = aspect;
    camera.update_projection_matrix();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn sync_updates_aspect_and_projection() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        let before = camera.projection_matrix();

        assert!(sync_camera(&mut camera, Viewport::new(1600, 900)));
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);

        let expected = Mat4::perspective_rh(75f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        assert!(camera.projection_matrix().abs_diff_eq(expected, 1e-5));
        assert_ne!(camera.projection_matrix(), before);
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut camera = PerspectiveCamera::new(75.0, 1.5, 0.1, 100.0);
        let before = camera.projection_matrix();
        assert!(!sync_camera(&mut camera, Viewport::new(0, 720)));
        assert!(!sync_camera(&mut camera, Viewport::new(1280, 0)));
        assert_eq!(camera.aspect, 1.5);
        assert_eq!(camera.projection_matrix(), before);
    }

    struct Empty {
        scene: Scene,
        camera: PerspectiveCamera,
    }

    impl Stage for Empty {
        fn title(&self) -> &str {
            "empty"
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
        fn update(&mut self, _time_ms: f64) {}
    }

    #[test]
    fn default_hooks_are_no_ops() {
        let mut stage = Empty {
            scene: Scene::new(),
            camera: PerspectiveCamera::default(),
        };
        let before = stage.camera.position;
        stage.pointer(PointerEvent::Wheel { delta: -1.0 }, Viewport::new(10, 10));
        stage.resized(Viewport::new(10, 10));
        assert_eq!(stage.camera().position, before);
        assert_eq!(stage.options(), RendererOptions::default());
        assert_eq!(stage.title(), "empty");
    }
}
