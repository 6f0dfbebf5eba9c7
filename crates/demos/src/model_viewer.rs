use glam::Vec3;
use stagecraft_assets::{Model, ModelLoader};
use stagecraft_common::{Color, Viewport};
use stagecraft_input::{OrbitControls, PointerEvent};
use stagecraft_runtime::{RendererOptions, Stage, ToneMapping};
use stagecraft_scene::{DirectionalLight, Node, NodeId, PerspectiveCamera, Scene, SceneSummary};
use std::path::{Path, PathBuf};

const LIGHT_POSITIONS: [Vec3; 3] = [
    Vec3::new(0.0, 200.0, 0.0),
    Vec3::new(100.0, 200.0, 100.0),
    Vec3::new(-100.0, -200.0, -100.0),
];

/// A glTF model under three directional lights, inspected with orbit controls.
///
/// The model loads in the background; until it arrives (or if it fails) the
/// empty, lit scene keeps rendering.
pub struct ModelViewer {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    loader: Option<ModelLoader>,
    model: Option<NodeId>,
}

impl ModelViewer {
    pub const TITLE: &'static str = "Model viewer";
    pub const DEFAULT_MODEL: &'static str = "realistic_human_heart.glb";
    pub const CLEAR_COLOR: u32 = 0x2c3e50;

    /// Lit scene and camera, nothing loading.
    pub fn new() -> Self {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.01, 5.0);
        camera.set_position(Vec3::new(0.0, 1.0, 1.3));
        camera.look_at(Vec3::ZERO);
        let controls = OrbitControls::from_camera(&camera);

        let mut scene = Scene::new();
        for (i, position) in LIGHT_POSITIONS.into_iter().enumerate() {
            scene.add(
                Node::light(DirectionalLight::new(Color::WHITE, 3.0))
                    .with_name(format!("light-{i}"))
                    .at(position),
            );
        }

        Self {
            scene,
            camera,
            controls,
            loader: None,
            model: None,
        }
    }

    /// Viewer that starts loading `path` immediately.
    pub fn with_model(path: impl Into<PathBuf>) -> Self {
        let mut viewer = Self::new();
        viewer.load(path);
        viewer
    }

    /// Start loading a model in the background. Replaces any load in progress.
    pub fn load(&mut self, path: impl Into<PathBuf>) {
        self.loader = Some(ModelLoader::spawn(path));
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_some()
    }

    pub fn loading_path(&self) -> Option<&Path> {
        self.loader.as_ref().map(ModelLoader::path)
    }

    /// The group holding the loaded model, once it has arrived.
    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Graft a loaded model into the scene under a group named after it.
    pub fn add_model(&mut self, model: Model) -> NodeId {
        let group = self.scene.add_scene_named(model.scene, Some(model.name));
        self.model = Some(group);
        group
    }

    fn poll_loader(&mut self) {
        let Some(loader) = &mut self.loader else {
            return;
        };
        let Some(result) = loader.poll() else {
            return;
        };
        let path = loader.path().display().to_string();
        self.loader = None;

        match result {
            Ok(model) => {
                self.add_model(model);
                tracing::info!(path = %path, "{}", SceneSummary::of(&self.scene));
            }
            Err(e) => {
                tracing::error!(path = %path, "failed to load model: {e}");
            }
        }
    }
}

impl Default for ModelViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ModelViewer {
    fn title(&self) -> &str {
        Self::TITLE
    }

    fn options(&self) -> RendererOptions {
        RendererOptions {
            antialias: true,
            clear_color: Color::from_hex(Self::CLEAR_COLOR),
            max_pixel_ratio: None,
            exposure: 0.5,
            tone_mapping: ToneMapping::None,
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

    fn update(&mut self, _time_ms: f64) {
        self.poll_loader();
    }

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        self.controls.handle(event, viewport, &mut self.camera);
    }
}
