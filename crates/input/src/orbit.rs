use crate::gesture::{PointerButton, PointerEvent};
use glam::{Vec2, Vec3};
use stagecraft_common::Viewport;
use stagecraft_scene::PerspectiveCamera;
use std::f32::consts::{PI, TAU};

const POLAR_EPSILON: f32 = 1e-6;
/// Closest the camera may get to its target, whatever `min_distance` says.
const MIN_RADIUS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
    Dolly,
}

/// Orbits a camera around a target point.
///
/// Primary drag rotates, secondary drag pans in the view plane, middle drag
/// and the wheel dolly toward or away from the target. The camera is updated
/// as events arrive.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Vec3,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    radius: f32,
    /// Azimuth around +Y, zero on +Z.
    theta: f32,
    phi: f32,
    cursor: Option<Vec2>,
    drag: Option<Drag>,
}

impl OrbitControls {
    /// Controls orbiting the camera's current target from its current position.
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let mut controls = Self {
            enabled: true,
            target: camera.target,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            cursor: None,
            drag: None,
        };
        controls.sync_from(camera);
        controls
    }

    /// Re-read spherical state after the camera was moved by other code.
    pub fn sync_from(&mut self, camera: &PerspectiveCamera) {
        self.target = camera.target;
        let offset = camera.position - self.target;
        self.radius = offset.length();
        if self.radius > 0.0 {
            self.theta = offset.x.atan2(offset.z);
            self.phi = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
        }
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    pub fn polar(&self) -> f32 {
        self.phi
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Feed one pointer event. Returns whether the camera moved.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        viewport: Viewport,
        camera: &mut PerspectiveCamera,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            PointerEvent::Down(button) => {
                let drag = match button {
                    PointerButton::Primary => Drag::Rotate,
                    PointerButton::Secondary => Drag::Pan,
                    PointerButton::Middle => Drag::Dolly,
                };
                tracing::debug!(?drag, "orbit drag started");
                self.drag = Some(drag);
                false
            }
            PointerEvent::Up(_) | PointerEvent::Left => {
                if let Some(drag) = self.drag.take() {
                    tracing::debug!(?drag, "orbit drag ended");
                }
                false
            }
            PointerEvent::Moved { x, y } => {
                let pos = Vec2::new(x, y);
                let last = self.cursor.replace(pos);
                let (Some(drag), Some(last)) = (self.drag, last) else {
                    return false;
                };
                let delta = pos - last;
                if delta == Vec2::ZERO || viewport.is_empty() {
                    return false;
                }
                let height = viewport.height as f32;
                match drag {
                    Drag::Rotate => {
                        self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                        self.rotate_up(TAU * delta.y / height * self.rotate_speed);
                    }
                    Drag::Pan => self.pan(delta, height, camera),
                    Drag::Dolly => {
                        if delta.y > 0.0 {
                            self.dolly(1.0 / self.zoom_scale());
                        } else {
                            self.dolly(self.zoom_scale());
                        }
                    }
                }
                self.apply(camera);
                true
            }
            PointerEvent::Wheel { delta } => {
                if delta < 0.0 {
                    self.dolly(self.zoom_scale());
                } else if delta > 0.0 {
                    self.dolly(1.0 / self.zoom_scale());
                } else {
                    return false;
                }
                self.apply(camera);
                true
            }
        }
    }

    /// Write the orbit state into the camera.
    pub fn apply(&mut self, camera: &mut PerspectiveCamera) {
        let min_phi = self.min_polar_angle.max(POLAR_EPSILON);
        let max_phi = self.max_polar_angle.min(PI - POLAR_EPSILON);
        self.phi = self.phi.clamp(min_phi, max_phi.max(min_phi));
        let min_radius = self.min_distance.max(MIN_RADIUS);
        self.radius = self.radius.clamp(min_radius, self.max_distance.max(min_radius));

        let sin_phi = self.phi.sin();
        let offset = Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.phi -= angle;
    }

    /// Scale the orbit radius; `< 1` moves closer.
    fn dolly(&mut self, scale: f32) {
        self.radius = (self.radius * scale).max(self.min_distance.max(MIN_RADIUS));
    }

    fn pan(&mut self, delta: Vec2, height: f32, camera: &PerspectiveCamera) {
        let target_distance = self.radius * (camera.fov.to_radians() / 2.0).tan();
        let forward = camera.forward();
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);

        let dx = 2.0 * delta.x * target_distance / height * self.pan_speed;
        let dy = 2.0 * delta.y * target_distance / height * self.pan_speed;
        self.target += -right * dx + up * dy;
    }
}
