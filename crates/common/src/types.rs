use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Euler angles in radians, applied in X, then Y, then Z order
/// (the rotation matrix is `Rx * Ry * Rz`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_rotation_x(self.x) * Quat::from_rotation_y(self.y) * Quat::from_rotation_z(self.z)
    }

    /// Recover XYZ angles from a rotation. Near gimbal lock (|Y| ~ 90°) the
    /// Z angle is folded into X.
    pub fn from_quat(q: Quat) -> Self {
        let m = Mat3::from_quat(q.normalize());
        // Column-major: m13 is the x component of the third column.
        let m11 = m.x_axis.x;
        let m12 = m.y_axis.x;
        let m13 = m.z_axis.x;
        let m22 = m.y_axis.y;
        let m23 = m.z_axis.y;
        let m32 = m.y_axis.z;
        let m33 = m.z_axis.z;

        let y = m13.clamp(-1.0, 1.0).asin();
        if m13.abs() < 0.999_999_9 {
            Self::new((-m23).atan2(m33), y, (-m12).atan2(m11))
        } else {
            Self::new(m32.atan2(m22), y, 0.0)
        }
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Decompose an affine matrix. Shear is lost.
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local matrix, `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn euler(&self) -> Euler {
        Euler::from_quat(self.rotation)
    }

    pub fn set_euler(&mut self, euler: Euler) {
        self.rotation = euler.to_quat();
    }
}

/// Size of a drawing surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, `None` for a degenerate (minimized) surface.
    pub fn aspect(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Drawing buffer size for a surface of the given logical size.
    ///
    /// The effective ratio is `device_ratio`, capped at `max_ratio` when a cap
    /// is given. Each side is at least one pixel.
    pub fn drawing_buffer(
        logical_width: f64,
        logical_height: f64,
        device_ratio: f64,
        max_ratio: Option<f64>,
    ) -> Self {
        let ratio = match max_ratio {
            Some(cap) => device_ratio.min(cap),
            None => device_ratio,
        };
        let side = |v: f64| ((v * ratio).round() as u32).max(1);
        Self::new(side(logical_width), side(logical_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn euler_quat_round_trip() {
        let e = Euler::new(0.3, -0.7, 1.1);
        let back = Euler::from_quat(e.to_quat());
        assert!((back.x - e.x).abs() < 1e-4);
        assert!((back.y - e.y).abs() < 1e-4);
        assert!((back.z - e.z).abs() < 1e-4);
    }

    #[test]
    fn euler_applies_x_first_in_matrix_order() {
        let q = Euler::new(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0).to_quat();
        let expected = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)
            * Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(q.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn matrix_decomposition() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::splat(2.0),
        };
        let back = Transform::from_matrix(t.matrix());
        assert!(back.position.abs_diff_eq(t.position, 1e-5));
        assert!(back.scale.abs_diff_eq(t.scale, 1e-5));
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
    }

    #[test]
    fn viewport_aspect() {
        assert_eq!(Viewport::new(200, 100).aspect(), Some(2.0));
        assert_eq!(Viewport::new(200, 0).aspect(), None);
        assert_eq!(Viewport::new(0, 100).aspect(), None);
    }

    #[test]
    fn drawing_buffer_caps_ratio() {
        let capped = Viewport::drawing_buffer(800.0, 600.0, 3.0, Some(2.0));
        assert_eq!(capped, Viewport::new(1600, 1200));

        let uncapped = Viewport::drawing_buffer(800.0, 600.0, 3.0, None);
        assert_eq!(uncapped, Viewport::new(2400, 1800));

        let low_dpi = Viewport::drawing_buffer(800.0, 600.0, 1.0, Some(2.0));
        assert_eq!(low_dpi, Viewport::new(800, 600));
    }

    #[test]
    fn drawing_buffer_never_zero() {
        assert_eq!(
            Viewport::drawing_buffer(0.0, 0.0, 1.0, None),
            Viewport::new(1, 1)
        );
    }
}
