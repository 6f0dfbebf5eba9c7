use glam::Vec3;
use stagecraft_common::Color;

/// Light shining from its node's world position toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Unit vector from a lit surface toward the light, for a light placed at
    /// `position`. A light at the origin shines straight down.
    pub fn direction_to_light(position: Vec3) -> Vec3 {
        position.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> [f32; 3] {
        [
            self.color.r * self.intensity,
            self.color.g * self.intensity,
            self.color.b * self.intensity,
        ]
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_light() {
        let d = DirectionalLight::direction_to_light(Vec3::new(0.0, 200.0, 0.0));
        assert_eq!(d, Vec3::Y);
    }

    #[test]
    fn light_at_origin_falls_back() {
        assert_eq!(DirectionalLight::direction_to_light(Vec3::ZERO), Vec3::Y);
    }

    #[test]
    fn radiance_scales_color() {
        let light = DirectionalLight::new(Color::WHITE, 3.0);
        assert_eq!(light.radiance(), [3.0, 3.0, 3.0]);
    }
}
