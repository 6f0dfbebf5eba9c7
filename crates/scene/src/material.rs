use crate::geometry::Geometry;
use stagecraft_common::Color;
use std::sync::Arc;

/// Surface description consumed by the lit pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Blinn-Phong surface.
    Phong {
        color: Color,
        specular: Color,
        shininess: f32,
    },
    /// Metallic-roughness surface, as imported from glTF.
    Standard {
        color: Color,
        metallic: f32,
        roughness: f32,
    },
}

impl Material {
    /// Phong material with the usual specular (`0x111111`) and shininess (30).
    pub fn phong(color: Color) -> Self {
        Material::Phong {
            color,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }

    pub fn standard(color: Color) -> Self {
        Material::Standard {
            color,
            metallic: 1.0,
            roughness: 1.0,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Material::Phong { color, .. } | Material::Standard { color, .. } => *color,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Material::Phong { .. } => "phong",
            Material::Standard { .. } => "standard",
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::phong(Color::WHITE)
    }
}

/// Geometry paired with a material.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phong_defaults() {
        let m = Material::phong(Color::from_hex(0x44aa88));
        match m {
            Material::Phong {
                specular,
                shininess,
                ..
            } => {
                assert_eq!(specular.to_hex(), 0x111111);
                assert_eq!(shininess, 30.0);
            }
            _ => panic!("expected phong"),
        }
        assert_eq!(m.color().to_hex(), 0x44aa88);
    }

    #[test]
    fn shared_geometry() {
        let mesh = Mesh::new(Geometry::cube(1.0, 1.0, 1.0), Material::default());
        let copy = mesh.clone();
        assert!(Arc::ptr_eq(&mesh.geometry, &copy.geometry));
        assert_eq!(copy.material.kind_name(), "phong");
    }
}
