use crate::AssetError;
use crate::texture::Texture;
use glam::{Quat, Vec3};
use stagecraft_common::{Color, Transform};
use stagecraft_scene::{Geometry, Material, Mesh, Node, NodeId, Scene};
use std::path::Path;

/// A loaded model: its own scene graph, ready to graft into a live scene.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub scene: Scene,
}

/// Import a `.gltf` or `.glb` file.
///
/// The default scene (or the first one) is imported with its node hierarchy
/// and local transforms. Every triangle primitive becomes a mesh node under
/// the node that owns the glTF mesh.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<Model, AssetError> {
    let path = path.as_ref();
    std::fs::metadata(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (document, buffers, images) = gltf::import(path)?;
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::EmptyDocument)?;

    let textures: Vec<Option<Texture>> = images.iter().map(Texture::from_gltf).collect();

    let mut scene = Scene::new();
    let mut importer = Importer {
        buffers: &buffers,
        textures: &textures,
        scene: &mut scene,
    };
    for node in gltf_scene.nodes() {
        importer.node(&node, None)?;
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    tracing::info!(
        model = %name,
        nodes = scene.len(),
        meshes = scene.meshes().len(),
        "glTF model imported"
    );

    Ok(Model { name, scene })
}

struct Importer<'a> {
    buffers: &'a [gltf::buffer::Data],
    textures: &'a [Option<Texture>],
    scene: &'a mut Scene,
}

impl Importer<'_> {
    fn node(&mut self, node: &gltf::Node, parent: Option<NodeId>) -> Result<(), AssetError> {
        let (translation, rotation, scale) = node.transform().decomposed();
        let mut scene_node = Node::group().with_transform(Transform {
            position: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        });
        scene_node.name = node.name().map(str::to_string);

        let id = match parent {
            Some(p) => self.scene.add_child(p, scene_node)?,
            None => self.scene.add(scene_node),
        };

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if let Some(mesh_node) = self.primitive(&mesh, &primitive) {
                    self.scene.add_child(id, mesh_node)?;
                }
            }
        }

        for child in node.children() {
            self.node(&child, Some(id))?;
        }
        Ok(())
    }

    fn primitive(&self, mesh: &gltf::Mesh, primitive: &gltf::mesh::Primitive) -> Option<Node> {
        let label = mesh.name().unwrap_or("unnamed");
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!(mesh = label, mode = ?primitive.mode(), "skipping non-triangle primitive");
            return None;
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            tracing::warn!(mesh = label, "skipping primitive without positions");
            return None;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|n| n.collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let mut geometry = Geometry::new(positions, normals, indices);

        if let Some(colors) = reader.read_colors(0) {
            for (dst, src) in geometry.colors.iter_mut().zip(colors.into_rgb_f32()) {
                *dst = src;
            }
        }

        let pbr = primitive.material().pbr_metallic_roughness();
        if let Some(info) = pbr.base_color_texture() {
            let texture = self
                .textures
                .get(info.texture().source().index())
                .and_then(Option::as_ref);
            let uvs = reader.read_tex_coords(info.tex_coord());
            if let (Some(texture), Some(uvs)) = (texture, uvs) {
                bake_texture(&mut geometry.colors, texture, uvs.into_f32());
            }
        }

        let [r, g, b, _] = pbr.base_color_factor();
        let material = Material::Standard {
            color: Color::from_linear(r, g, b),
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
        };

        let mut node = Node::mesh(Mesh::new(geometry, material));
        node.name = primitive
            .material()
            .name()
            .map(|m| format!("{label}/{m}"))
            .or_else(|| mesh.name().map(str::to_string));
        Some(node)
    }
}

/// Multiply each vertex color by the texel under its UV.
fn bake_texture(colors: &mut [[f32; 3]], texture: &Texture, uvs: impl Iterator<Item = [f32; 2]>) {
    for (color, uv) in colors.iter_mut().zip(uvs) {
        let texel = texture.sample_linear(uv);
        for (c, t) in color.iter_mut().zip(texel) {
            *c *= t;
        }
    }
}
