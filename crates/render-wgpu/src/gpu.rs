use crate::shaders;
use crate::upscale::Upscaler;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use stagecraft_common::Color;
use stagecraft_scene::{Geometry, LightDraw, Material, MeshDraw, PerspectiveCamera, Scene};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use wgpu::util::DeviceExt;

/// Directional lights beyond this count are ignored.
pub const MAX_LIGHTS: usize = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuLight {
    direction: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    params: [f32; 4],
    lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    normal_0: [f32; 4],
    normal_1: [f32; 4],
    normal_2: [f32; 4],
    color: [f32; 4],
    specular: [f32; 4],
    material: [f32; 4],
}

/// Tone mapping applied to lit color before output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToneMapping {
    /// Lit color is written as is; exposure has no effect.
    #[default]
    None,
    /// Lit color is scaled by the exposure.
    Linear,
}

/// Renderer configuration fixed at creation time, except the clear color,
/// exposure and tone mapping which may change between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub clear_color: Color,
    pub exposure: f32,
    pub tone_mapping: ToneMapping,
    /// 1 disables multisampling.
    pub sample_count: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            exposure: 1.0,
            tone_mapping: ToneMapping::None,
            sample_count: 1,
        }
    }
}

impl RenderSettings {
    /// Factor applied to lit color in the shader.
    pub fn output_scale(&self) -> f32 {
        match self.tone_mapping {
            ToneMapping::None => 1.0,
            ToneMapping::Linear => self.exposure,
        }
    }
}

/// Counts for the frame just drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: u32,
    pub triangles: u64,
    pub lights: u32,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u32,
    meshes: HashMap<Uuid, GpuMesh>,
    depth_texture: wgpu::TextureView,
    msaa_texture: Option<wgpu::TextureView>,
    upscaler: Upscaler,
    surface_format: wgpu::TextureFormat,
    settings: RenderSettings,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        settings: RenderSettings,
    ) -> Self {
        let settings = RenderSettings {
            sample_count: settings.sample_count.max(1),
            ..settings
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LIT_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                            9 => Float32x4,
                            10 => Float32x4,
                            11 => Float32x4,
                            12 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: settings.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let instance_capacity = 64u32;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);

        let depth_texture = Self::create_depth_texture(device, width, height, settings.sample_count);
        let msaa_texture = Self::create_msaa_texture(
            device,
            surface_format,
            width,
            height,
            settings.sample_count,
        );

        tracing::debug!(
            format = ?surface_format,
            samples = settings.sample_count,
            "wgpu renderer created"
        );

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            instance_capacity,
            meshes: HashMap::new(),
            depth_texture,
            msaa_texture,
            upscaler: Upscaler::new(device, surface_format),
            surface_format,
            settings,
        }
    }

    /// Recreate size-dependent targets. Call after reconfiguring the surface.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.resize_scaled(device, (width, height), (width, height));
    }

    /// Draw at `buffer` resolution and stretch the result over an `output`
    /// sized surface.
    pub fn resize_scaled(&mut self, device: &wgpu::Device, buffer: (u32, u32), output: (u32, u32)) {
        let (width, height) = buffer;
        self.depth_texture =
            Self::create_depth_texture(device, width, height, self.settings.sample_count);
        self.msaa_texture = Self::create_msaa_texture(
            device,
            self.surface_format,
            width,
            height,
            self.settings.sample_count,
        );
        self.upscaler.resize(device, buffer, output);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.settings.clear_color = color;
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.settings.exposure = exposure;
    }

    pub fn set_tone_mapping(&mut self, tone_mapping: ToneMapping) {
        self.settings.tone_mapping = tone_mapping;
    }

    /// Number of geometries resident on the GPU.
    pub fn cached_geometries(&self) -> usize {
        self.meshes.len()
    }

    /// Render one frame of `scene` from `camera` into `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> FrameStats {
        let draws = scene.meshes();
        let lights = scene.lights();

        self.sync_meshes(device, &draws);

        let uniforms = build_uniforms(camera, &lights, self.settings.output_scale());
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let instances: Vec<InstanceData> = draws.iter().map(instance_for).collect();
        if instances.len() as u32 > self.instance_capacity {
            self.instance_capacity = (instances.len() as u32).next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.instance_capacity);
            tracing::debug!(capacity = self.instance_capacity, "grew instance buffer");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let clear = self.settings.clear_color.to_linear();
        let scene_view = self.upscaler.target().unwrap_or(view);
        let (color_view, resolve_target) = match &self.msaa_texture {
            Some(msaa) => (msaa, Some(scene_view)),
            None => (scene_view, None),
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let mut stats = FrameStats {
            lights: lights.len().min(MAX_LIGHTS) as u32,
            ..Default::default()
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.geometry.uuid) else {
                    continue;
                };
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                let instance = i as u32;
                pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
                stats.draws += 1;
                stats.triangles += (mesh.index_count / 3) as u64;
            }
        }
        self.upscaler.blit(&mut encoder, view);

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }

    /// Upload geometry seen for the first time, drop geometry no longer drawn.
    fn sync_meshes(&mut self, device: &wgpu::Device, draws: &[MeshDraw]) {
        for draw in draws {
            let geometry = &draw.geometry;
            if self.meshes.contains_key(&geometry.uuid) {
                continue;
            }
            if let Some(mesh) = upload_geometry(device, geometry) {
                self.meshes.insert(geometry.uuid, mesh);
            }
        }
        let live: HashSet<Uuid> = draws.iter().map(|d| d.geometry.uuid).collect();
        if self.meshes.keys().any(|id| !live.contains(id)) {
            let before = self.meshes.len();
            self.meshes.retain(|id, _| live.contains(id));
            tracing::debug!(released = before - self.meshes.len(), "released geometry");
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: capacity as u64 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&Default::default()))
    }
}

fn upload_geometry(device: &wgpu::Device, geometry: &Geometry) -> Option<GpuMesh> {
    if geometry.indices.is_empty() || geometry.positions.is_empty() {
        return None;
    }
    let vertices = interleave(geometry);
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_vertex_buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_index_buffer"),
        contents: bytemuck::cast_slice(&geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Some(GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: geometry.indices.len() as u32,
    })
}

fn interleave(geometry: &Geometry) -> Vec<Vertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            color: geometry.colors.get(i).copied().unwrap_or([1.0; 3]),
        })
        .collect()
}

fn build_uniforms(camera: &PerspectiveCamera, lights: &[LightDraw], output_scale: f32) -> Uniforms {
    let mut gpu_lights = [GpuLight::zeroed(); MAX_LIGHTS];
    for (slot, light) in gpu_lights.iter_mut().zip(lights) {
        let dir = light.direction_to_light();
        let color = light.light.color.to_linear();
        let scale = light.light.intensity;
        *slot = GpuLight {
            direction: [dir.x, dir.y, dir.z, 0.0],
            color: [color.r * scale, color.g * scale, color.b * scale, 1.0],
        };
    }
    let p = camera.position;
    Uniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_pos: [p.x, p.y, p.z, 1.0],
        params: [output_scale, lights.len().min(MAX_LIGHTS) as f32, 0.0, 0.0],
        lights: gpu_lights,
    }
}

fn instance_for(draw: &MeshDraw) -> InstanceData {
    let model = draw.world.to_cols_array_2d();
    let normal = normal_matrix(draw.world);
    let (color, specular, material) = match draw.material {
        Material::Phong {
            color,
            specular,
            shininess,
        } => (
            color.to_linear(),
            specular.to_linear().to_array(1.0),
            [0.0, shininess.max(1.0), 0.0, 0.0],
        ),
        Material::Standard {
            color,
            metallic,
            roughness,
        } => (color.to_linear(), [0.0; 4], [1.0, roughness, metallic, 0.0]),
    };
    InstanceData {
        model_0: model[0],
        model_1: model[1],
        model_2: model[2],
        model_3: model[3],
        normal_0: normal.x_axis.extend(0.0).to_array(),
        normal_1: normal.y_axis.extend(0.0).to_array(),
        normal_2: normal.z_axis.extend(0.0).to_array(),
        color: color.to_array(1.0),
        specular,
        material,
    }
}

/// Inverse transpose of the upper 3x3, identity for singular matrices.
/// Cofactor of the world's linear part, sign-corrected for mirrors. Only
/// proportional to the inverse transpose; the shader renormalizes.
fn normal_matrix(world: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(world);
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        return Mat3::IDENTITY;
    }
    let cofactor = Mat3::from_cols(
        m.y_axis.cross(m.z_axis),
        m.z_axis.cross(m.x_axis),
        m.x_axis.cross(m.y_axis),
    );
    cofactor * det.signum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use stagecraft_scene::{DirectionalLight, Mesh, Node};

    #[test]
    fn uniform_layout_matches_wgsl() {
        // mat4 + 2 vec4 + 4 lights of 2 vec4 each.
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 32 + MAX_LIGHTS * 32);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        assert_eq!(std::mem::size_of::<InstanceData>(), 10 * 16);
    }

    #[test]
    fn exposure_needs_tone_mapping() {
        let mut settings = RenderSettings {
            exposure: 0.5,
            ..RenderSettings::default()
        };
        assert_eq!(settings.output_scale(), 1.0);
        settings.tone_mapping = ToneMapping::Linear;
        assert_eq!(settings.output_scale(), 0.5);
    }

    #[test]
    fn uniforms_cap_light_count() {
        let mut scene = Scene::new();
        for i in 0..6 {
            scene.add(
                Node::light(DirectionalLight::new(Color::WHITE, 3.0))
                    .at(Vec3::new(i as f32 + 1.0, 200.0, 0.0)),
            );
        }
        let u = build_uniforms(&PerspectiveCamera::default(), &scene.lights(), 0.5);
        assert_eq!(u.params[0], 0.5);
        assert_eq!(u.params[1], MAX_LIGHTS as f32);
        assert!((u.lights[0].color[0] - 3.0).abs() < 1e-4);
        let d = Vec3::new(u.lights[0].direction[0], u.lights[0].direction[1], u.lights[0].direction[2]);
        assert!((d.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn instance_encodes_material_kind() {
        let mut scene = Scene::new();
        scene.add(Node::mesh(Mesh::new(
            Geometry::cube(1.0, 1.0, 1.0),
            Material::phong(Color::from_hex(0x44aa88)),
        )));
        scene.add(Node::mesh(Mesh::new(
            Geometry::cube(1.0, 1.0, 1.0),
            Material::Standard {
                color: Color::WHITE,
                metallic: 0.25,
                roughness: 0.75,
            },
        )));
        let draws = scene.meshes();
        let phong = instance_for(&draws[0]);
        let standard = instance_for(&draws[1]);
        assert_eq!(phong.material[0], 0.0);
        assert_eq!(phong.material[1], 30.0);
        assert_eq!(standard.material, [1.0, 0.75, 0.25, 0.0]);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(world);
        let expected = Mat3::from_mat4(world).inverse().transpose();
        let slanted = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!(
            (n * slanted)
                .normalize()
                .abs_diff_eq((expected * slanted).normalize(), 1e-6)
        );
        assert_eq!(normal_matrix(Mat4::from_scale(Vec3::ZERO)), Mat3::IDENTITY);
    }

    #[test]
    fn normal_matrix_rotates_millimetre_scaled_models() {
        let world = Mat4::from_scale_rotation_translation(
            Vec3::splat(0.001),
            glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            Vec3::ZERO,
        );
        let n = (normal_matrix(world) * Vec3::Y).normalize();
        assert!(n.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn normal_matrix_keeps_mirrored_normals_outward() {
        let world = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        let n = normal_matrix(world) * Vec3::X;
        assert!(n.abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn interleave_fills_missing_attributes() {
        let mut g = Geometry::cube(1.0, 1.0, 1.0);
        g.colors.clear();
        let v = interleave(&g);
        assert_eq!(v.len(), 24);
        assert_eq!(v[0].color, [1.0; 3]);
    }
}
