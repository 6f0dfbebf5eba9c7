/// WGSL shader for lit meshes.
///
/// Instance `material.x` selects the model: 0 is Blinn-Phong (`material.y` is
/// shininess, `specular.rgb` the specular color), 1 is metallic-roughness
/// (`material.y` roughness, `material.z` metallic).
pub const LIT_SHADER: &str = r#"
const PI: f32 = 3.141592653589793;
const MAX_LIGHTS: u32 = 4u;

struct Light {
    direction: vec4<f32>,
    color: vec4<f32>,
};

struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // x: output scale, y: light count
    params: vec4<f32>,
    lights: array<Light, 4>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) normal_0: vec4<f32>,
    @location(8) normal_1: vec4<f32>,
    @location(9) normal_2: vec4<f32>,
    @location(10) color: vec4<f32>,
    @location(11) specular: vec4<f32>,
    @location(12) material: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) albedo: vec3<f32>,
    @location(3) specular: vec3<f32>,
    @location(4) material: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let normal_matrix = mat3x3<f32>(
        instance.normal_0.xyz,
        instance.normal_1.xyz,
        instance.normal_2.xyz,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normal_matrix * vertex.normal;
    out.albedo = instance.color.rgb * vertex.color;
    out.specular = instance.specular.rgb;
    out.material = instance.material;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);

    var diffuse_color = in.albedo;
    var specular_color = in.specular;
    var shininess = in.material.y;
    if (in.material.x > 0.5) {
        let roughness = clamp(in.material.y, 0.04, 1.0);
        let metallic = clamp(in.material.z, 0.0, 1.0);
        let alpha = roughness * roughness;
        diffuse_color = in.albedo * (1.0 - metallic);
        specular_color = mix(vec3<f32>(0.04), in.albedo, metallic);
        shininess = max(2.0 / (alpha * alpha) - 2.0, 1.0);
    }

    var lit = vec3<f32>(0.0);
    let count = min(u32(uniforms.params.y), MAX_LIGHTS);
    for (var i = 0u; i < count; i = i + 1u) {
        let l = normalize(uniforms.lights[i].direction.xyz);
        let irradiance = uniforms.lights[i].color.rgb * max(dot(n, l), 0.0);
        let h = normalize(l + v);
        let spec = specular_color * (0.5 / PI * (shininess + 2.0)) * pow(max(dot(n, h), 0.0), shininess);
        lit = lit + irradiance * (diffuse_color / PI + spec);
    }

    return vec4<f32>(lit * uniforms.params.x, 1.0);
}
"#;

/// Fullscreen triangle sampling a single texture, for drawing a reduced
/// resolution frame onto the surface.
pub const UPSCALE_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(source, source_sampler, in.uv);
}
"#;
