/// WGSL for lit, textured meshes: one directional light with ambient,
/// Lambert diffuse and Phong specular terms.
pub const SCENE_SHADER: &str = r#"
struct SceneUniforms {
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    light_direction: vec4<f32>,
};

struct ObjectUniforms {
    projection_view_model: mat4x4<f32>,
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;

@group(1) @binding(0)
var<uniform> object: ObjectUniforms;

@group(2) @binding(0)
var diffuse_texture: texture_2d<f32>;
@group(2) @binding(1)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) normal: vec4<f32>,
    @location(2) tex_coord: vec2<f32>,
    @location(3) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
    @location(3) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = object.projection_view_model * vertex.position;
    out.world_position = (object.model * vertex.position).xyz;
    out.world_normal = (object.normal * vec4<f32>(vertex.normal.xyz, 0.0)).xyz;
    out.tex_coord = vertex.tex_coord;
    out.color = vertex.color;
    return out;
}

const SPECULAR_POWER: f32 = 32.0;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let l = normalize(scene.light_direction.xyz);
    let lambert = clamp(dot(n, -l), 0.0, 1.0);

    let to_eye = normalize(scene.camera_position.xyz - in.world_position);
    let reflected = reflect(l, n);
    let highlight = pow(max(dot(reflected, to_eye), 0.0), SPECULAR_POWER);

    let texel = textureSample(diffuse_texture, diffuse_sampler, in.tex_coord);
    let base = texel.rgb * in.color.rgb;

    let ambient = scene.ambient.rgb * base;
    let diffuse = scene.diffuse.rgb * base * lambert;
    let specular = scene.specular.rgb * highlight;
    return vec4<f32>(ambient + diffuse + specular, texel.a * in.color.a);
}
"#;

/// WGSL for debug lines.
pub const LINE_SHADER: &str = r#"
struct LineUniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: LineUniforms;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
