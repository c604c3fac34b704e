use gravefield_render::ShaderLayout;

/// Uniform blocks shared by every scene shader (group 0).
const SCENE_BLOCKS: &str = r#"
struct Scene {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    ambient_color: vec4<f32>,
    // x: light ambient, y: light specular, z: scene ambient, w: toon shading
    strengths: vec4<f32>,
    // x: constant, y: linear, z: quadratic
    attenuation: vec4<f32>,
};

struct Draw {
    model: mat4x4<f32>,
    model_view_projection: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;
@group(0) @binding(1)
var<uniform> draw: Draw;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};
"#;

/// Phong lighting with an optional toon ramp.
const LIT_BODY: &str = r#"
struct LitMaterial {
    // x: shininess, y: texture mix
    params: vec4<f32>,
};

@group(1) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(1) @binding(1)
var specular_map: texture_2d<f32>;
@group(1) @binding(2)
var material_sampler: sampler;
@group(1) @binding(3)
var<uniform> material: LitMaterial;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};

@vertex
fn vs_main(v: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.model_view_projection * vec4<f32>(v.position, 1.0);
    out.world_position = (draw.model * vec4<f32>(v.position, 1.0)).xyz;
    out.world_normal = (draw.normal_matrix * vec4<f32>(v.normal, 0.0)).xyz;
    out.uv = v.uv;
    out.color = v.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, material_sampler, in.uv);
    let specular_mask = textureSample(specular_map, material_sampler, in.uv).r;
    if (albedo.a < 0.3) {
        discard;
    }

    let n = normalize(in.world_normal);
    let to_light = scene.light_position.xyz - in.world_position;
    let dist = length(to_light);
    let l = to_light / max(dist, 0.0001);
    let view_dir = normalize(scene.camera_position.xyz - in.world_position);
    let r = reflect(-l, n);

    var diffuse = max(dot(n, l), 0.0);
    var specular = pow(max(dot(view_dir, r), 0.0), max(material.params.x, 1.0)) * specular_mask;
    if (scene.strengths.w > 0.5) {
        diffuse = floor(diffuse * 4.0) / 4.0;
        specular = step(0.5, specular);
    }

    let attenuation = 1.0 / (scene.attenuation.x
        + scene.attenuation.y * dist
        + scene.attenuation.z * dist * dist);
    let light = scene.light_color.rgb;
    let ambient = attenuation * light * scene.strengths.x
        + scene.ambient_color.rgb * scene.strengths.z;
    let direct = attenuation * (diffuse * light + specular * scene.strengths.y * light);

    let base = mix(albedo.rgb, in.color.rgb, material.params.y);
    return vec4<f32>((ambient + direct) * base, albedo.a);
}
"#;

/// Cube-mapped environment pinned to the far plane.
const SKYBOX_BODY: &str = r#"
struct SkyMaterial {
    rotation: mat4x4<f32>,
};

@group(1) @binding(0)
var environment: texture_cube<f32>;
@group(1) @binding(1)
var environment_sampler: sampler;
@group(1) @binding(2)
var<uniform> sky: SkyMaterial;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(v: VertexInput) -> VertexOutput {
    let view_rotation = mat4x4<f32>(
        vec4<f32>(scene.view[0].xyz, 0.0),
        vec4<f32>(scene.view[1].xyz, 0.0),
        vec4<f32>(scene.view[2].xyz, 0.0),
        vec4<f32>(0.0, 0.0, 0.0, 1.0),
    );
    let clip = scene.projection * view_rotation * vec4<f32>(v.position, 1.0);
    var out: VertexOutput;
    out.clip_position = clip.xyww;
    out.direction = (sky.rotation * vec4<f32>(v.position, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(environment, environment_sampler, normalize(in.direction));
}
"#;

/// Full-screen triangle copying the off-screen color target.
pub const PASSTHROUGH_SHADER: &str = r#"
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv * vec2<f32>(2.0, -2.0) + vec2<f32>(-1.0, 1.0), 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(source, source_sampler, in.uv);
}
"#;

/// Complete WGSL source for a scene shader layout.
pub fn scene_shader_source(layout: ShaderLayout) -> String {
    let body = match layout {
        ShaderLayout::Lit => LIT_BODY,
        ShaderLayout::Skybox => SKYBOX_BODY,
    };
    format!("{SCENE_BLOCKS}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_has_both_entry_points() {
        for layout in [ShaderLayout::Lit, ShaderLayout::Skybox] {
            let source = scene_shader_source(layout);
            assert!(source.contains("fn vs_main"), "{layout:?}");
            assert!(source.contains("fn fs_main"), "{layout:?}");
            assert!(source.contains("var<uniform> scene: Scene"));
        }
    }
}
