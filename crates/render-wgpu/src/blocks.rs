//! Plain-old-data uniform blocks mirrored by the WGSL structs.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use gravefield_render::{DrawUniforms, FrameUniforms, Material, ShaderProgram, UniformValue};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneBlock {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
    pub strengths: [f32; 4],
    pub attenuation: [f32; 4],
}

impl SceneBlock {
    /// Lighting terms from a program's uniforms; camera terms stay zero.
    pub fn from_program(program: &ShaderProgram) -> Self {
        let float = |name: &str, default: f32| {
            program
                .uniform(name)
                .and_then(UniformValue::as_float)
                .unwrap_or(default)
        };
        let vec3 = |name: &str, default: Vec3| {
            program
                .uniform(name)
                .and_then(UniformValue::as_vec3)
                .unwrap_or(default)
                .extend(1.0)
                .to_array()
        };
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
            light_position: vec3("u_LightPos", Vec3::ZERO),
            light_color: vec3("u_LightCol", Vec3::ONE),
            ambient_color: vec3("u_AmbientCol", Vec3::ONE),
            strengths: [
                float("u_AmbientLightStrength", 0.0),
                float("u_SpecularLightStrength", 0.0),
                float("u_AmbientStrength", 1.0),
                float("u_toonShading", 0.0),
            ],
            attenuation: [
                float("u_LightAttenuationConstant", 1.0),
                float("u_LightAttenuationLinear", 0.0),
                float("u_LightAttenuationQuadratic", 0.0),
                0.0,
            ],
        }
    }

    pub fn set_frame(&mut self, frame: &FrameUniforms) {
        self.view = frame.view.to_cols_array_2d();
        self.projection = frame.projection.to_cols_array_2d();
        self.camera_position = frame.camera_position.extend(1.0).to_array();
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawBlock {
    pub model: [[f32; 4]; 4],
    pub model_view_projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
}

impl From<&DrawUniforms> for DrawBlock {
    fn from(draw: &DrawUniforms) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            model_view_projection: draw.model_view_projection.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(draw.normal_matrix).to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LitMaterialBlock {
    /// x: shininess, y: texture mix
    pub params: [f32; 4],
}

impl From<&Material> for LitMaterialBlock {
    fn from(material: &Material) -> Self {
        let float = |name: &str| material.get(name).and_then(UniformValue::as_float);
        Self {
            params: [
                float("u_Shininess").unwrap_or(1.0),
                float("u_TextureMix").unwrap_or(0.0),
                0.0,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkyMaterialBlock {
    pub rotation: [[f32; 4]; 4],
}

impl From<&Material> for SkyMaterialBlock {
    fn from(material: &Material) -> Self {
        let rotation = material
            .get("u_EnvironmentRotation")
            .and_then(UniformValue::as_mat3)
            .map(Mat4::from_mat3)
            .unwrap_or(Mat4::IDENTITY);
        Self {
            rotation: rotation.to_cols_array_2d(),
        }
    }
}

/// Round `size` up to a multiple of `alignment` (a power of two).
pub fn align_to(size: u64, alignment: u64) -> u64 {
    (size + alignment - 1) & !(alignment - 1)
}
