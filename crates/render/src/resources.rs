use crate::error::RenderError;
use crate::material::Material;
use crate::shader::{ShaderHandle, ShaderProgram};
use crate::uniform::UniformValue;
use gravefield_ecs::MaterialHandle;

/// Arena of shader programs and materials shared across the scene.
///
/// Handles are indices into the arenas; mutating a material through its
/// handle is visible to every renderable that references it.
#[derive(Debug, Clone, Default)]
pub struct RenderResources {
    shaders: Vec<ShaderProgram>,
    materials: Vec<Material>,
}

impl RenderResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shader(&mut self, program: ShaderProgram) -> ShaderHandle {
        self.shaders.push(program);
        ShaderHandle(self.shaders.len() as u32 - 1)
    }

    pub fn shader(&self, handle: ShaderHandle) -> Result<&ShaderProgram, RenderError> {
        self.shaders
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownShader(handle))
    }

    pub fn shader_mut(&mut self, handle: ShaderHandle) -> Result<&mut ShaderProgram, RenderError> {
        self.shaders
            .get_mut(handle.0 as usize)
            .ok_or(RenderError::UnknownShader(handle))
    }

    /// Add a material after checking its uniforms against its shader's layout.
    pub fn add_material(&mut self, material: Material) -> Result<MaterialHandle, RenderError> {
        let layout = self.shader(material.shader)?.layout();
        for (name, value) in material.uniforms() {
            layout.check_material_uniform(name, value)?;
        }
        self.materials.push(material);
        Ok(MaterialHandle(self.materials.len() as u32 - 1))
    }

    pub fn material(&self, handle: MaterialHandle) -> Result<&Material, RenderError> {
        self.materials
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownMaterial(handle))
    }

    /// Set one uniform on a shared material, checked against its shader's layout.
    ///
    /// A rejected value leaves the material unchanged.
    pub fn set_material_uniform(
        &mut self,
        handle: MaterialHandle,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<(), RenderError> {
        let value = value.into();
        let shader = self.material(handle)?.shader;
        self.shader(shader)?.layout().check_material_uniform(name, &value)?;
        self.materials
            .get_mut(handle.0 as usize)
            .ok_or(RenderError::UnknownMaterial(handle))?
            .set(name, value);
        Ok(())
    }

    pub fn shaders(&self) -> impl Iterator<Item = (ShaderHandle, &ShaderProgram)> {
        self.shaders
            .iter()
            .enumerate()
            .map(|(i, s)| (ShaderHandle(i as u32), s))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialHandle(i as u32), m))
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
