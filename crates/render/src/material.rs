use crate::device::RenderDevice;
use crate::shader::ShaderHandle;
use crate::uniform::UniformValue;
use gravefield_ecs::MaterialHandle;
use std::collections::BTreeMap;

/// Draw-order bucket for ordinary geometry.
pub const DEFAULT_RENDER_LAYER: i32 = 0;

/// Render layer that puts the skybox after all default-layer geometry.
pub const SKYBOX_RENDER_LAYER: i32 = 100;

/// A shader plus named uniform values, shared by any number of renderables.
///
/// `set` only records the value; nothing reaches the GPU until `apply`.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shader: ShaderHandle,
    pub render_layer: i32,
    uniforms: BTreeMap<String, UniformValue>,
}

impl Material {
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            render_layer: DEFAULT_RENDER_LAYER,
            uniforms: BTreeMap::new(),
        }
    }

    pub fn with_render_layer(mut self, layer: i32) -> Self {
        self.render_layer = layer;
        self
    }

    /// Store a uniform value, overwriting any previous value for `name`.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> &mut Self {
        self.uniforms.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }

    /// Push every stored uniform to the currently bound shader program.
    pub fn apply(&self, handle: MaterialHandle, device: &mut dyn RenderDevice) {
        device.apply_material(handle, self);
    }
}
