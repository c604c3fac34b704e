use crate::error::RenderError;
use crate::uniform::UniformValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A handle referencing a shader program in the render resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

/// Resource layout a shader program expects.
///
/// Backends build one pipeline per program from its layout; materials bound
/// to the program must only set the layout's material uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderLayout {
    /// Phong/toon lit geometry with diffuse and specular maps.
    Lit,
    /// Cube-mapped environment drawn behind everything else.
    Skybox,
}

impl ShaderLayout {
    pub fn name(self) -> &'static str {
        match self {
            Self::Lit => "lit",
            Self::Skybox => "skybox",
        }
    }

    /// Uniform names (and kinds) a material on this layout may set.
    pub fn material_uniforms(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Lit => &[
                ("s_Diffuse", "texture2d"),
                ("s_Specular", "texture2d"),
                ("u_Shininess", "float"),
                ("u_TextureMix", "float"),
            ],
            Self::Skybox => &[
                ("s_Environment", "cubemap"),
                ("u_EnvironmentRotation", "mat3"),
            ],
        }
    }

    /// Check that `value` may be stored under `name` on a material.
    pub fn check_material_uniform(self, name: &str, value: &UniformValue) -> Result<(), RenderError> {
        let Some(&(_, expected)) = self.material_uniforms().iter().find(|(n, _)| *n == name) else {
            return Err(RenderError::UnknownUniform {
                name: name.to_string(),
                layout: self.name(),
            });
        };
        if value.kind() != expected {
            return Err(RenderError::UniformType {
                name: name.to_string(),
                expected,
            });
        }
        Ok(())
    }
}

/// A linked shader program plus its program-level uniforms.
///
/// Program-level uniforms (lighting, ambient terms) are shared by every
/// material using the program, so they are set here once per change rather
/// than per material. Backends push them when the program is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    name: String,
    layout: ShaderLayout,
    uniforms: BTreeMap<String, UniformValue>,
    revision: u64,
}

impl ShaderProgram {
    pub fn new(name: impl Into<String>, layout: ShaderLayout) -> Self {
        Self {
            name: name.into(),
            layout,
            uniforms: BTreeMap::new(),
            revision: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> ShaderLayout {
        self.layout
    }

    /// Set a program-level uniform, replacing any previous value.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.uniforms.insert(name.to_string(), value.into());
        self.revision += 1;
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }

    /// Bumped on every uniform change; backends compare it to skip uploads.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform::TextureHandle;
    use glam::Vec3;

    #[test]
    fn set_uniform_overwrites_and_bumps_revision() {
        let mut program = ShaderProgram::new("lit", ShaderLayout::Lit);
        program.set_uniform("u_LightPos", Vec3::Z);
        program.set_uniform("u_LightPos", Vec3::X);
        assert_eq!(program.uniform("u_LightPos"), Some(&UniformValue::Vec3(Vec3::X)));
        assert_eq!(program.uniforms().len(), 1);
        assert_eq!(program.revision(), 2);
    }

    #[test]
    fn material_uniform_validation() {
        let lit = ShaderLayout::Lit;
        assert!(lit.check_material_uniform("u_Shininess", &UniformValue::Float(2.0)).is_ok());
        assert!(
            lit.check_material_uniform("s_Diffuse", &TextureHandle(1).into())
                .is_ok()
        );
        assert!(matches!(
            lit.check_material_uniform("u_Shininess", &Vec3::ONE.into()),
            Err(RenderError::UniformType { .. })
        ));
        assert!(matches!(
            lit.check_material_uniform("s_Environment", &UniformValue::CubeMap(TextureHandle(0))),
            Err(RenderError::UnknownUniform { .. })
        ));
        assert!(
            ShaderLayout::Skybox
                .check_material_uniform("s_Environment", &UniformValue::CubeMap(TextureHandle(0)))
                .is_ok()
        );
    }
}
