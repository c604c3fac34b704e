use gravefield_ecs::{MaterialHandle, MeshHandle};

use crate::shader::ShaderHandle;

/// Errors from render resource lookup and backend operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown shader handle {0:?}")]
    UnknownShader(ShaderHandle),
    #[error("unknown material handle {0:?}")]
    UnknownMaterial(MaterialHandle),
    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("uniform `{name}` is not part of the {layout} layout")]
    UnknownUniform { name: String, layout: &'static str },
    #[error("uniform `{name}` expects {expected}")]
    UniformType { name: String, expected: &'static str },
    #[error("surface error: {0}")]
    Surface(String),
    #[error("no usable gpu device: {0}")]
    Device(String),
}
