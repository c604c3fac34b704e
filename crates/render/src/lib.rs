//! Rendering core: materials, shaders, lighting and the draw loop.
//!
//! # Invariants
//! - Nothing here touches a GPU directly; every device call goes through
//!   [`RenderDevice`].
//! - Material uniforms are only pushed on [`Material::apply`].
//! - The draw loop reads world matrices refreshed earlier in the same frame.

mod batch;
mod camera;
mod device;
mod error;
mod lighting;
mod material;
mod resources;
mod shader;
mod uniform;

pub use batch::{DrawStats, RenderGroup, batch_key, draw_render_group, sort_render_group};
pub use camera::Camera;
pub use device::{
    DeviceCommand, DrawUniforms, FrameUniforms, RecordingDevice, RenderDevice, ResourceUploader,
};
pub use error::RenderError;
pub use lighting::SceneLighting;
pub use material::{DEFAULT_RENDER_LAYER, Material, SKYBOX_RENDER_LAYER};
pub use resources::RenderResources;
pub use shader::{ShaderHandle, ShaderLayout, ShaderProgram};
pub use uniform::{TextureHandle, UniformValue};

pub fn crate_info() -> &'static str {
    "gravefield-render v0.1.0"
}
