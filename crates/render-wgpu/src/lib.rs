//! wgpu render backend for the graveyard scene.
//!
//! [`WgpuDevice`] implements the immediate-mode [`gravefield_render::RenderDevice`]
//! by recording each frame's calls and replaying them into one off-screen pass,
//! then blitting the off-screen color target onto the window surface.
//!
//! # Invariants
//! - Uniform blocks in [`blocks`] match the WGSL structs byte for byte.
//! - Every draw replays with the scene block of the shader bound before it.
//! - A material bind group is rebuilt whenever its uniforms change.
//! - Texture handles that are missing or of the wrong kind sample white.

pub mod blocks;
mod gpu;
pub mod recorder;
pub mod shaders;

pub use gpu::{DEPTH_FORMAT, OFFSCREEN_FORMAT, WgpuDevice};

pub fn crate_info() -> &'static str {
    "gravefield-render-wgpu v0.1.0"
}
