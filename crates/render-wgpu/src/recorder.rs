//! CPU-side recording of one off-screen pass.
//!
//! The draw loop talks to the device one call at a time, but a wgpu render
//! pass wants every buffer written before it is encoded. Calls are recorded
//! here as ops plus packed uniform bytes, then replayed in one pass.

use crate::blocks::{DrawBlock, SceneBlock, align_to};
use gravefield_ecs::{MaterialHandle, MeshHandle};
use gravefield_render::{DrawUniforms, FrameUniforms, ShaderLayout, ShaderProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Pipeline(ShaderLayout),
    Material(MaterialHandle),
    Draw {
        mesh: MeshHandle,
        scene_offset: u32,
        draw_offset: u32,
    },
}

#[derive(Debug)]
pub struct FrameRecorder {
    alignment: u64,
    clear_color: [f32; 4],
    ops: Vec<Op>,
    scene_bytes: Vec<u8>,
    draw_bytes: Vec<u8>,
    scene: Option<SceneBlock>,
    scene_offset: Option<u32>,
}

impl FrameRecorder {
    /// `alignment` is the device's minimum uniform buffer offset alignment.
    pub fn new(alignment: u32) -> Self {
        Self {
            alignment: u64::from(alignment.max(1)).next_power_of_two(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            ops: Vec::new(),
            scene_bytes: Vec::new(),
            draw_bytes: Vec::new(),
            scene: None,
            scene_offset: None,
        }
    }

    pub fn begin(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
        self.ops.clear();
        self.scene_bytes.clear();
        self.draw_bytes.clear();
        self.scene = None;
        self.scene_offset = None;
    }

    pub fn bind(&mut self, program: &ShaderProgram) {
        self.ops.push(Op::Pipeline(program.layout()));
        self.scene = Some(SceneBlock::from_program(program));
        self.scene_offset = None;
    }

    pub fn frame(&mut self, frame: &FrameUniforms) {
        let Some(scene) = self.scene.as_mut() else {
            tracing::warn!("frame uniforms set with no shader bound");
            return;
        };
        scene.set_frame(frame);
        let scene = *scene;
        self.scene_offset = Some(push_aligned(
            &mut self.scene_bytes,
            bytemuck::bytes_of(&scene),
            self.alignment,
        ));
    }

    pub fn material(&mut self, handle: MaterialHandle) {
        self.ops.push(Op::Material(handle));
    }

    /// Returns false when no shader and frame uniforms are active.
    pub fn draw(&mut self, mesh: MeshHandle, draw: &DrawUniforms) -> bool {
        let Some(scene_offset) = self.scene_offset else {
            return false;
        };
        let block = DrawBlock::from(draw);
        let draw_offset = push_aligned(&mut self.draw_bytes, bytemuck::bytes_of(&block), self.alignment);
        self.ops.push(Op::Draw {
            mesh,
            scene_offset,
            draw_offset,
        });
        true
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn scene_bytes(&self) -> &[u8] {
        &self.scene_bytes
    }

    pub fn draw_bytes(&self) -> &[u8] {
        &self.draw_bytes
    }

    pub fn draw_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::Draw { .. })).count()
    }
}

fn push_aligned(buffer: &mut Vec<u8>, bytes: &[u8], alignment: u64) -> u32 {
    let offset = align_to(buffer.len() as u64, alignment);
    buffer.resize(offset as usize, 0);
    buffer.extend_from_slice(bytes);
    offset as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn draws_get_aligned_offsets() {
        let mut rec = FrameRecorder::new(256);
        rec.begin([0.0; 4]);
        rec.bind(&ShaderProgram::new("lit", ShaderLayout::Lit));
        rec.frame(&FrameUniforms::default());
        rec.material(MaterialHandle(0));
        let draw = DrawUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY);
        assert!(rec.draw(MeshHandle(0), &draw));
        assert!(rec.draw(MeshHandle(1), &draw));

        assert_eq!(
            rec.ops()[3],
            Op::Draw {
                mesh: MeshHandle(1),
                scene_offset: 0,
                draw_offset: 256
            }
        );
        assert_eq!(rec.draw_bytes().len(), 256 + std::mem::size_of::<DrawBlock>());
        assert_eq!(rec.draw_count(), 2);
    }

    #[test]
    fn rebinding_starts_a_new_scene_block() {
        let mut rec = FrameRecorder::new(256);
        rec.begin([0.0; 4]);
        rec.bind(&ShaderProgram::new("lit", ShaderLayout::Lit));
        rec.frame(&FrameUniforms::default());
        rec.bind(&ShaderProgram::new("sky", ShaderLayout::Skybox));
        let draw = DrawUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY);
        // no frame uniforms for the new program yet
        assert!(!rec.draw(MeshHandle(0), &draw));
        rec.frame(&FrameUniforms::default());
        assert!(rec.draw(MeshHandle(0), &draw));
        assert!(matches!(
            rec.ops().last(),
            Some(Op::Draw {
                scene_offset: 256,
                ..
            })
        ));
    }

    #[test]
    fn begin_resets_the_frame() {
        let mut rec = FrameRecorder::new(64);
        rec.begin([0.0; 4]);
        rec.bind(&ShaderProgram::new("lit", ShaderLayout::Lit));
        rec.begin([1.0; 4]);
        assert!(rec.ops().is_empty());
        assert_eq!(rec.clear_color(), [1.0; 4]);
    }
}
