use crate::material::Material;
use crate::shader::{ShaderHandle, ShaderProgram};
use crate::uniform::TextureHandle;
use glam::{Mat3, Mat4, Vec3};
use gravefield_assets::{CubeMapData, MeshData, TextureData};
use gravefield_ecs::{MaterialHandle, MeshHandle};

/// Per-frame camera uniforms pushed whenever a shader is bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
}

impl FrameUniforms {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
        }
    }
}

/// Per-draw uniforms: the entity's world matrix folded into the view-projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub model: Mat4,
    pub model_view_projection: Mat4,
    pub normal_matrix: Mat3,
}

impl DrawUniforms {
    pub fn new(model: Mat4, view_projection: Mat4) -> Self {
        Self {
            model,
            model_view_projection: view_projection * model,
            normal_matrix: Mat3::from_mat4(model).inverse().transpose(),
        }
    }
}

/// The GPU-facing seam of the draw loop.
///
/// The draw loop only talks to this trait, so it can run against a real
/// backend or against [`RecordingDevice`] in tests.
pub trait RenderDevice {
    /// Start rendering into the off-screen framebuffer, clearing it.
    fn begin_offscreen(&mut self, clear_color: [f32; 4]);

    /// Make `program` the active shader and push its program-level uniforms.
    fn bind_shader(&mut self, handle: ShaderHandle, program: &ShaderProgram);

    /// Push view/projection for the active shader.
    fn set_frame_uniforms(&mut self, frame: &FrameUniforms);

    /// Push a material's uniforms to the active shader.
    fn apply_material(&mut self, handle: MaterialHandle, material: &Material);

    /// Draw a mesh with the active shader and material.
    fn draw_mesh(&mut self, mesh: MeshHandle, draw: &DrawUniforms);

    /// Finish the off-screen pass.
    fn end_offscreen(&mut self);

    /// Blit the off-screen color target onto the presentation target.
    fn present_offscreen(&mut self);
}

/// Uploads decoded assets and hands back the handles renderables refer to.
pub trait ResourceUploader {
    fn upload_mesh(&mut self, name: &str, mesh: &MeshData) -> MeshHandle;

    fn upload_texture(&mut self, name: &str, texture: &TextureData) -> TextureHandle;

    fn upload_cube_map(&mut self, name: &str, cube: &CubeMapData) -> TextureHandle;
}

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    BeginOffscreen,
    BindShader(ShaderHandle),
    FrameUniforms(FrameUniforms),
    ApplyMaterial(MaterialHandle),
    Draw { mesh: MeshHandle, model: Mat4 },
    EndOffscreen,
    Present,
}

/// Device that records every call instead of touching a GPU.
///
/// Useful for tests and for dumping a frame's command stream to the log.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    bound_shader: Option<ShaderHandle>,
    unbound_draws: usize,
    meshes: Vec<String>,
    textures: Vec<String>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.bound_shader = None;
        self.unbound_draws = 0;
    }

    pub fn shader_binds(&self) -> usize {
        self.count(|c| matches!(c, DeviceCommand::BindShader(_)))
    }

    pub fn material_applies(&self) -> usize {
        self.count(|c| matches!(c, DeviceCommand::ApplyMaterial(_)))
    }

    pub fn draw_calls(&self) -> usize {
        self.count(|c| matches!(c, DeviceCommand::Draw { .. }))
    }

    /// Draws issued while no shader was bound. Always zero for a correct loop.
    pub fn unbound_draws(&self) -> usize {
        self.unbound_draws
    }

    /// Meshes in draw order.
    pub fn drawn_meshes(&self) -> Vec<MeshHandle> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::Draw { mesh, .. } => Some(*mesh),
                _ => None,
            })
            .collect()
    }

    /// Human-readable dump of the recorded stream.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (i, command) in self.commands.iter().enumerate() {
            let line = match command {
                DeviceCommand::BeginOffscreen => "begin offscreen".to_string(),
                DeviceCommand::BindShader(s) => format!("bind shader {}", s.0),
                DeviceCommand::FrameUniforms(_) => "frame uniforms".to_string(),
                DeviceCommand::ApplyMaterial(m) => format!("apply material {}", m.0),
                DeviceCommand::Draw { mesh, model } => {
                    let p = model.w_axis;
                    format!("draw mesh {} at ({:.2}, {:.2}, {:.2})", mesh.0, p.x, p.y, p.z)
                }
                DeviceCommand::EndOffscreen => "end offscreen".to_string(),
                DeviceCommand::Present => "present".to_string(),
            };
            out.push_str(&format!("{i:>4}: {line}\n"));
        }
        out
    }

    /// Names of uploaded meshes, indexed by handle.
    pub fn meshes(&self) -> &[String] {
        &self.meshes
    }

    /// Names of uploaded textures and cube maps, indexed by handle.
    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    fn count(&self, pred: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl RenderDevice for RecordingDevice {
    fn begin_offscreen(&mut self, _clear_color: [f32; 4]) {
        self.bound_shader = None;
        self.commands.push(DeviceCommand::BeginOffscreen);
    }

    fn bind_shader(&mut self, handle: ShaderHandle, _program: &ShaderProgram) {
        self.bound_shader = Some(handle);
        self.commands.push(DeviceCommand::BindShader(handle));
    }

    fn set_frame_uniforms(&mut self, frame: &FrameUniforms) {
        self.commands.push(DeviceCommand::FrameUniforms(*frame));
    }

    fn apply_material(&mut self, handle: MaterialHandle, _material: &Material) {
        self.commands.push(DeviceCommand::ApplyMaterial(handle));
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, draw: &DrawUniforms) {
        if self.bound_shader.is_none() {
            self.unbound_draws += 1;
        }
        self.commands.push(DeviceCommand::Draw {
            mesh,
            model: draw.model,
        });
    }

    fn end_offscreen(&mut self) {
        self.commands.push(DeviceCommand::EndOffscreen);
    }

    fn present_offscreen(&mut self) {
        self.commands.push(DeviceCommand::Present);
    }
}

impl ResourceUploader for RecordingDevice {
    fn upload_mesh(&mut self, name: &str, _mesh: &MeshData) -> MeshHandle {
        self.meshes.push(name.to_string());
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    fn upload_texture(&mut self, name: &str, _texture: &TextureData) -> TextureHandle {
        self.textures.push(name.to_string());
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn upload_cube_map(&mut self, name: &str, _cube: &CubeMapData) -> TextureHandle {
        self.textures.push(name.to_string());
        TextureHandle(self.textures.len() as u32 - 1)
    }
}
