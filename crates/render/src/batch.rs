//! Render batch sorting and the draw loop.
//!
//! # Invariants
//! - Render layer is the primary key; shader and material only group state.
//! - No draw call is issued without a bound shader.
//! - A shader bind resets the applied material, so the first entry after a
//!   bind always applies its material.

use crate::device::{DrawUniforms, FrameUniforms, RenderDevice};
use crate::resources::RenderResources;
use crate::shader::ShaderHandle;
use gravefield_common::Transform;
use gravefield_ecs::{Group, MaterialHandle, Registry, Renderable};
use std::cmp::Ordering;

/// The grouped Renderable x Transform view the draw loop walks.
pub type RenderGroup = Group<Renderable, Transform>;

/// State changes and draws issued by one [`draw_render_group`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub shader_binds: usize,
    pub material_applies: usize,
    pub draw_calls: usize,
}

/// Sort key of a renderable: (render layer, shader, material).
///
/// Renderables whose material is unknown sort last; the draw loop reports them.
pub fn batch_key(
    resources: &RenderResources,
    renderable: &Renderable,
) -> (i32, ShaderHandle, MaterialHandle) {
    match resources.material(renderable.material) {
        Ok(material) => (material.render_layer, material.shader, renderable.material),
        Err(_) => (i32::MAX, ShaderHandle(u32::MAX), renderable.material),
    }
}

/// Reorder the render group by [`batch_key`].
pub fn sort_render_group(registry: &mut Registry, group: RenderGroup, resources: &RenderResources) {
    registry.sort_group(group, |a: &Renderable, b: &Renderable| -> Ordering {
        batch_key(resources, a).cmp(&batch_key(resources, b))
    });
}

/// Walk the group in its current order, binding shaders and applying
/// materials only when they change, and draw every entry.
pub fn draw_render_group(
    registry: &Registry,
    group: RenderGroup,
    resources: &RenderResources,
    frame: &FrameUniforms,
    device: &mut dyn RenderDevice,
) -> Result<DrawStats, crate::RenderError> {
    let _span = tracing::debug_span!("draw_render_group").entered();
    let view_projection = frame.view_projection();
    let mut stats = DrawStats::default();
    let mut bound_shader: Option<ShaderHandle> = None;
    let mut applied_material: Option<MaterialHandle> = None;

    for (_, renderable, transform) in registry.group_iter(group) {
        let material = resources.material(renderable.material)?;
        if bound_shader != Some(material.shader) {
            let program = resources.shader(material.shader)?;
            device.bind_shader(material.shader, program);
            device.set_frame_uniforms(frame);
            bound_shader = Some(material.shader);
            applied_material = None;
            stats.shader_binds += 1;
        }
        if applied_material != Some(renderable.material) {
            material.apply(renderable.material, device);
            applied_material = Some(renderable.material);
            stats.material_applies += 1;
        }
        device.draw_mesh(
            renderable.mesh,
            &DrawUniforms::new(transform.local_transform(), view_projection),
        );
        stats.draw_calls += 1;
    }

    tracing::trace!(
        shader_binds = stats.shader_binds,
        material_applies = stats.material_applies,
        draw_calls = stats.draw_calls,
        "render group drawn"
    );
    Ok(stats)
}
