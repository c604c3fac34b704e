use crate::error::KernelError;
use gravefield_behaviour::OscillatingMover;
use gravefield_common::{EntityId, Transform};
use gravefield_ecs::{Name, Registry, Renderable};
use gravefield_render::{
    Camera, FrameUniforms, RenderGroup, RenderResources, SceneLighting, ShaderHandle,
};
use gravefield_scatter::EnvironmentGenerator;

/// Background color of the off-screen pass.
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.08, 0.17, 0.31, 1.0];

/// Everything the frame driver updates and draws.
///
/// Fields are public so systems can borrow disjoint parts at once, e.g. the
/// generator and the registry during regeneration.
#[derive(Debug)]
pub struct Scene {
    pub registry: Registry,
    pub resources: RenderResources,
    pub lighting: SceneLighting,
    pub scatter: EnvironmentGenerator,
    pub clear_color: [f32; 4],
    /// Shader that receives [`SceneLighting`] uniforms.
    pub lit_shader: Option<ShaderHandle>,
    camera: Option<EntityId>,
    controllables: Vec<EntityId>,
    selected: usize,
    render_group: RenderGroup,
}

impl Scene {
    pub fn new(scatter: EnvironmentGenerator) -> Self {
        let mut registry = Registry::new();
        let render_group = registry.group::<Renderable, Transform>();
        Self {
            registry,
            resources: RenderResources::new(),
            lighting: SceneLighting::default(),
            scatter,
            clear_color: DEFAULT_CLEAR_COLOR,
            lit_shader: None,
            camera: None,
            controllables: Vec::new(),
            selected: 0,
            render_group,
        }
    }

    pub fn render_group(&self) -> RenderGroup {
        self.render_group
    }

    /// Create an entity carrying a [`Name`] and a default [`Transform`].
    pub fn spawn(&mut self, name: &str) -> EntityId {
        let entity = self.registry.create();
        self.registry.emplace(entity, Name(name.to_string()));
        self.registry.emplace(entity, Transform::default());
        entity
    }

    pub fn set_camera(&mut self, entity: EntityId) {
        self.camera = Some(entity);
    }

    pub fn camera(&self) -> Option<EntityId> {
        self.camera
    }

    pub fn camera_component(&self) -> Option<&Camera> {
        self.registry.try_get::<Camera>(self.camera?)
    }

    pub fn camera_component_mut(&mut self) -> Option<&mut Camera> {
        self.registry.try_get_mut::<Camera>(self.camera?)
    }

    /// Register an entity whose [`OscillatingMover`] the keyboard can select.
    pub fn add_controllable(&mut self, entity: EntityId) {
        self.controllables.push(entity);
    }

    pub fn controllables(&self) -> &[EntityId] {
        &self.controllables
    }

    pub fn selected_controllable(&self) -> Option<EntityId> {
        self.controllables.get(self.selected).copied()
    }

    /// Move the selection by `step`, wrapping at both ends.
    ///
    /// The previously selected mover is disabled and the new one enabled.
    pub fn cycle_controllable(&mut self, step: isize) {
        if self.controllables.is_empty() {
            return;
        }
        self.set_mover_enabled(false);
        let len = self.controllables.len() as isize;
        self.selected = (self.selected as isize + step).rem_euclid(len) as usize;
        self.set_mover_enabled(true);
        tracing::debug!(selected = self.selected, "controllable selected");
    }

    pub fn selected_mover_mut(&mut self) -> Option<&mut OscillatingMover> {
        let entity = self.selected_controllable()?;
        gravefield_behaviour::behaviour_mut::<OscillatingMover>(&mut self.registry, entity)
    }

    pub fn entity_name(&self, entity: EntityId) -> Option<&str> {
        self.registry.try_get::<Name>(entity).map(|n| n.0.as_str())
    }

    /// Push the current lighting state onto the lit shader.
    pub fn apply_lighting(&mut self) -> Result<(), KernelError> {
        if let Some(handle) = self.lit_shader {
            self.lighting.apply(self.resources.shader_mut(handle)?);
        }
        Ok(())
    }

    /// View and projection for this frame from the camera entity.
    ///
    /// The view is the inverse of the camera's refreshed world matrix.
    pub fn frame_uniforms(&mut self, width: u32, height: u32) -> Result<FrameUniforms, KernelError> {
        let entity = self.camera.ok_or(KernelError::MissingCamera)?;
        let world = self
            .registry
            .try_get::<Transform>(entity)
            .ok_or(KernelError::MissingCamera)?
            .local_transform();
        let camera = self
            .registry
            .try_get_mut::<Camera>(entity)
            .ok_or(KernelError::MissingCamera)?;
        camera.set_aspect(width, height);
        Ok(FrameUniforms {
            view: world.inverse(),
            projection: camera.projection(),
            camera_position: world.w_axis.truncate(),
        })
    }

    /// Drop generator bookkeeping and selections ahead of shutdown.
    pub fn release(&mut self) {
        self.scatter.clean_up_pointers();
        self.controllables.clear();
        self.selected = 0;
        self.camera = None;
    }

    fn set_mover_enabled(&mut self, enabled: bool) {
        if let Some(mover) = self.selected_mover_mut() {
            mover.enabled = enabled;
        }
    }
}
