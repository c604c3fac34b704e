//! The per-frame loop.
//!
//! # Invariants
//! - Phases run in a fixed order: poll, delta time, key watchers,
//!   behaviours, world matrices, view/projection, sort and draw off-screen,
//!   blit, swap.
//! - Key watchers are skipped while the UI owns the keyboard.
//! - Once [`DriverState::ShuttingDown`] is reached no further frame runs.

use crate::clock::FrameClock;
use crate::command::{SceneCommand, default_key_bindings};
use crate::error::KernelError;
use crate::scene::Scene;
use gravefield_input::{InputState, KeyBindings};
use gravefield_render::{DrawStats, RenderDevice, draw_render_group, sort_render_group};
use std::time::Instant;

/// Lifecycle of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    ShuttingDown,
}

/// The window/GPU side of the loop.
pub trait Host {
    /// Drain pending window events into `input`.
    fn poll_events(&mut self, input: &mut InputState);

    fn close_requested(&self) -> bool;

    /// Current framebuffer size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// True while a UI widget has keyboard focus.
    fn ui_wants_keyboard(&self) -> bool {
        false
    }

    fn device(&mut self) -> &mut dyn RenderDevice;

    /// Draw overlays and present the frame.
    fn swap_buffers(&mut self, scene: &mut Scene) -> Result<(), KernelError>;
}

/// What one frame did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub dt: f32,
    pub behaviours_updated: usize,
    pub commands_fired: Vec<SceneCommand>,
    pub draw: DrawStats,
}

#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    clock: FrameClock,
    input: InputState,
    bindings: KeyBindings<SceneCommand>,
    queued: Vec<SceneCommand>,
}

impl FrameDriver {
    pub fn new(now: Instant) -> Self {
        Self::with_bindings(now, default_key_bindings())
    }

    pub fn with_bindings(now: Instant, bindings: KeyBindings<SceneCommand>) -> Self {
        Self {
            state: DriverState::Running,
            clock: FrameClock::new(now),
            input: InputState::new(),
            bindings,
            queued: Vec::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    /// Queue a command to run with next frame's key commands.
    pub fn queue_command(&mut self, command: SceneCommand) {
        self.queued.push(command);
    }

    /// Leave the running state and release scene bookkeeping. Idempotent.
    pub fn shutdown(&mut self, scene: &mut Scene) {
        if self.state == DriverState::ShuttingDown {
            return;
        }
        tracing::info!(frames = self.clock.frames(), "frame driver shutting down");
        self.state = DriverState::ShuttingDown;
        scene.release();
    }

    /// Run one frame. Returns `None` once the driver is shutting down.
    pub fn frame(
        &mut self,
        scene: &mut Scene,
        host: &mut dyn Host,
        now: Instant,
    ) -> Result<Option<FrameReport>, KernelError> {
        if self.state == DriverState::ShuttingDown {
            return Ok(None);
        }

        host.poll_events(&mut self.input);
        if host.close_requested() {
            self.shutdown(scene);
            return Ok(None);
        }

        let dt = self.clock.tick(now);
        let _span = tracing::trace_span!("frame", n = self.clock.frames(), dt).entered();

        let mut commands = std::mem::take(&mut self.queued);
        if host.ui_wants_keyboard() {
            self.bindings.resync(&self.input);
        } else {
            commands.extend(self.bindings.poll(&self.input));
        }
        for command in &commands {
            command.apply(scene)?;
        }

        let behaviours_updated = gravefield_behaviour::dispatch(&mut scene.registry, &self.input, dt);
        gravefield_ecs::refresh_world_matrices(&mut scene.registry);

        let (width, height) = host.framebuffer_size();
        let frame = scene.frame_uniforms(width, height)?;

        let group = scene.render_group();
        sort_render_group(&mut scene.registry, group, &scene.resources);
        let device = host.device();
        device.begin_offscreen(scene.clear_color);
        let draw = draw_render_group(&scene.registry, group, &scene.resources, &frame, device)?;
        device.end_offscreen();
        device.present_offscreen();

        host.swap_buffers(scene)?;
        self.input.end_frame();

        Ok(Some(FrameReport {
            dt,
            behaviours_updated,
            commands_fired: commands,
            draw,
        }))
    }

    /// Drive frames until the host asks to close.
    pub fn run(&mut self, scene: &mut Scene, host: &mut dyn Host) -> Result<(), KernelError> {
        while self.frame(scene, host, Instant::now())?.is_some() {}
        Ok(())
    }
}
