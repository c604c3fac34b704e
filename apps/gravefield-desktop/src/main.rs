use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use gravefield_assets::AssetRoot;
use gravefield_input::InputState;
use gravefield_kernel::{FrameDriver, Host, KernelError, Scene, build_demo_scene};
use gravefield_render::RenderDevice;
use gravefield_render_wgpu::WgpuDevice;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

mod config;
mod input_map;
mod ui;

use config::DemoConfig;
use input_map::InputEvent;
use ui::DebugUi;

#[derive(Parser)]
#[command(name = "gravefield-desktop", about = "Graveyard scene demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Asset root directory [default: ./assets]
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Seed for the environment scatter
    #[arg(long)]
    seed: Option<u64>,

    /// JSON settings file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Window, GPU device and overlay as seen by the frame driver.
struct WindowHost {
    window: Arc<Window>,
    device: WgpuDevice,
    egui_ctx: egui::Context,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui: DebugUi,
    events: Vec<InputEvent>,
    close: bool,
}

impl WindowHost {
    fn paint_overlay(&mut self, output: egui::FullOutput) {
        let paint_jobs = self
            .egui_ctx
            .tessellate(output.shapes, output.pixels_per_point);
        let (width, height) = self.device.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: output.pixels_per_point,
        };
        let device = self.device.device();
        let queue = self.device.queue();

        for (id, image_delta) in &output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        if let Some(view) = self.device.frame_view() {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            let user_buffers = self.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                self.egui_renderer
                    .render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(user_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        }
        for id in &output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

impl Host for WindowHost {
    fn poll_events(&mut self, input: &mut InputState) {
        for event in self.events.drain(..) {
            event.apply(input);
        }
    }

    fn close_requested(&self) -> bool {
        self.close
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.device.size()
    }

    fn ui_wants_keyboard(&self) -> bool {
        self.egui_ctx.wants_keyboard_input()
    }

    fn device(&mut self) -> &mut dyn RenderDevice {
        &mut self.device
    }

    fn swap_buffers(&mut self, scene: &mut Scene) -> Result<(), KernelError> {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let mut lighting_changed = false;
        let mut output = self.egui_ctx.run(raw_input, |ctx| {
            lighting_changed = self.ui.show(ctx, scene);
        });
        self.egui_winit
            .handle_platform_output(&self.window, std::mem::take(&mut output.platform_output));
        if lighting_changed {
            scene.apply_lighting()?;
        }

        self.paint_overlay(output);
        self.device.present();
        Ok(())
    }
}

struct Running {
    host: WindowHost,
    scene: Scene,
    driver: FrameDriver,
}

struct GravefieldApp {
    config: DemoConfig,
    running: Option<Running>,
    failure: Option<anyhow::Error>,
}

impl GravefieldApp {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            running: None,
            failure: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title("Gravefield")
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;
        let size = window.inner_size();
        let mut device = pollster::block_on(WgpuDevice::new(
            &instance,
            surface,
            size.width,
            size.height,
        ))?;

        let assets = AssetRoot::new(&self.config.assets);
        let scene = build_demo_scene(
            &assets,
            &mut device,
            self.config.seed,
            self.config.max_attempts,
        )
        .with_context(|| format!("loading demo scene from {}", self.config.assets.display()))?;

        let egui_ctx = egui::Context::default();
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(device.device(), device.surface_format(), None, 1, false);

        tracing::info!(
            entities = scene.registry.entity_count(),
            seed = self.config.seed,
            "demo scene ready"
        );
        Ok(Running {
            host: WindowHost {
                window,
                device,
                egui_ctx,
                egui_winit,
                egui_renderer,
                ui: DebugUi::default(),
                events: Vec::new(),
                close: false,
            },
            scene,
            driver: FrameDriver::new(Instant::now()),
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(Running {
            host,
            scene,
            driver,
        }) = &mut self.running
        else {
            return;
        };
        match driver.frame(scene, host, Instant::now()) {
            Ok(Some(report)) => {
                host.ui.record_frame(&report);
                for command in host.ui.take_commands() {
                    driver.queue_command(command);
                }
                host.window.request_redraw();
            }
            Ok(None) => event_loop.exit(),
            Err(err) => {
                self.failure = Some(anyhow::Error::new(err).context("frame failed"));
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for GravefieldApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.host.window.request_redraw();
                self.running = Some(running);
            }
            Err(err) => {
                self.failure = Some(err.context("startup failed"));
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::RedrawRequested = event {
            self.redraw(event_loop);
            return;
        }
        let Some(running) = &mut self.running else {
            return;
        };
        let host = &mut running.host;
        let response = host.egui_winit.on_window_event(&host.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                host.close = true;
                host.window.request_redraw();
            }
            WindowEvent::Resized(size) => host.device.resize(size.width, size.height),
            WindowEvent::Focused(false) => host.events.push(InputEvent::Clear),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                // releases always go through so nothing stays held
                if let Some(key) = input_map::key(code).filter(|_| !response.consumed || !pressed) {
                    host.events.push(InputEvent::Key(key, pressed));
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                if let Some(button) = input_map::button(button).filter(|_| !response.consumed || !pressed) {
                    host.events.push(InputEvent::Button(button, pressed));
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let (DeviceEvent::MouseMotion { delta }, Some(running)) = (event, &mut self.running) {
            running
                .host
                .events
                .push(InputEvent::MouseMotion(Vec2::new(delta.0 as f32, delta.1 as f32)));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.host.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &mut self.running {
            running.driver.shutdown(&mut running.scene);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    }
    .with_overrides(cli.assets, cli.seed);
    tracing::info!(
        assets = %config.assets.display(),
        seed = config.seed,
        "gravefield-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GravefieldApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).inspect_err(|err| tracing::error!("{err:#}"))
}
