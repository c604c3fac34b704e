use glam::Vec3;
use gravefield_behaviour::{FollowPath, bind_with};
use gravefield_common::Transform;
use gravefield_ecs::Renderable;
use gravefield_input::{InputState, Key};
use gravefield_kernel::{
    DriverState, FrameDriver, Host, KernelError, MAX_FRAME_DELTA, Scene, SceneCommand,
};
use gravefield_render::{
    Camera, DeviceCommand, Material, RecordingDevice, RenderDevice, ShaderLayout, ShaderProgram,
};
use gravefield_scatter::EnvironmentGenerator;
use std::time::{Duration, Instant};

#[derive(Default)]
struct MockHost {
    device: RecordingDevice,
    held: Vec<Key>,
    close: bool,
    ui_focus: bool,
    swaps: usize,
}

impl Host for MockHost {
    fn poll_events(&mut self, input: &mut InputState) {
        input.clear();
        for key in &self.held {
            input.set_key(*key, true);
        }
    }

    fn close_requested(&self) -> bool {
        self.close
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (1280, 720)
    }

    fn ui_wants_keyboard(&self) -> bool {
        self.ui_focus
    }

    fn device(&mut self) -> &mut dyn RenderDevice {
        &mut self.device
    }

    fn swap_buffers(&mut self, _scene: &mut Scene) -> Result<(), KernelError> {
        self.swaps += 1;
        Ok(())
    }
}

/// Camera plus one walker that moves toward +X at one unit per second.
fn walker_scene() -> (Scene, gravefield_common::EntityId) {
    let mut scene = Scene::new(EnvironmentGenerator::new(0));
    let lit = scene
        .resources
        .add_shader(ShaderProgram::new("lit", ShaderLayout::Lit));
    scene.lit_shader = Some(lit);
    let material = scene.resources.add_material(Material::new(lit)).unwrap();

    let camera = scene.spawn("Camera");
    scene.registry.emplace(camera, Camera::default());
    scene
        .registry
        .get_mut::<Transform>(camera)
        .set_local_position(Vec3::new(0.0, 3.0, 3.0));
    scene.set_camera(camera);

    let walker = scene.spawn("walker");
    scene.registry.emplace(
        walker,
        Renderable {
            mesh: gravefield_ecs::MeshHandle(0),
            material,
        },
    );
    bind_with(
        &mut scene.registry,
        walker,
        FollowPath::new(vec![Vec3::X, Vec3::new(1.0, 1.0, 0.0)], 1.0),
    );
    (scene, walker)
}

#[test]
fn behaviour_moves_are_drawn_in_the_same_frame() {
    let (mut scene, walker) = walker_scene();
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost::default();

    let report = driver
        .frame(&mut scene, &mut host, start + Duration::from_millis(500))
        .unwrap()
        .unwrap();
    assert_eq!(report.behaviours_updated, 1);
    assert_eq!(report.draw.draw_calls, 1);
    assert_eq!(host.swaps, 1);

    let moved = scene.registry.get::<Transform>(walker).world_position();
    assert!(moved.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-5));
    let drawn = host
        .device
        .commands()
        .iter()
        .find_map(|c| match c {
            DeviceCommand::Draw { model, .. } => Some(model.w_axis.truncate()),
            _ => None,
        })
        .unwrap();
    assert!(drawn.abs_diff_eq(moved, 1e-5));
}

#[test]
fn frame_stream_is_offscreen_then_present() {
    let (mut scene, _) = walker_scene();
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost::default();
    driver
        .frame(&mut scene, &mut host, start + Duration::from_millis(16))
        .unwrap();

    let commands = host.device.commands();
    assert_eq!(commands.first(), Some(&DeviceCommand::BeginOffscreen));
    assert_eq!(commands[commands.len() - 2], DeviceCommand::EndOffscreen);
    assert_eq!(commands.last(), Some(&DeviceCommand::Present));
    assert_eq!(host.device.unbound_draws(), 0);
}

#[test]
fn stalled_frame_is_clamped() {
    let (mut scene, walker) = walker_scene();
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost::default();
    let report = driver
        .frame(&mut scene, &mut host, start + Duration::from_secs(30))
        .unwrap()
        .unwrap();
    assert_eq!(report.dt, MAX_FRAME_DELTA);
    // one second at unit speed reaches the first waypoint, not further
    let p = scene.registry.get::<Transform>(walker).local_position();
    assert!(p.abs_diff_eq(Vec3::X, 1e-5));
}

#[test]
fn close_request_shuts_down_once() {
    let (mut scene, walker) = walker_scene();
    scene.add_controllable(walker);
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost {
        close: true,
        ..MockHost::default()
    };

    assert!(driver.frame(&mut scene, &mut host, start).unwrap().is_none());
    assert_eq!(driver.state(), DriverState::ShuttingDown);
    assert!(scene.controllables().is_empty());
    assert!(scene.camera().is_none());
    assert_eq!(host.swaps, 0);

    host.close = false;
    assert!(driver.frame(&mut scene, &mut host, start).unwrap().is_none());
    assert!(host.device.commands().is_empty());
}

#[test]
fn run_returns_after_close() {
    let (mut scene, _) = walker_scene();
    let mut driver = FrameDriver::new(Instant::now());
    let mut host = MockHost {
        close: true,
        ..MockHost::default()
    };
    driver.run(&mut scene, &mut host).unwrap();
    assert_eq!(driver.state(), DriverState::ShuttingDown);
}

#[test]
fn key_press_fires_once_while_held() {
    let (mut scene, _) = walker_scene();
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost {
        held: vec![Key::T],
        ..MockHost::default()
    };

    let first = driver.frame(&mut scene, &mut host, start).unwrap().unwrap();
    assert_eq!(first.commands_fired, vec![SceneCommand::ToggleOrthographic]);
    assert!(scene.camera_component().unwrap().orthographic);

    let second = driver.frame(&mut scene, &mut host, start).unwrap().unwrap();
    assert!(second.commands_fired.is_empty());
    assert!(scene.camera_component().unwrap().orthographic);
}

#[test]
fn ui_focus_suppresses_key_commands() {
    let (mut scene, _) = walker_scene();
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost {
        held: vec![Key::T],
        ui_focus: true,
        ..MockHost::default()
    };
    let report = driver.frame(&mut scene, &mut host, start).unwrap().unwrap();
    assert!(report.commands_fired.is_empty());
    assert!(!scene.camera_component().unwrap().orthographic);

    // the key was already down when focus left, so no edge fires
    host.ui_focus = false;
    let report = driver.frame(&mut scene, &mut host, start).unwrap().unwrap();
    assert!(report.commands_fired.is_empty());
}

#[test]
fn queued_commands_run_even_with_ui_focus() {
    let (mut scene, _) = walker_scene();
    let start = Instant::now();
    let mut driver = FrameDriver::new(start);
    let mut host = MockHost {
        ui_focus: true,
        ..MockHost::default()
    };
    driver.queue_command(SceneCommand::ToggleLight);
    let report = driver.frame(&mut scene, &mut host, start).unwrap().unwrap();
    assert_eq!(report.commands_fired, vec![SceneCommand::ToggleLight]);
    assert!(scene.lighting.light_on);
}

#[test]
fn missing_camera_is_an_error() {
    let mut scene = Scene::new(EnvironmentGenerator::new(0));
    let mut driver = FrameDriver::new(Instant::now());
    let mut host = MockHost::default();
    assert!(matches!(
        driver.frame(&mut scene, &mut host, Instant::now()),
        Err(KernelError::MissingCamera)
    ));
}
