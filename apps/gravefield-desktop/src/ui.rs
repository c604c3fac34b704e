//! egui overlay: environment, lighting and controllable panels plus an FPS plot.

use glam::Vec3;
use gravefield_kernel::demo::CONTROLS_HELP;
use gravefield_kernel::{FrameReport, Scene, SceneCommand};
use gravefield_render::{DrawStats, SceneLighting};
use gravefield_tools::{FPS_HISTORY_LEN, FpsHistory, SceneInspector};

#[derive(Debug, Default)]
pub struct DebugUi {
    fps: FpsHistory,
    last_draw: DrawStats,
    commands: Vec<SceneCommand>,
}

impl DebugUi {
    pub fn record_frame(&mut self, report: &FrameReport) {
        self.fps.push(report.dt);
        self.last_draw = report.draw;
    }

    /// Commands raised by widgets since the last call.
    pub fn take_commands(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Lay out every panel. Returns true when lighting was edited.
    pub fn show(&mut self, ctx: &egui::Context, scene: &mut Scene) -> bool {
        egui::Window::new("Environment generation").show(ctx, |ui| {
            if ui.button("Regenerate Environment").clicked() {
                self.commands.push(SceneCommand::RegenerateEnvironment);
            }
            ui.label(SceneInspector::summary(scene).to_string());
        });

        let mut lighting_changed = false;
        egui::Window::new("Scene Level Lighting Settings").show(ctx, |ui| {
            lighting_changed |= scene_lighting(ui, &mut scene.lighting);
        });
        egui::Window::new("Light Level Lighting Settings").show(ctx, |ui| {
            lighting_changed |= light_settings(ui, &mut scene.lighting);
        });

        egui::Window::new("Controllable").show(ctx, |ui| {
            let selected = scene
                .selected_controllable()
                .and_then(|e| scene.entity_name(e))
                .unwrap_or("none")
                .to_string();
            ui.label(format!("Selected: {selected}"));
            if let Some(mover) = scene.selected_mover_mut() {
                ui.checkbox(&mut mover.relative, "Relative Rotation");
            }
            ui.separator();
            ui.label(CONTROLS_HELP);
        });

        egui::Window::new("Performance").show(ctx, |ui| {
            if let (Some(min), Some(max), Some(avg)) =
                (self.fps.min(), self.fps.max(), self.fps.average())
            {
                ui.label(format!("FPS min {min:.0}  max {max:.0}  avg {avg:.1}"));
            }
            fps_plot(ui, &self.fps);
            ui.small(format!(
                "shaders {}  materials {}  draws {}",
                self.last_draw.shader_binds, self.last_draw.material_applies, self.last_draw.draw_calls
            ));
        });

        lighting_changed
    }
}

fn scene_lighting(ui: &mut egui::Ui, lighting: &mut SceneLighting) -> bool {
    let mut changed = color_edit(ui, "Ambient color", &mut lighting.ambient_color);
    changed |= ui
        .add(egui::Slider::new(&mut lighting.ambient_power, 0.0..=1.0).text("Ambient power"))
        .changed();
    changed
}

fn light_settings(ui: &mut egui::Ui, lighting: &mut SceneLighting) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label("Position");
        for axis in 0..3 {
            changed |= ui
                .add(egui::DragValue::new(&mut lighting.light_position[axis]).speed(0.1))
                .changed();
        }
    });
    changed |= color_edit(ui, "Color", &mut lighting.light_color);
    changed |= ui
        .add(egui::Slider::new(&mut lighting.light_ambient_power, 0.0..=5.0).text("Ambient power"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut lighting.light_specular_power, 0.0..=5.0).text("Specular power"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut lighting.attenuation_linear, 0.0..=1.0).text("Linear falloff"))
        .changed();
    changed |= ui
        .add(
            egui::Slider::new(&mut lighting.attenuation_quadratic, 0.0..=1.0)
                .text("Quadratic falloff"),
        )
        .changed();
    changed
}

fn color_edit(ui: &mut egui::Ui, label: &str, color: &mut Vec3) -> bool {
    let mut rgb = color.to_array();
    let changed = ui
        .horizontal(|ui| {
            ui.label(label);
            ui.color_edit_button_rgb(&mut rgb).changed()
        })
        .inner;
    if changed {
        *color = Vec3::from_array(rgb);
    }
    changed
}

fn fps_plot(ui: &mut egui::Ui, history: &FpsHistory) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(240.0, 60.0), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 2.0, ui.visuals().extreme_bg_color);

    let top = history.max().unwrap_or(60.0).max(1.0);
    let step = rect.width() / (FPS_HISTORY_LEN - 1) as f32;
    let points: Vec<egui::Pos2> = history
        .samples()
        .enumerate()
        .map(|(i, fps)| egui::pos2(rect.left() + step * i as f32, rect.bottom() - rect.height() * fps / top))
        .collect();
    if points.len() > 1 {
        painter.add(egui::Shape::line(points, egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN)));
    }
}
