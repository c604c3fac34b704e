use crate::error::KernelError;
use crate::scene::Scene;
use gravefield_input::{Key, KeyBindings};
use serde::{Deserialize, Serialize};

/// Discrete scene changes triggered by key presses or UI buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneCommand {
    ToggleOrthographic,
    NextControllable,
    PreviousControllable,
    ToggleRelativeRotation,
    ToggleLight,
    ToggleAmbientOnly,
    ToggleSpecularOnly,
    ToggleAmbientSpecular,
    ToggleAllEffects,
    RegenerateEnvironment,
}

impl SceneCommand {
    pub fn apply(self, scene: &mut Scene) -> Result<(), KernelError> {
        match self {
            Self::ToggleOrthographic => {
                if let Some(camera) = scene.camera_component_mut() {
                    let ortho = camera.toggle_ortho();
                    tracing::info!(ortho, "camera projection toggled");
                }
            }
            Self::NextControllable => scene.cycle_controllable(1),
            Self::PreviousControllable => scene.cycle_controllable(-1),
            Self::ToggleRelativeRotation => {
                if let Some(mover) = scene.selected_mover_mut() {
                    mover.relative = !mover.relative;
                }
            }
            Self::ToggleLight => self.relight(scene, |l| l.toggle_light())?,
            Self::ToggleAmbientOnly => self.relight(scene, |l| l.toggle_ambient_only())?,
            Self::ToggleSpecularOnly => self.relight(scene, |l| l.toggle_specular_only())?,
            Self::ToggleAmbientSpecular => self.relight(scene, |l| l.toggle_ambient_specular())?,
            Self::ToggleAllEffects => self.relight(scene, |l| l.toggle_all_effects())?,
            Self::RegenerateEnvironment => {
                let report = scene.scatter.regenerate(&mut scene.registry);
                tracing::info!(placed = report.placed(), "environment regenerated");
            }
        }
        Ok(())
    }

    fn relight(
        self,
        scene: &mut Scene,
        toggle: impl FnOnce(&mut gravefield_render::SceneLighting),
    ) -> Result<(), KernelError> {
        toggle(&mut scene.lighting);
        scene.apply_lighting()
    }
}

/// The demo's keyboard layout.
pub fn default_key_bindings() -> KeyBindings<SceneCommand> {
    let mut bindings = KeyBindings::new();
    bindings
        .bind(Key::T, SceneCommand::ToggleOrthographic)
        .bind(Key::NumpadAdd, SceneCommand::NextControllable)
        .bind(Key::NumpadSubtract, SceneCommand::PreviousControllable)
        .bind(Key::Y, SceneCommand::ToggleRelativeRotation)
        .bind(Key::Digit1, SceneCommand::ToggleLight)
        .bind(Key::Digit2, SceneCommand::ToggleAmbientOnly)
        .bind(Key::Digit3, SceneCommand::ToggleSpecularOnly)
        .bind(Key::Digit4, SceneCommand::ToggleAmbientSpecular)
        .bind(Key::Digit5, SceneCommand::ToggleAllEffects);
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravefield_render::{Camera, ShaderLayout, ShaderProgram, UniformValue};
    use gravefield_scatter::EnvironmentGenerator;

    fn lit_scene() -> Scene {
        let mut scene = Scene::new(EnvironmentGenerator::new(0));
        let lit = scene
            .resources
            .add_shader(ShaderProgram::new("lit", ShaderLayout::Lit));
        scene.lit_shader = Some(lit);
        scene
    }

    #[test]
    fn light_toggle_reaches_the_shader() {
        let mut scene = lit_scene();
        SceneCommand::ToggleLight.apply(&mut scene).unwrap();
        let shader = scene.resources.shader(scene.lit_shader.unwrap()).unwrap();
        assert_eq!(
            shader.uniform("u_LightPos"),
            Some(&UniformValue::Vec3(glam::Vec3::new(0.0, 0.0, 10.0)))
        );
        assert_eq!(shader.uniform("u_LightAttenuationLinear"), Some(&UniformValue::Float(0.0)));
    }

    #[test]
    fn all_effects_also_switches_toon_shading() {
        let mut scene = lit_scene();
        SceneCommand::ToggleAllEffects.apply(&mut scene).unwrap();
        let shader = scene.resources.shader(scene.lit_shader.unwrap()).unwrap();
        assert_eq!(shader.uniform("u_toonShading"), Some(&UniformValue::Float(0.0)));
    }

    #[test]
    fn ortho_toggle_flips_camera() {
        let mut scene = lit_scene();
        let cam = scene.spawn("Camera");
        scene.registry.emplace(cam, Camera::default());
        scene.set_camera(cam);
        SceneCommand::ToggleOrthographic.apply(&mut scene).unwrap();
        assert!(scene.camera_component().unwrap().orthographic);
    }

    #[test]
    fn default_bindings_cover_all_keys() {
        let bindings = default_key_bindings();
        assert_eq!(bindings.len(), 9);
        let keys: Vec<_> = bindings.watchers().iter().map(|w| w.key()).collect();
        assert!(keys.contains(&Key::Digit5) && keys.contains(&Key::T));
    }
}
