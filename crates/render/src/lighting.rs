use crate::shader::ShaderProgram;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Light and ambient state shared by every lit material.
///
/// Owned by the scene and pushed onto the lit shader with [`SceneLighting::apply`]
/// whenever a toggle or the debug UI changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLighting {
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub light_ambient_power: f32,
    pub light_specular_power: f32,
    pub ambient_color: Vec3,
    pub ambient_power: f32,
    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
    pub toon_shading: f32,
    pub light_on: bool,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(0.0, 0.0, 5.0),
            light_color: Vec3::new(0.5, 0.5, 0.7),
            light_ambient_power: 2.0,
            light_specular_power: 1.0,
            ambient_color: Vec3::ONE,
            ambient_power: 0.1,
            attenuation_constant: 1.0,
            attenuation_linear: 0.09,
            attenuation_quadratic: 0.032,
            toon_shading: 1.0,
            light_on: false,
        }
    }
}

impl SceneLighting {
    /// Write every lighting uniform onto `shader`.
    pub fn apply(&self, shader: &mut ShaderProgram) {
        shader.set_uniform("u_LightPos", self.light_position);
        shader.set_uniform("u_LightCol", self.light_color);
        shader.set_uniform("u_AmbientLightStrength", self.light_ambient_power);
        shader.set_uniform("u_SpecularLightStrength", self.light_specular_power);
        shader.set_uniform("u_AmbientCol", self.ambient_color);
        shader.set_uniform("u_AmbientStrength", self.ambient_power);
        shader.set_uniform("u_LightAttenuationConstant", self.attenuation_constant);
        shader.set_uniform("u_LightAttenuationLinear", self.attenuation_linear);
        shader.set_uniform("u_LightAttenuationQuadratic", self.attenuation_quadratic);
        shader.set_uniform("u_toonShading", self.toon_shading);
    }

    /// Move the light far away (off) or overhead without falloff (on).
    pub fn toggle_light(&mut self) {
        if self.light_on {
            self.light_position = Vec3::new(0.0, 0.0, -1000.0);
            self.attenuation_linear = 0.019;
            self.attenuation_quadratic = 0.5;
            self.light_on = false;
        } else {
            self.light_position = Vec3::new(0.0, 0.0, 10.0);
            self.attenuation_linear = 0.0;
            self.attenuation_quadratic = 0.0;
            self.light_on = true;
        }
    }

    pub fn toggle_ambient_only(&mut self) {
        if self.light_ambient_power > 0.0 {
            self.light_ambient_power = 0.0;
        } else {
            self.light_ambient_power = 1.0;
        }
        self.light_specular_power = 0.0;
    }

    pub fn toggle_specular_only(&mut self) {
        if self.light_specular_power > 0.0 {
            self.light_specular_power = 0.0;
        } else {
            self.light_specular_power = 1.0;
        }
        self.light_ambient_power = 0.0;
    }

    pub fn toggle_ambient_specular(&mut self) {
        let on = if self.light_specular_power > 0.0 { 0.0 } else { 1.0 };
        self.light_ambient_power = on;
        self.light_specular_power = on;
    }

    /// Also flips toon shading along with the light terms.
    pub fn toggle_all_effects(&mut self) {
        let on = if self.light_specular_power > 0.0 { 0.0 } else { 1.0 };
        self.light_ambient_power = on;
        self.light_specular_power = on;
        self.toon_shading = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderLayout;
    use crate::uniform::UniformValue;

    #[test]
    fn apply_writes_all_uniforms() {
        let mut shader = ShaderProgram::new("lit", ShaderLayout::Lit);
        SceneLighting::default().apply(&mut shader);
        assert_eq!(shader.uniforms().len(), 10);
        assert_eq!(
            shader.uniform("u_LightPos"),
            Some(&UniformValue::Vec3(Vec3::new(0.0, 0.0, 5.0)))
        );
        assert_eq!(shader.uniform("u_toonShading"), Some(&UniformValue::Float(1.0)));
    }

    #[test]
    fn light_toggle_round_trip() {
        let mut l = SceneLighting::default();
        l.toggle_light();
        assert!(l.light_on);
        assert_eq!(l.light_position.z, 10.0);
        assert_eq!(l.attenuation_linear, 0.0);
        l.toggle_light();
        assert!(!l.light_on);
        assert_eq!(l.light_position.z, -1000.0);
        assert_eq!(l.attenuation_quadratic, 0.5);
    }

    #[test]
    fn ambient_only_clears_specular() {
        let mut l = SceneLighting::default();
        l.toggle_ambient_only();
        assert_eq!((l.light_ambient_power, l.light_specular_power), (0.0, 0.0));
        l.toggle_ambient_only();
        assert_eq!((l.light_ambient_power, l.light_specular_power), (1.0, 0.0));
    }

    #[test]
    fn specular_only_clears_ambient() {
        let mut l = SceneLighting::default();
        l.toggle_specular_only();
        assert_eq!((l.light_ambient_power, l.light_specular_power), (0.0, 0.0));
        l.toggle_specular_only();
        assert_eq!((l.light_ambient_power, l.light_specular_power), (0.0, 1.0));
    }

    #[test]
    fn all_effects_toggles_toon_shading_too() {
        let mut l = SceneLighting::default();
        l.toggle_all_effects();
        assert_eq!(l.toon_shading, 0.0);
        assert_eq!(l.light_ambient_power, 0.0);
        l.toggle_all_effects();
        assert_eq!(l.toon_shading, 1.0);
        assert_eq!(l.light_specular_power, 1.0);
        l.toggle_ambient_specular();
        assert_eq!((l.light_ambient_power, l.light_specular_power), (0.0, 0.0));
    }
}
