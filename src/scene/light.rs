//! Light types for the scene

use glam::Vec3;

use crate::backend::traits::ShaderUniforms;
use crate::backend::types::uniforms;

/// Where a light shines from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightSource {
    Positional(Vec3),
    /// Directionless, lights every surface evenly
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub source: LightSource,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn positional(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            source: LightSource::Positional(position),
            color,
            intensity: intensity.max(0.0),
        }
    }

    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            source: LightSource::Ambient,
            color,
            intensity: intensity.max(0.0),
        }
    }
}

/// The two lights of the scene: one colored point light and an ambient term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLights {
    primary: Light,
    ambient: Light,
}

impl Default for SceneLights {
    fn default() -> Self {
        Self {
            primary: Light::positional(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 0.55, 0.0), 1.5),
            ambient: Light::ambient(Vec3::ONE, 0.5),
        }
    }
}

impl SceneLights {
    pub fn primary(&self) -> &Light {
        &self.primary
    }

    pub fn ambient(&self) -> &Light {
        &self.ambient
    }

    /// Push `primaryLight.*` and `ambientLight.*`
    pub fn apply(&self, shader: &mut dyn ShaderUniforms) {
        let position = match self.primary.source {
            LightSource::Positional(position) => position,
            LightSource::Ambient => Vec3::ZERO,
        };
        shader.set_vec3(uniforms::PRIMARY_LIGHT_POSITION, position);
        shader.set_vec3(uniforms::PRIMARY_LIGHT_COLOR, self.primary.color);
        shader.set_float(uniforms::PRIMARY_LIGHT_INTENSITY, self.primary.intensity);

        shader.set_vec3(uniforms::AMBIENT_LIGHT_COLOR, self.ambient.color);
        shader.set_float(uniforms::AMBIENT_LIGHT_INTENSITY, self.ambient.intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GraphicsBackend, HeadlessBackend, UniformValue};

    #[test]
    fn default_lights() {
        let lights = SceneLights::default();
        assert_eq!(lights.primary().source, LightSource::Positional(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(lights.primary().intensity, 1.5);
        assert_eq!(lights.ambient().source, LightSource::Ambient);
        assert_eq!(lights.ambient().intensity, 0.5);
    }

    #[test]
    fn negative_intensity_is_clamped() {
        assert_eq!(Light::ambient(Vec3::ONE, -1.0).intensity, 0.0);
    }

    #[test]
    fn apply_pushes_both_lights() {
        let mut backend = HeadlessBackend::default();
        SceneLights::default().apply(backend.shader().unwrap());

        let names: Vec<&str> = backend.uniforms().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                "primaryLight.position",
                "primaryLight.color",
                "primaryLight.intensity",
                "ambientLight.color",
                "ambientLight.intensity",
            ]
        );
        let color = backend
            .uniforms()
            .find(|(name, _)| *name == "primaryLight.color")
            .map(|(_, value)| *value);
        assert_eq!(color, Some(UniformValue::Vec3(Vec3::new(1.0, 0.55, 0.0))));
    }
}
