//! Spacecraft Scene - an orbit-camera demo on wgpu
//!
//! A fixed scene of a starship assembled from primitive meshes over a textured
//! ground plane, lit by one colored point light and an ambient term.
//!
//! # Features
//! - Tagged texture registry with up to 16 texture units
//! - Orbit camera driven by keyboard, mouse and scroll wheel
//! - Perspective and orthographic projections
//! - Backend seam with a wgpu implementation and a headless recorder for tests
//! - Scene configuration loaded from RON files

pub mod backend;
pub mod engine;
pub mod input;
pub mod resources;
pub mod scene;
pub mod window;

pub use backend::wgpu_backend::WgpuBackend;
pub use backend::{GraphicsBackend, HeadlessBackend};
pub use engine::{Engine, FrameOutcome};
pub use input::{InputActions, InputRouter};
pub use window::Window;

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

use resources::Material;
use scene::OrbitCamera;

/// Errors from loading a [`SceneConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// An image to load and the tag it is registered under
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextureSource {
    pub path: PathBuf,
    pub tag: String,
}

impl TextureSource {
    pub fn new(path: impl Into<PathBuf>, tag: &str) -> Self {
        Self {
            path: path.into(),
            tag: tag.to_string(),
        }
    }
}

/// Initial orbit camera parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub target: [f32; 3],
    /// Degrees
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    pub distance: f32,
    pub movement_speed: f32,
    /// Degrees per pixel
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target: [0.0; 3],
            yaw: -90.0,
            pitch: 0.0,
            distance: 10.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
        }
    }
}

impl CameraConfig {
    pub fn build(&self, aspect: f32) -> OrbitCamera {
        OrbitCamera::new(Vec3::from(self.target), self.yaw, self.pitch, self.distance)
            .with_speed(self.movement_speed)
            .with_sensitivity(self.mouse_sensitivity)
            .with_aspect(aspect)
    }
}

/// Phong material entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub tag: String,
    pub ambient_color: [f32; 3],
    pub ambient_strength: f32,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            tag: String::new(),
            ambient_color: [1.0; 3],
            ambient_strength: 0.2,
            diffuse_color: [1.0; 3],
            specular_color: [0.5; 3],
            shininess: 32.0,
        }
    }
}

impl From<&MaterialConfig> for Material {
    fn from(config: &MaterialConfig) -> Self {
        Material::new(&config.tag)
            .with_ambient(Vec3::from(config.ambient_color), config.ambient_strength)
            .with_diffuse(Vec3::from(config.diffuse_color))
            .with_specular(Vec3::from(config.specular_color), config.shininess)
    }
}

/// Configuration for the scene and its window
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Directory relative texture paths are resolved against
    pub texture_dir: PathBuf,
    /// Loaded in order, so the first entry gets slot 0
    pub textures: Vec<TextureSource>,
    pub camera: CameraConfig,
    pub materials: Vec<MaterialConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "Spacecraft Scene".to_string(),
            width: 1000,
            height: 800,
            vsync: true,
            texture_dir: PathBuf::from("assets/textures"),
            textures: vec![
                TextureSource::new("circular-brushed-gold-texture.jpg", "dome"),
                TextureSource::new("stainless.jpg", "hull"),
                TextureSource::new("stainless_end.jpg", "shuttlebay"),
                TextureSource::new("abstract.jpg", "planet"),
            ],
            camera: CameraConfig::default(),
            materials: Vec::new(),
        }
    }
}

impl SceneConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    pub fn from_ron_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Path of a texture, resolved against `texture_dir` unless absolute
    pub fn texture_path(&self, source: &TextureSource) -> PathBuf {
        if source.path.is_absolute() {
            source.path.clone()
        } else {
            self.texture_dir.join(&source.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads_the_four_scene_textures() {
        let config = SceneConfig::default();
        let tags: Vec<&str> = config.textures.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["dome", "hull", "shuttlebay", "planet"]);
        assert_eq!((config.width, config.height), (1000, 800));
        assert!(config.materials.is_empty());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = SceneConfig::from_ron_str(
            r#"(
                title: "Test",
                vsync: false,
                camera: (yaw: 0.0, distance: 5.0),
            )"#,
        )
        .unwrap();

        assert_eq!(config.title, "Test");
        assert!(!config.vsync);
        assert_eq!(config.width, 1000);
        assert_eq!(config.camera.yaw, 0.0);
        assert_eq!(config.camera.distance, 5.0);
        assert_eq!(config.camera.movement_speed, 2.5);
        assert_eq!(config.textures.len(), 4);
    }

    #[test]
    fn relative_texture_paths_resolve_against_texture_dir() {
        let config = SceneConfig {
            texture_dir: PathBuf::from("/data/textures"),
            ..Default::default()
        };
        let relative = TextureSource::new("hull.png", "hull");
        assert_eq!(
            config.texture_path(&relative),
            PathBuf::from("/data/textures/hull.png")
        );

        let absolute = TextureSource::new("/elsewhere/hull.png", "hull");
        assert_eq!(
            config.texture_path(&absolute),
            PathBuf::from("/elsewhere/hull.png")
        );
    }

    #[test]
    fn camera_config_builds_orbit_camera() {
        let config = CameraConfig {
            yaw: 0.0,
            distance: 4.0,
            movement_speed: 50.0,
            ..Default::default()
        };
        let camera = config.build(2.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), 1e-5));
        // Clamped to the scroll range
        assert_eq!(camera.movement_speed(), 10.0);
        assert_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn material_config_converts() {
        let config = MaterialConfig {
            tag: "metal".to_string(),
            shininess: 64.0,
            ..Default::default()
        };
        let material = Material::from(&config);
        assert_eq!(material.tag, "metal");
        assert_eq!(material.shininess, 64.0);
        assert_eq!(material.specular_color, Vec3::splat(0.5));
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        assert!(SceneConfig::from_ron_str("(width: \"wide\")").is_err());
    }
}
