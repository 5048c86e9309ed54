//! Core backend abstraction traits
//!
//! The scene talks to the GPU through two seams: [`ShaderUniforms`] receives
//! named values for the single scene shader, and [`GraphicsBackend`] owns
//! textures, meshes and the frame lifecycle.

use crate::backend::types::*;
use crate::resources::{MeshKind, TextureData};
use glam::{Mat4, Vec2, Vec3, Vec4};
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Unknown texture handle {0:?}")]
    UnknownTexture(TextureHandle),
    #[error("Texture unit {unit} out of range (max {max})")]
    TextureUnitOutOfRange { unit: u32, max: u32 },
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

impl TextureHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Receiver of named uniform values
pub trait ShaderUniforms {
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_sampler(&mut self, name: &str, unit: u32) {
        self.set_uniform(name, UniformValue::Sampler(unit));
    }
}

/// Graphics backend trait
pub trait GraphicsBackend {
    /// Resize the presentation surface
    fn resize(&mut self, width: u32, height: u32);

    /// Current surface size in pixels
    fn surface_size(&self) -> (u32, u32);

    /// Begin a new frame
    fn begin_frame(&mut self) -> BackendResult<()>;

    /// Submit everything drawn since `begin_frame` and present
    fn end_frame(&mut self) -> BackendResult<()>;

    /// Upload an image with its mip chain and create a sampler for it
    fn create_texture(
        &mut self,
        data: &TextureData,
        sampler: &SamplerDescriptor,
    ) -> BackendResult<TextureHandle>;

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> BackendResult<()>;

    /// Release a texture; unknown handles are ignored
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Create GPU buffers for a primitive kind
    fn load_mesh(&mut self, kind: MeshKind);

    /// Draw a primitive with the uniforms set so far
    fn draw_mesh(&mut self, kind: MeshKind);

    /// Shading stage, if one is available
    fn shader(&mut self) -> Option<&mut dyn ShaderUniforms>;
}
