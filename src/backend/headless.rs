//! Headless backend for testing and offscreen runs.
//!
//! This backend doesn't touch the GPU. Every call is appended to a log of
//! [`BackendCall`]s so callers can inspect exactly what a frame would have
//! issued, in order.

use std::collections::HashSet;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::resources::{MeshKind, TextureData};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    BeginFrame,
    EndFrame,
    Resize { width: u32, height: u32 },
    CreateTexture {
        handle: TextureHandle,
        label: Option<String>,
        width: u32,
        height: u32,
        mip_levels: u32,
        sampler: SamplerDescriptor,
    },
    BindTexture { unit: u32, handle: TextureHandle },
    DestroyTexture(TextureHandle),
    LoadMesh(MeshKind),
    DrawMesh(MeshKind),
    Uniform { name: String, value: UniformValue },
}

/// Headless backend.
#[derive(Debug)]
pub struct HeadlessBackend {
    calls: Vec<BackendCall>,
    has_shader: bool,
    size: (u32, u32),
    next_texture_id: u64,
    live_textures: HashSet<TextureHandle>,
    loaded_meshes: HashSet<MeshKind>,
    frames: u64,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(1000, 800)
    }
}

impl HeadlessBackend {
    /// Create a headless backend with a shading stage.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            has_shader: true,
            size: (width, height),
            next_texture_id: 1,
            live_textures: HashSet::new(),
            loaded_meshes: HashSet::new(),
            frames: 0,
        }
    }

    /// Create a headless backend whose shading stage is missing.
    pub fn without_shader() -> Self {
        Self {
            has_shader: false,
            ..Self::default()
        }
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drop the recorded call log.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Uniform pushes in order, as (name, value) pairs.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.calls.iter().filter_map(|call| match call {
            BackendCall::Uniform { name, value } => Some((name.as_str(), value)),
            _ => None,
        })
    }

    /// Meshes drawn in order.
    pub fn draws(&self) -> Vec<MeshKind> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::DrawMesh(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    pub fn is_mesh_loaded(&self, kind: MeshKind) -> bool {
        self.loaded_meshes.contains(&kind)
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.calls.push(BackendCall::Resize { width, height });
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn begin_frame(&mut self) -> BackendResult<()> {
        log::trace!("HeadlessBackend: begin frame {}", self.frames);
        self.calls.push(BackendCall::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.frames += 1;
        self.calls.push(BackendCall::EndFrame);
        Ok(())
    }

    fn create_texture(
        &mut self,
        data: &TextureData,
        sampler: &SamplerDescriptor,
    ) -> BackendResult<TextureHandle> {
        log::trace!(
            "HeadlessBackend: creating texture {:?} ({}x{}, {} mips)",
            data.name,
            data.width,
            data.height,
            data.mip_level_count()
        );
        let handle = TextureHandle(self.next_texture_id);
        self.next_texture_id += 1;
        self.live_textures.insert(handle);
        self.calls.push(BackendCall::CreateTexture {
            handle,
            label: sampler.label.clone(),
            width: data.width,
            height: data.height,
            mip_levels: data.mip_level_count(),
            sampler: sampler.clone(),
        });
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> BackendResult<()> {
        if !self.live_textures.contains(&texture) {
            return Err(BackendError::UnknownTexture(texture));
        }
        self.calls.push(BackendCall::BindTexture {
            unit,
            handle: texture,
        });
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if self.live_textures.remove(&texture) {
            self.calls.push(BackendCall::DestroyTexture(texture));
        }
    }

    fn load_mesh(&mut self, kind: MeshKind) {
        log::trace!("HeadlessBackend: loading mesh {:?}", kind);
        self.loaded_meshes.insert(kind);
        self.calls.push(BackendCall::LoadMesh(kind));
    }

    fn draw_mesh(&mut self, kind: MeshKind) {
        if !self.loaded_meshes.contains(&kind) {
            log::warn!("HeadlessBackend: drawing {:?} before it was loaded", kind);
        }
        self.calls.push(BackendCall::DrawMesh(kind));
    }

    fn shader(&mut self) -> Option<&mut dyn ShaderUniforms> {
        if self.has_shader {
            Some(self)
        } else {
            None
        }
    }
}

impl ShaderUniforms for HeadlessBackend {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.calls.push(BackendCall::Uniform {
            name: name.to_string(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_shader_is_none() {
        let mut backend = HeadlessBackend::without_shader();
        assert!(backend.shader().is_none());

        let mut backend = HeadlessBackend::default();
        assert!(backend.shader().is_some());
    }

    #[test]
    fn binding_unknown_texture_fails() {
        let mut backend = HeadlessBackend::default();
        let texture = backend
            .create_texture(&TextureData::white(), &SamplerDescriptor::default())
            .unwrap();
        assert!(backend.bind_texture(0, texture).is_ok());

        backend.destroy_texture(texture);
        assert!(matches!(
            backend.bind_texture(0, texture),
            Err(BackendError::UnknownTexture(_))
        ));
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let mut backend = HeadlessBackend::default();
        backend.begin_frame().unwrap();
        backend.load_mesh(MeshKind::Box);
        if let Some(shader) = backend.shader() {
            shader.set_bool(uniforms::USE_TEXTURE, false);
        }
        backend.draw_mesh(MeshKind::Box);
        backend.end_frame().unwrap();

        assert_eq!(
            backend.calls(),
            &[
                BackendCall::BeginFrame,
                BackendCall::LoadMesh(MeshKind::Box),
                BackendCall::Uniform {
                    name: "bUseTexture".to_string(),
                    value: UniformValue::Bool(false),
                },
                BackendCall::DrawMesh(MeshKind::Box),
                BackendCall::EndFrame,
            ]
        );
        assert_eq!(backend.frame_count(), 1);
    }
}
