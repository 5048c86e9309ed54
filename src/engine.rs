//! Main engine orchestrator
//!
//! Owns the backend, camera, input router, registries and the scene composer,
//! and drives one frame at a time.

use winit::event::{DeviceEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::backend::traits::*;
use crate::input::InputRouter;
use crate::resources::{Material, MaterialRegistry, TextureRegistry};
use crate::scene::{OrbitCamera, SceneComposer};
use crate::SceneConfig;

/// Pixels of trackpad scrolling per wheel line
const PIXELS_PER_LINE: f64 = 100.0;

/// What happened to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// The backend couldn't produce a frame; try again next tick
    Skipped,
    /// Escape was held or the backend failed fatally
    Exit,
}

/// The scene engine
pub struct Engine<B: GraphicsBackend> {
    backend: B,
    camera: OrbitCamera,
    input: InputRouter,
    textures: TextureRegistry,
    materials: MaterialRegistry,
    composer: SceneComposer,
    config: SceneConfig,
    frames: u64,
}

impl<B: GraphicsBackend> Engine<B> {
    pub fn new(backend: B, config: SceneConfig) -> Self {
        let (width, height) = backend.surface_size();
        let camera = config
            .camera
            .build(width.max(1) as f32 / height.max(1) as f32);

        let mut materials = MaterialRegistry::new();
        for material in &config.materials {
            materials.add(Material::from(material));
        }

        Self {
            backend,
            camera,
            input: InputRouter::new(),
            textures: TextureRegistry::new(),
            materials,
            composer: SceneComposer::spacecraft(),
            config,
            frames: 0,
        }
    }

    /// Load the configured textures and every mesh the scene draws.
    ///
    /// A texture that fails to load is logged and skipped. Returns how many
    /// textures were registered.
    pub fn prepare(&mut self) -> usize {
        let mut loaded = 0;
        for source in &self.config.textures {
            let path = self.config.texture_path(source);
            match self.textures.load(&mut self.backend, &path, &source.tag) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("Skipping texture {:?}: {}", source.tag, e),
            }
        }

        self.composer.prepare(&mut self.backend);
        log::info!(
            "Scene ready: {} of {} textures, {} draw instructions",
            loaded,
            self.config.textures.len(),
            self.composer.instructions().len()
        );
        loaded
    }

    /// Apply held input for `dt` seconds, then render the scene.
    pub fn frame(&mut self, dt: f32) -> FrameOutcome {
        let actions = self.input.poll(&mut self.camera, dt);
        if actions.close_requested {
            return FrameOutcome::Exit;
        }

        if let Err(e) = self.backend.begin_frame() {
            return self.frame_failed(e);
        }

        if let Some(shader) = self.backend.shader() {
            self.camera.apply(shader);
        }
        self.composer
            .render(&mut self.backend, &mut self.textures, &self.materials);

        if let Err(e) = self.backend.end_frame() {
            return self.frame_failed(e);
        }

        self.frames += 1;
        FrameOutcome::Rendered
    }

    fn frame_failed(&self, error: BackendError) -> FrameOutcome {
        match error {
            BackendError::SurfaceLost => {
                log::debug!("Surface reconfigured, skipping frame");
                FrameOutcome::Skipped
            }
            BackendError::OutOfMemory => {
                log::error!("Out of memory");
                FrameOutcome::Exit
            }
            e => {
                log::warn!("Frame skipped: {}", e);
                FrameOutcome::Skipped
            }
        }
    }

    /// Route a window event to input or resize handling
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.input.on_key(key, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .on_cursor_moved(&mut self.camera, position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                self.input.on_scroll(&mut self.camera, dy);
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::Focused(false) => self.input.release_all_keys(),
            _ => {}
        }
    }

    /// Route raw mouse motion to the camera
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.on_mouse_motion(&mut self.camera, delta.0, delta.1);
        }
    }

    /// Resize the surface and follow the new aspect ratio
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.backend.resize(width, height);

        // Surface size may be clamped by device limits
        let (width, height) = self.backend.surface_size();
        self.camera.set_aspect(width as f32 / height.max(1) as f32);
    }

    /// Release every texture. Called on drop.
    pub fn shutdown(&mut self) {
        if !self.textures.is_empty() {
            log::debug!("Releasing {} textures", self.textures.len());
            self.textures.release_all(&mut self.backend);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn input_mut(&mut self) -> &mut InputRouter {
        &mut self.input
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl<B: GraphicsBackend> Drop for Engine<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
