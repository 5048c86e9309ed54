//! Texture loading and the tagged texture registry

use crate::backend::traits::*;
use crate::backend::types::*;
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of texture units the registry can fill
pub const MAX_TEXTURE_SLOTS: usize = 16;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("texture registry is full ({MAX_TEXTURE_SLOTS} slots)")]
    RegistryFull,
    #[error("texture tag must not be empty")]
    EmptyTag,
    #[error("texture tag {0:?} is already registered")]
    DuplicateTag(String),
    #[error("could not decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported channel count {0}, expected 3 (RGB) or 4 (RGBA)")]
    UnsupportedChannels(u8),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One level of a mip chain, tightly packed RGBA8
#[derive(Debug, Clone)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decoded texture ready for upload
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source image before expansion to RGBA
    pub channels: u8,
    pub name: String,
    /// Level 0 first, down to 1x1
    pub levels: Vec<MipLevel>,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(img, &name)
    }

    /// Create texture from a decoded image.
    ///
    /// The image is flipped vertically so row 0 is the bottom, and only RGB
    /// or RGBA sources are accepted.
    pub fn from_image(img: DynamicImage, name: &str) -> Result<Self, TextureError> {
        let channels = img.color().channel_count();
        if channels != 3 && channels != 4 {
            return Err(TextureError::UnsupportedChannels(channels));
        }

        let (width, height) = img.dimensions();
        let rgba = img.flipv().to_rgba8();

        Ok(Self {
            width,
            height,
            channels,
            name: name.to_string(),
            levels: Self::mip_chain(rgba),
        })
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            channels: 4,
            name: name.to_string(),
            levels: vec![MipLevel {
                width: 1,
                height: 1,
                data: color.to_vec(),
            }],
        }
    }

    /// Create a default white texture
    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    fn mip_chain(base: RgbaImage) -> Vec<MipLevel> {
        let (mut width, mut height) = base.dimensions();
        let mut levels = Vec::new();
        let mut current = base;

        loop {
            levels.push(MipLevel {
                width,
                height,
                data: current.as_raw().clone(),
            });
            if width == 1 && height == 1 {
                break;
            }
            width = (width / 2).max(1);
            height = (height / 2).max(1);
            current = image::imageops::resize(&current, width, height, FilterType::Triangle);
        }

        levels
    }
}

/// A loaded texture bound to the unit matching its index
#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub tag: String,
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// Up to [`MAX_TEXTURE_SLOTS`] textures addressed by tag.
///
/// Slot index, insertion order and texture unit are the same number. Lookup
/// misses are reported once per tag until that tag is found again.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    slots: Vec<TextureSlot>,
    reported_misses: HashSet<String>,
    miss_reports: usize,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file and register it under `tag`.
    ///
    /// On failure the registry is left untouched.
    pub fn load<B, P>(&mut self, backend: &mut B, path: P, tag: &str) -> Result<usize, TextureError>
    where
        B: GraphicsBackend + ?Sized,
        P: AsRef<Path>,
    {
        self.check_insert(tag)?;
        let data = TextureData::from_file(path.as_ref())?;
        log::info!(
            "Loaded {} ({}x{}, {} channels) as {:?}",
            path.as_ref().display(),
            data.width,
            data.height,
            data.channels,
            tag
        );
        self.insert(backend, data, tag)
    }

    /// Register an already decoded texture under `tag`.
    pub fn load_image<B>(
        &mut self,
        backend: &mut B,
        data: TextureData,
        tag: &str,
    ) -> Result<usize, TextureError>
    where
        B: GraphicsBackend + ?Sized,
    {
        self.check_insert(tag)?;
        self.insert(backend, data, tag)
    }

    fn check_insert(&self, tag: &str) -> Result<(), TextureError> {
        if self.slots.len() >= MAX_TEXTURE_SLOTS {
            return Err(TextureError::RegistryFull);
        }
        if tag.is_empty() {
            return Err(TextureError::EmptyTag);
        }
        if self.slots.iter().any(|slot| slot.tag == tag) {
            return Err(TextureError::DuplicateTag(tag.to_string()));
        }
        Ok(())
    }

    fn insert<B>(
        &mut self,
        backend: &mut B,
        data: TextureData,
        tag: &str,
    ) -> Result<usize, TextureError>
    where
        B: GraphicsBackend + ?Sized,
    {
        let handle = backend.create_texture(&data, &SamplerDescriptor::linear_repeat(tag))?;
        self.slots.push(TextureSlot {
            tag: tag.to_string(),
            handle,
            width: data.width,
            height: data.height,
            channels: data.channels,
        });
        self.bind_all(backend);
        Ok(self.slots.len() - 1)
    }

    /// Bind slot `i` to texture unit `i` for every loaded texture.
    pub fn bind_all<B>(&self, backend: &mut B)
    where
        B: GraphicsBackend + ?Sized,
    {
        for (unit, slot) in self.slots.iter().enumerate() {
            if let Err(e) = backend.bind_texture(unit as u32, slot.handle) {
                log::warn!("Failed to bind texture {:?} to unit {}: {}", slot.tag, unit, e);
            }
        }
    }

    /// Slot index of `tag`.
    pub fn slot_of(&mut self, tag: &str) -> Option<usize> {
        match self.slots.iter().position(|slot| slot.tag == tag) {
            Some(index) => {
                self.reported_misses.remove(tag);
                Some(index)
            }
            None => {
                if self.reported_misses.insert(tag.to_string()) {
                    self.miss_reports += 1;
                    log::warn!("No texture registered for tag {:?}", tag);
                }
                None
            }
        }
    }

    /// GPU handle of `tag`.
    pub fn id_of(&self, tag: &str) -> Option<TextureHandle> {
        self.slots
            .iter()
            .find(|slot| slot.tag == tag)
            .map(|slot| slot.handle)
    }

    /// Destroy every texture; the registry becomes empty.
    pub fn release_all<B>(&mut self, backend: &mut B)
    where
        B: GraphicsBackend + ?Sized,
    {
        for slot in self.slots.drain(..) {
            backend.destroy_texture(slot.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[TextureSlot] {
        &self.slots
    }

    /// Tags in slot order
    pub fn tags(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.tag.as_str()).collect()
    }

    /// Number of miss diagnostics emitted so far
    pub fn reported_miss_count(&self) -> usize {
        self.miss_reports
    }
}
