//! Shared fixtures for the scene integration tests.

use std::path::{Path, PathBuf};

use image::{GrayAlphaImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

/// Write a solid RGB PNG and return its path.
pub fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([180, 150, 40]))
        .save(&path)
        .unwrap();
    path
}

/// Write a solid RGBA PNG and return its path.
pub fn write_rgba_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([200, 200, 210, 255]))
        .save(&path)
        .unwrap();
    path
}

/// Write a two-channel (luma + alpha) PNG and return its path.
pub fn write_luma_alpha_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    GrayAlphaImage::from_pixel(width, height, LumaA([128, 255]))
        .save(&path)
        .unwrap();
    path
}
