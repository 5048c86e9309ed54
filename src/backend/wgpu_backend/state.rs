//! CPU-side uniform state for the scene shader
//!
//! Named uniforms are folded into one [`DrawUniforms`] block. Every draw
//! snapshots the block, so values carry over between draws until changed.

use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

use crate::backend::traits::ShaderUniforms;
use crate::backend::types::{uniforms, UniformValue as V};

/// Uniform block layout shared with `SCENE_SHADER`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// Inverse transpose of `model`
    pub normal_matrix: Mat4,
    pub view_position: Vec4,
    pub object_color: Vec4,
    pub light_position: Vec4,
    /// rgb color, w intensity
    pub light_color: Vec4,
    /// rgb color, w intensity
    pub ambient_light: Vec4,
    /// rgb color, w strength
    pub material_ambient: Vec4,
    pub material_diffuse: Vec4,
    /// rgb color, w shininess
    pub material_specular: Vec4,
    pub uv_scale: Vec2,
    pub use_texture: u32,
    pub use_material: u32,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
            view_position: Vec4::W,
            object_color: Vec4::ONE,
            light_position: Vec4::W,
            light_color: Vec4::ONE,
            ambient_light: Vec4::ONE,
            material_ambient: Vec4::ZERO,
            material_diffuse: Vec4::ZERO,
            material_specular: Vec4::ZERO,
            uv_scale: Vec2::ONE,
            use_texture: 0,
            use_material: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct ShaderState {
    pub current: DrawUniforms,
    /// Texture unit sampled as `objectTexture`
    pub texture_unit: u32,
    ignored: HashSet<String>,
}

impl ShaderState {
    fn ignore(&mut self, name: &str, value: V) {
        if self.ignored.insert(name.to_string()) {
            log::warn!("Ignoring uniform {:?} of kind {}", name, value.kind());
        }
    }
}

fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() > f32::EPSILON {
        model.inverse().transpose()
    } else {
        Mat4::IDENTITY
    }
}

impl ShaderUniforms for ShaderState {
    fn set_uniform(&mut self, name: &str, value: V) {
        let u = &mut self.current;
        match (name, value) {
            (uniforms::MODEL, V::Mat4(m)) => {
                u.model = m;
                u.normal_matrix = normal_matrix(m);
            }
            (uniforms::VIEW, V::Mat4(m)) => u.view = m,
            (uniforms::PROJECTION, V::Mat4(m)) => u.projection = m,
            (uniforms::VIEW_POSITION, V::Vec3(p)) => u.view_position = p.extend(1.0),

            (uniforms::USE_TEXTURE, V::Bool(b)) => u.use_texture = b as u32,
            (uniforms::USE_TEXTURE, V::Int(i)) => u.use_texture = (i != 0) as u32,
            (uniforms::OBJECT_COLOR, V::Vec4(c)) => u.object_color = c,
            (uniforms::OBJECT_TEXTURE, V::Sampler(unit)) => self.texture_unit = unit,
            (uniforms::OBJECT_TEXTURE, V::Int(unit)) if unit >= 0 => {
                self.texture_unit = unit as u32
            }
            (uniforms::UV_SCALE, V::Vec2(s)) => u.uv_scale = s,

            (uniforms::PRIMARY_LIGHT_POSITION, V::Vec3(p)) => u.light_position = p.extend(1.0),
            (uniforms::PRIMARY_LIGHT_COLOR, V::Vec3(c)) => {
                u.light_color = c.extend(u.light_color.w)
            }
            (uniforms::PRIMARY_LIGHT_INTENSITY, V::Float(i)) => u.light_color.w = i,
            (uniforms::AMBIENT_LIGHT_COLOR, V::Vec3(c)) => {
                u.ambient_light = c.extend(u.ambient_light.w)
            }
            (uniforms::AMBIENT_LIGHT_INTENSITY, V::Float(i)) => u.ambient_light.w = i,

            (uniforms::MATERIAL_AMBIENT_COLOR, V::Vec3(c)) => {
                u.material_ambient = c.extend(u.material_ambient.w);
                u.use_material = 1;
            }
            (uniforms::MATERIAL_AMBIENT_STRENGTH, V::Float(s)) => {
                u.material_ambient.w = s;
                u.use_material = 1;
            }
            (uniforms::MATERIAL_DIFFUSE_COLOR, V::Vec3(c)) => {
                u.material_diffuse = c.extend(1.0);
                u.use_material = 1;
            }
            (uniforms::MATERIAL_SPECULAR_COLOR, V::Vec3(c)) => {
                u.material_specular = c.extend(u.material_specular.w);
                u.use_material = 1;
            }
            (uniforms::MATERIAL_SHININESS, V::Float(s)) => {
                u.material_specular.w = s;
                u.use_material = 1;
            }

            _ => self.ignore(name, value),
        }
    }
}
