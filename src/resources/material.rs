//! Phong material definitions

use crate::backend::traits::ShaderUniforms;
use crate::backend::types::uniforms;
use glam::Vec3;

/// Phong material properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub tag: String,
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

impl Material {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, color: Vec3, strength: f32) -> Self {
        self.ambient_color = color;
        self.ambient_strength = strength;
        self
    }

    pub fn with_diffuse(mut self, color: Vec3) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_specular(mut self, color: Vec3, shininess: f32) -> Self {
        self.specular_color = color;
        self.shininess = shininess;
        self
    }

    /// Push the `material.*` uniforms
    pub fn apply(&self, shader: &mut dyn ShaderUniforms) {
        shader.set_vec3(uniforms::MATERIAL_AMBIENT_COLOR, self.ambient_color);
        shader.set_float(uniforms::MATERIAL_AMBIENT_STRENGTH, self.ambient_strength);
        shader.set_vec3(uniforms::MATERIAL_DIFFUSE_COLOR, self.diffuse_color);
        shader.set_vec3(uniforms::MATERIAL_SPECULAR_COLOR, self.specular_color);
        shader.set_float(uniforms::MATERIAL_SHININESS, self.shininess);
    }
}

/// Ordered list of materials, first match wins
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, material: Material) {
        self.materials.push(material);
    }

    /// Look up a material by tag.
    ///
    /// Returns `None` only when the registry is empty. A non-empty registry
    /// without a matching tag yields `Some(Material::default())`, so `Some`
    /// does not mean the tag matched.
    pub fn find(&self, tag: &str) -> Option<Material> {
        if self.materials.is_empty() {
            return None;
        }
        Some(
            self.materials
                .iter()
                .find(|material| material.tag == tag)
                .cloned()
                .unwrap_or_default(),
        )
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metal(tag: &str, shininess: f32) -> Material {
        Material::new(tag)
            .with_ambient(Vec3::splat(0.2), 0.3)
            .with_diffuse(Vec3::splat(0.6))
            .with_specular(Vec3::ONE, shininess)
    }

    #[test]
    fn empty_registry_finds_nothing() {
        let registry = MaterialRegistry::new();
        assert_eq!(registry.find("metal"), None);
    }

    #[test]
    fn first_match_wins() {
        let mut registry = MaterialRegistry::new();
        registry.add(metal("metal", 32.0));
        registry.add(metal("metal", 64.0));

        let found = registry.find("metal").unwrap();
        assert_eq!(found.shininess, 32.0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unmatched_tag_in_non_empty_registry_yields_default() {
        let mut registry = MaterialRegistry::new();
        registry.add(metal("metal", 32.0));

        let found = registry.find("glass").unwrap();
        assert_eq!(found, Material::default());
    }
}
