//! Object placement

use glam::{Mat4, Vec3};

/// Scale, Euler rotation in degrees and translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    /// Rotation about X, Y and Z in degrees
    pub rotation_degrees: Vec3,
    pub translation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn new(scale: Vec3, rotation_degrees: Vec3, translation: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            translation,
        }
    }

    /// Model matrix: translation * rot X * rot Y * rot Z * scale
    pub fn matrix(&self) -> Mat4 {
        let rotation = self.rotation_degrees;
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_x(rotation.x.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_z(rotation.z.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_by_default() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn scale_applies_before_rotation_and_translation() {
        let t = Transform::new(
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 90.0),
            Vec3::new(0.0, 0.0, 5.0),
        );
        // (1,0,0) -> scaled (2,0,0) -> rotated about Z (0,2,0) -> moved
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 2.0, 5.0), 1e-5));
    }

    #[test]
    fn z_rotation_applies_before_x() {
        let t = Transform::new(Vec3::ONE, Vec3::new(90.0, 0.0, 90.0), Vec3::ZERO);
        // Z turns X into Y, then X turns Y into Z
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Z, 1e-5));
    }
}
