//! Primitive meshes the scene is built from

use crate::backend::types::Vertex;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const SEGMENTS: u32 = 36;
const RINGS: u32 = 18;

/// Primitive mesh kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// 2x2 plane on XZ facing +Y
    Plane,
    /// Radius 1 base at y=0, apex at y=1
    Cone,
    /// Radius 1, from y=0 to y=1
    Cylinder,
    /// Radius 1, centered at the origin
    Sphere,
    /// Upper half of the unit sphere, closed at y=0
    HalfSphere,
    /// Radius 1 at y=0 narrowing to 0.5 at y=1
    TaperedCylinder,
    /// Unit cube centered at the origin
    Box,
    /// Ring of radius 1 in the XY plane
    Torus,
}

impl MeshKind {
    pub const ALL: [MeshKind; 8] = [
        MeshKind::Plane,
        MeshKind::Cone,
        MeshKind::Cylinder,
        MeshKind::Sphere,
        MeshKind::HalfSphere,
        MeshKind::TaperedCylinder,
        MeshKind::Box,
        MeshKind::Torus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MeshKind::Plane => "plane",
            MeshKind::Cone => "cone",
            MeshKind::Cylinder => "cylinder",
            MeshKind::Sphere => "sphere",
            MeshKind::HalfSphere => "half_sphere",
            MeshKind::TaperedCylinder => "tapered_cylinder",
            MeshKind::Box => "box",
            MeshKind::Torus => "torus",
        }
    }

    /// Generate the geometry for this kind
    pub fn build(&self) -> Mesh {
        match self {
            MeshKind::Plane => Mesh::plane(),
            MeshKind::Cone => Mesh::frustum("cone", 1.0, 0.0, SEGMENTS),
            MeshKind::Cylinder => Mesh::frustum("cylinder", 1.0, 1.0, SEGMENTS),
            MeshKind::Sphere => Mesh::sphere("sphere", SEGMENTS, RINGS, false),
            MeshKind::HalfSphere => Mesh::sphere("half_sphere", SEGMENTS, RINGS / 2, true),
            MeshKind::TaperedCylinder => Mesh::frustum("tapered_cylinder", 1.0, 0.5, SEGMENTS),
            MeshKind::Box => Mesh::cube(),
            MeshKind::Torus => Mesh::torus(1.0, 0.15, SEGMENTS, RINGS),
        }
    }
}

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        self.vertices.push(Vertex::new(position, normal, uv));
        self.vertices.len() as u32 - 1
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    /// Unit cube centered at the origin
    pub fn cube() -> Self {
        let mut mesh = Mesh::new("box");

        // (normal, u axis, v axis) per face
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
        ];

        for (normal, u, v) in faces {
            let center = normal * 0.5;
            let a = mesh.push(center - u * 0.5 - v * 0.5, normal, Vec2::new(0.0, 0.0));
            let b = mesh.push(center + u * 0.5 - v * 0.5, normal, Vec2::new(1.0, 0.0));
            let c = mesh.push(center + u * 0.5 + v * 0.5, normal, Vec2::new(1.0, 1.0));
            let d = mesh.push(center - u * 0.5 + v * 0.5, normal, Vec2::new(0.0, 1.0));
            mesh.quad(a, b, c, d);
        }

        mesh
    }

    /// 2x2 plane on the XZ axis
    pub fn plane() -> Self {
        let mut mesh = Mesh::new("plane");
        let a = mesh.push(Vec3::new(-1.0, 0.0, 1.0), Vec3::Y, Vec2::new(0.0, 0.0));
        let b = mesh.push(Vec3::new(1.0, 0.0, 1.0), Vec3::Y, Vec2::new(1.0, 0.0));
        let c = mesh.push(Vec3::new(1.0, 0.0, -1.0), Vec3::Y, Vec2::new(1.0, 1.0));
        let d = mesh.push(Vec3::new(-1.0, 0.0, -1.0), Vec3::Y, Vec2::new(0.0, 1.0));
        mesh.quad(a, b, c, d);
        mesh
    }

    /// UV sphere of radius 1, or its upper half closed by a disc at y=0
    pub fn sphere(name: &str, segments: u32, rings: u32, upper_half: bool) -> Self {
        let mut mesh = Mesh::new(name);

        let segment_angle = TAU / segments as f32;
        let ring_angle = if upper_half {
            PI / 2.0 / rings as f32
        } else {
            PI / rings as f32
        };

        for ring in 0..=rings {
            let phi = ring as f32 * ring_angle;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for segment in 0..=segments {
                let theta = segment as f32 * segment_angle;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                let uv = Vec2::new(
                    segment as f32 / segments as f32,
                    1.0 - ring as f32 / rings as f32,
                );
                mesh.push(normal, normal, uv);
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;
                mesh.indices.extend_from_slice(&[
                    current,
                    current + 1,
                    next,
                    current + 1,
                    next + 1,
                    next,
                ]);
            }
        }

        if upper_half {
            mesh.disc(0.0, 1.0, -Vec3::Y, segments);
        }

        mesh
    }

    /// Truncated cone from y=0 to y=1; a zero top radius gives a cone
    pub fn frustum(name: &str, bottom_radius: f32, top_radius: f32, segments: u32) -> Self {
        let mut mesh = Mesh::new(name);
        let angle_step = TAU / segments as f32;
        let slope = bottom_radius - top_radius;

        for i in 0..=segments {
            let angle = i as f32 * angle_step;
            let (sin, cos) = angle.sin_cos();
            let normal = Vec3::new(cos, slope, sin).normalize();
            let u = i as f32 / segments as f32;

            mesh.push(
                Vec3::new(cos * bottom_radius, 0.0, sin * bottom_radius),
                normal,
                Vec2::new(u, 0.0),
            );
            mesh.push(
                Vec3::new(cos * top_radius, 1.0, sin * top_radius),
                normal,
                Vec2::new(u, 1.0),
            );
        }

        for i in 0..segments {
            let base = i * 2;
            mesh.indices.extend_from_slice(&[
                base,
                base + 1,
                base + 2,
                base + 1,
                base + 3,
                base + 2,
            ]);
        }

        mesh.disc(0.0, bottom_radius, -Vec3::Y, segments);
        if top_radius > 0.0 {
            mesh.disc(1.0, top_radius, Vec3::Y, segments);
        }

        mesh
    }

    /// Torus in the XY plane around the Z axis
    pub fn torus(major_radius: f32, minor_radius: f32, segments: u32, sides: u32) -> Self {
        let mut mesh = Mesh::new("torus");

        for i in 0..=segments {
            let theta = i as f32 * TAU / segments as f32;
            let ring_center = Vec3::new(theta.cos(), theta.sin(), 0.0) * major_radius;

            for j in 0..=sides {
                let phi = j as f32 * TAU / sides as f32;
                let normal = Vec3::new(theta.cos() * phi.cos(), theta.sin() * phi.cos(), phi.sin());
                let uv = Vec2::new(i as f32 / segments as f32, j as f32 / sides as f32);
                mesh.push(ring_center + normal * minor_radius, normal, uv);
            }
        }

        for i in 0..segments {
            for j in 0..sides {
                let current = i * (sides + 1) + j;
                let next = current + sides + 1;
                mesh.quad(current, next, next + 1, current + 1);
            }
        }

        mesh
    }

    /// Flat cap at height `y`
    fn disc(&mut self, y: f32, radius: f32, normal: Vec3, segments: u32) {
        let center = self.push(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        let angle_step = TAU / segments as f32;

        for i in 0..=segments {
            let (sin, cos) = (i as f32 * angle_step).sin_cos();
            let index = self.push(
                Vec3::new(cos * radius, y, sin * radius),
                normal,
                Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
            );
            if i > 0 {
                if normal.y > 0.0 {
                    self.indices.extend_from_slice(&[center, index, index - 1]);
                } else {
                    self.indices.extend_from_slice(&[center, index - 1, index]);
                }
            }
        }
    }
}
