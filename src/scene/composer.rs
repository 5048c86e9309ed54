//! The spacecraft scene as an ordered list of draw instructions

use glam::{Vec2, Vec3, Vec4};

use super::{SceneLights, Transform};
use crate::backend::traits::{GraphicsBackend, ShaderUniforms};
use crate::backend::types::uniforms;
use crate::resources::{MaterialRegistry, MeshKind, TextureRegistry};

/// How a primitive is colored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Sample the texture registered under this tag
    Texture(&'static str),
    /// Flat RGBA color
    Color(Vec4),
}

/// One primitive of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub label: &'static str,
    pub transform: Transform,
    pub shading: Shading,
    pub mesh: MeshKind,
    pub material: Option<&'static str>,
    pub uv_scale: Option<Vec2>,
}

impl DrawInstruction {
    pub fn new(
        label: &'static str,
        scale: Vec3,
        rotation_degrees: Vec3,
        translation: Vec3,
        shading: Shading,
        mesh: MeshKind,
    ) -> Self {
        Self {
            label,
            transform: Transform::new(scale, rotation_degrees, translation),
            shading,
            mesh,
            material: None,
            uv_scale: None,
        }
    }

    pub fn with_material(mut self, tag: &'static str) -> Self {
        self.material = Some(tag);
        self
    }

    pub fn with_uv_scale(mut self, scale: Vec2) -> Self {
        self.uv_scale = Some(scale);
        self
    }

    /// Push the per-draw uniforms.
    ///
    /// A texture tag that isn't registered pushes nothing, so the previous
    /// draw's texture or color stays bound.
    fn apply(
        &self,
        shader: &mut dyn ShaderUniforms,
        textures: &mut TextureRegistry,
        materials: &MaterialRegistry,
    ) {
        shader.set_mat4(uniforms::MODEL, self.transform.matrix());

        match self.shading {
            Shading::Texture(tag) => {
                if let Some(slot) = textures.slot_of(tag) {
                    shader.set_bool(uniforms::USE_TEXTURE, true);
                    shader.set_sampler(uniforms::OBJECT_TEXTURE, slot as u32);
                }
            }
            Shading::Color(color) => {
                shader.set_bool(uniforms::USE_TEXTURE, false);
                shader.set_vec4(uniforms::OBJECT_COLOR, color);
            }
        }

        if let Some(scale) = self.uv_scale {
            shader.set_vec2(uniforms::UV_SCALE, scale);
        }

        if let Some(material) = self.material.and_then(|tag| materials.find(tag)) {
            material.apply(shader);
        }
    }
}

fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Issues the draw instructions in authored order
#[derive(Debug, Clone)]
pub struct SceneComposer {
    instructions: Vec<DrawInstruction>,
    lights: SceneLights,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::spacecraft()
    }
}

impl SceneComposer {
    pub fn new(instructions: Vec<DrawInstruction>, lights: SceneLights) -> Self {
        Self {
            instructions,
            lights,
        }
    }

    /// A starship on a textured ground plane
    pub fn spacecraft() -> Self {
        use MeshKind::*;
        use Shading::{Color, Texture};

        let hull = Texture("hull");
        let red = Color(Vec4::new(1.0, 0.0, 0.0, 1.0));

        let instructions = vec![
            DrawInstruction::new(
                "ground",
                v(20.0, 1.0, 10.0),
                Vec3::ZERO,
                Vec3::ZERO,
                Texture("planet"),
                Plane,
            ),
            DrawInstruction::new(
                "upper saucer",
                v(4.0, 0.2, 4.0),
                Vec3::ZERO,
                v(-3.0, 4.0, 0.0),
                hull,
                Cylinder,
            ),
            DrawInstruction::new(
                "lower saucer",
                v(4.0, 0.2, 4.0),
                v(180.0, 0.0, 0.0),
                v(-3.0, 4.0, 0.0),
                hull,
                TaperedCylinder,
            ),
            DrawInstruction::new(
                "bridge",
                v(0.5, 1.0, 1.0),
                v(90.0, 90.0, 0.0),
                v(-3.0, 4.1, 0.0),
                Texture("dome"),
                Sphere,
            ),
            DrawInstruction::new(
                "neck",
                v(1.25, 1.5, 0.5),
                v(0.0, 0.0, 15.0),
                v(0.0, 3.25, 0.0),
                hull,
                Box,
            ),
            DrawInstruction::new(
                "deflector housing",
                v(0.75, 0.5, 0.75),
                v(90.0, 0.0, 90.0),
                v(-0.59, 2.0, 0.0),
                hull,
                TaperedCylinder,
            ),
            DrawInstruction::new(
                "engineering hull",
                v(0.74, 4.5, 0.74),
                v(90.0, 0.0, 90.0),
                v(3.9, 2.0, 0.0),
                hull,
                Cylinder,
            ),
            DrawInstruction::new(
                "shuttlebay",
                v(0.74, 0.74, 0.74),
                Vec3::ZERO,
                v(3.9, 2.0, 0.0),
                Texture("shuttlebay"),
                HalfSphere,
            ),
            // "hall" is never registered, so the floor keeps the shuttlebay binding
            DrawInstruction::new(
                "shuttlebay floor",
                v(0.01, 0.74, 0.74),
                v(0.0, 0.0, 90.0),
                v(3.9, 2.0, 0.0),
                Texture("hall"),
                Sphere,
            ),
            DrawInstruction::new(
                "deflector dish",
                v(0.35, 0.35, 0.35),
                v(0.0, 0.0, -90.0),
                v(-1.1, 2.0, 0.0),
                Color(Vec4::new(0.35, 0.65, 0.80, 1.0)),
                Cone,
            ),
            DrawInstruction::new(
                "port pylon",
                v(0.75, 2.5, 0.10),
                v(40.0, 0.0, -20.0),
                v(3.5, 3.4, 1.0),
                hull,
                Box,
            ),
            DrawInstruction::new(
                "port nacelle",
                v(0.25, 4.5, 0.25),
                v(90.0, 0.0, 90.0),
                v(6.5, 4.25, 1.75),
                hull,
                Cylinder,
            ),
            DrawInstruction::new(
                "port ramscoop",
                v(0.25, 0.25, 0.25),
                Vec3::ZERO,
                v(2.0, 4.25, 1.75),
                red,
                Sphere,
            ),
            DrawInstruction::new(
                "starboard pylon",
                v(0.75, 2.5, 0.10),
                v(-40.0, 0.0, -20.0),
                v(3.5, 3.4, -1.0),
                hull,
                Box,
            ),
            DrawInstruction::new(
                "starboard nacelle",
                v(0.25, 4.5, 0.25),
                v(90.0, 0.0, 90.0),
                v(6.5, 4.25, -1.75),
                hull,
                Cylinder,
            ),
            DrawInstruction::new(
                "starboard ramscoop",
                v(0.25, 0.25, 0.25),
                Vec3::ZERO,
                v(2.0, 4.25, -1.75),
                red,
                Sphere,
            ),
        ];

        Self::new(instructions, SceneLights::default())
    }

    pub fn instructions(&self) -> &[DrawInstruction] {
        &self.instructions
    }

    pub fn lights(&self) -> &SceneLights {
        &self.lights
    }

    /// Mesh kinds in order of first use
    pub fn required_meshes(&self) -> Vec<MeshKind> {
        let mut kinds = Vec::new();
        for instruction in &self.instructions {
            if !kinds.contains(&instruction.mesh) {
                kinds.push(instruction.mesh);
            }
        }
        kinds
    }

    /// Load every mesh kind the scene draws
    pub fn prepare<B>(&self, backend: &mut B)
    where
        B: GraphicsBackend + ?Sized,
    {
        for kind in self.required_meshes() {
            backend.load_mesh(kind);
        }
    }

    /// Push the lights, then set up and draw every instruction in order.
    ///
    /// Without a shading stage no uniforms are pushed, but draws still happen.
    pub fn render<B>(
        &self,
        backend: &mut B,
        textures: &mut TextureRegistry,
        materials: &MaterialRegistry,
    ) where
        B: GraphicsBackend + ?Sized,
    {
        if let Some(shader) = backend.shader() {
            self.lights.apply(shader);
        }

        for instruction in &self.instructions {
            if let Some(shader) = backend.shader() {
                instruction.apply(shader, textures, materials);
            }
            log::trace!("draw {} ({:?})", instruction.label, instruction.mesh);
            backend.draw_mesh(instruction.mesh);
        }
    }
}
