//! Resource management
//!
//! Primitive meshes, textures and materials.

mod material;
mod mesh;
mod texture;

pub use material::*;
pub use mesh::*;
pub use texture::*;
