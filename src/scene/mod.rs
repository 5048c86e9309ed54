//! Scene management
//!
//! The orbit camera, the two scene lights and the composer that issues the
//! spacecraft's draw instructions.

mod camera;
mod camera_controller;
mod composer;
mod light;
mod transform;

pub use camera::*;
pub use camera_controller::*;
pub use composer::*;
pub use light::*;
pub use transform::*;
