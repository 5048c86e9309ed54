//! Backend abstraction layer
//!
//! Provides the traits the scene renders through, a wgpu implementation and a
//! headless implementation that records every call.

pub mod headless;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use headless::{BackendCall, HeadlessBackend};
pub use traits::*;
pub use types::*;
