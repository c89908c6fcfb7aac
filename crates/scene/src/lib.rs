//! Propshot Scene
//!
//! The scene side of the capture pipeline:
//! - [`SceneHost`]: the engine operations the panels rely on
//! - Value types for transforms, bounds, camera rigs and lighting
//! - [`RenderTarget`]: an RGBA8 offscreen buffer owned by one thread
//! - [`software::SoftwareHost`]: a reference host that loads OBJ meshes and
//!   rasterizes them on the CPU

pub mod host;
pub mod software;
pub mod target;
pub mod types;

pub use host::*;
pub use target::*;
pub use types::*;
