//! Propshot Render Engine
//!
//! Everything between a staged scene and files on disk.
//!
//! # Pipeline Architecture
//!
//! ```text
//! SceneHost ──► OffscreenRenderer (RenderTarget, owning thread)
//!                      │
//!                      ▼
//!               FrameEncoder (PNG / JPG / RAW bytes)
//!                      │
//!                      ▼
//!               FileWriter ──► blocking pool ──► WriteHandle
//!                      │
//!        frame sequence complete
//!                      ▼
//!               Transcoder (ffmpeg child) ──► TranscodeHandle
//! ```

pub mod encode;
pub mod offscreen;
pub mod transcode;
pub mod writer;

pub use encode::*;
pub use offscreen::*;
pub use transcode::*;
pub use writer::*;
