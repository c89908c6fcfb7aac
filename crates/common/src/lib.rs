//! Propshot Common Utilities
//!
//! Shared infrastructure for all Propshot crates:
//! - Error types and result aliases
//! - Fixed-rate capture clock
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
