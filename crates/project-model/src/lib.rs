//! Propshot Project Model
//!
//! Defines the data contracts shared by the capture panels:
//! - **Settings:** the persisted icon settings object and per-asset framing records
//! - **Store:** loading and committing settings to disk
//! - **Requests:** export requests, encoding kinds, and output file naming

pub mod request;
pub mod settings;
pub mod store;

pub use request::*;
pub use settings::*;
pub use store::*;
