//! Propshot Capture Engine
//!
//! The two capture panels and the pieces they share.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │          IconPanel           │   │        FramedumpPanel        │
//! │  registry ─► ObjectStage × N │   │  target ─► ObjectStage       │
//! │  SettingsStore (persisted)   │   │  Idle/Recording/Finalizing   │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                │  IconIntent / FramedumpIntent     │
//!                ▼                                   ▼
//!     OffscreenRenderer ─► FrameEncoder ─► FileWriter ─► Transcoder
//! ```

pub mod framedump;
pub mod icon;
pub mod intent;
pub mod stage;

pub use framedump::*;
pub use icon::*;
pub use intent::*;
pub use stage::*;
