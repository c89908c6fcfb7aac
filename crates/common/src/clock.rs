//! Fixed-rate capture clock.
//!
//! While a frame sequence is being captured, simulated time advances by
//! exactly `1 / fps` per captured frame regardless of how long rendering
//! and encoding take in wall-clock time. This keeps playback of the
//! resulting sequence decoupled from real time.

use std::time::Instant;

/// A capture clock that counts frames at a fixed rate.
#[derive(Debug, Clone)]
pub struct CaptureClock {
    /// Frames per simulated second.
    fps: u32,

    /// Frames advanced since the epoch.
    frames: u64,

    /// The instant capture started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl CaptureClock {
    /// Create a new capture clock anchored to now.
    ///
    /// A rate of zero is treated as one frame per second.
    pub fn start(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            frames: 0,
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Advance simulated time by one frame. Returns the step in seconds.
    pub fn advance(&mut self) -> f64 {
        self.frames += 1;
        self.frame_secs()
    }

    /// Change the capture rate. Elapsed simulated time is preserved.
    pub fn set_fps(&mut self, fps: u32) {
        let fps = fps.max(1);
        if fps == self.fps {
            return;
        }
        let elapsed = self.simulated_secs();
        self.fps = fps;
        self.frames = (elapsed * fps as f64).round() as u64;
    }

    /// Frames per simulated second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Duration of one frame in simulated seconds.
    pub fn frame_secs(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Frames advanced since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated seconds since start.
    pub fn simulated_secs(&self) -> f64 {
        self.frames as f64 / self.fps as f64
    }

    /// Real seconds elapsed since start.
    pub fn wall_elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at capture start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}
