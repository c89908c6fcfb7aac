//! Frame-dump panel: capture a fixed number of frames of a staged target in
//! play mode, then merge them into a GIF or MOV.
//!
//! ```text
//! Idle ──start──► Recording ──counter == length──► Finalizing ──► Idle
//!                   │ one frame per tick              │ waits for every
//!                   ▼                                 ▼ frame write
//!             <seq>/<name>0001.png ...          ffmpeg launched
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use propshot_common::error::{PropshotError, PropshotResult};
use propshot_project_model::request::{ExportRequest, VideoFormat};
use propshot_project_model::settings::AssetRef;
use propshot_render_engine::{
    FileWriter, FrameEncoder, OffscreenRenderer, TranscodeHandle, TranscodeJob, Transcoder,
    WriteHandle, WriteOutcome, WritePolicy, WriteScope,
};
use propshot_scene::{SceneHost, Transform};

use crate::stage::ObjectStage;

pub const DEFAULT_FRAME_RATE: u32 = 30;
pub const DEFAULT_LENGTH: u32 = 30;
pub const DEFAULT_FRAME_SIZE: u32 = 256;

/// Panel settings. These live only as long as the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FramedumpSettings {
    /// Directory the finished video is written into.
    pub export_path: PathBuf,
    /// Parent of the per-target frame sequence directories.
    pub sequence_root: PathBuf,
    pub frame_rate: u32,
    /// Frames to capture per run.
    pub length: u32,
    pub width: u32,
    pub height: u32,
    pub video_format: VideoFormat,
    /// Where the target instance is placed.
    pub placement: Transform,
}

impl Default for FramedumpSettings {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from("."),
            sequence_root: std::env::temp_dir().join("propshot-sequences"),
            frame_rate: DEFAULT_FRAME_RATE,
            length: DEFAULT_LENGTH,
            width: DEFAULT_FRAME_SIZE,
            height: DEFAULT_FRAME_SIZE,
            video_format: VideoFormat::Gif,
            placement: Transform::IDENTITY,
        }
    }
}

/// State of the frame-dump panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramedumpState {
    /// Waiting for a start.
    Idle,
    /// Capturing one frame per tick.
    Recording,
    /// All frames captured; waiting for their writes to land.
    Finalizing,
}

/// Bookkeeping for one capture run.
#[derive(Debug)]
pub struct CaptureJob {
    /// Frames captured so far.
    pub counter: u32,
    /// Frames to capture.
    pub length: u32,
    pub output_dir: PathBuf,
    pub asset_name: String,
    /// Wall-clock start time (RFC 3339).
    pub started_at: String,
    started: Instant,
    pending: Vec<WriteHandle>,
    failures: Vec<PropshotError>,
}

impl CaptureJob {
    fn new(output_dir: PathBuf, asset_name: String, length: u32) -> Self {
        Self {
            counter: 0,
            length,
            output_dir,
            asset_name,
            started_at: chrono::Utc::now().to_rfc3339(),
            started: Instant::now(),
            pending: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Frame writes that have not reported back yet.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Collect finished writes. Dropped writes count as failures.
    fn poll_writes(&mut self) {
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut handle in self.pending.drain(..) {
            match handle.try_take() {
                None => still_pending.push(handle),
                Some(Ok(WriteOutcome::Written { .. })) => {}
                Some(Ok(WriteOutcome::Dropped { path })) => {
                    self.failures.push(PropshotError::capture(format!(
                        "frame write to {} was dropped",
                        path.display()
                    )));
                }
                Some(Err(e)) => self.failures.push(e),
            }
        }
        self.pending = still_pending;
    }
}

/// What one tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing to do.
    Idle,
    /// Captured frame `frame` (1-based).
    Captured { frame: u32 },
    /// Waiting for `pending` frame writes.
    Finalizing { pending: usize },
    /// The transcoder was started.
    Launched(TranscodeHandle),
}

/// Interactive frame-sequence exporter.
#[derive(Debug)]
pub struct FramedumpPanel {
    settings: FramedumpSettings,
    target: Option<AssetRef>,
    stage: ObjectStage,
    state: FramedumpState,
    job: Option<CaptureJob>,
    /// Every sequence directory created while the panel was open.
    dirs: Vec<PathBuf>,
    renderer: OffscreenRenderer,
    encoder: FrameEncoder,
    writer: FileWriter,
    scope: WriteScope,
    transcoder: Transcoder,
    enabled: bool,
    torn_down: bool,
}

impl FramedumpPanel {
    /// Open the panel and apply the capture rate to the host.
    ///
    /// Without a usable transcoder the panel opens disabled and `start`
    /// does nothing.
    pub fn open<H>(
        host: &mut H,
        settings: FramedumpSettings,
        writer: FileWriter,
        encoder: FrameEncoder,
        transcoder: Transcoder,
    ) -> Self
    where
        H: SceneHost + ?Sized,
    {
        let mut settings = settings;
        settings.frame_rate = settings.frame_rate.max(1);
        settings.length = settings.length.max(1);
        settings.width = settings.width.max(1);
        settings.height = settings.height.max(1);
        host.set_capture_frame_rate(settings.frame_rate);

        let enabled = transcoder.is_available();
        if enabled {
            tracing::info!(transcoder = %transcoder.binary().display(), "Opened frame-dump panel");
        } else {
            tracing::warn!(
                transcoder = %transcoder.binary().display(),
                "Transcoder not found; frame dumps are disabled"
            );
        }

        Self {
            settings,
            target: None,
            stage: ObjectStage::new(),
            state: FramedumpState::Idle,
            job: None,
            dirs: Vec::new(),
            renderer: OffscreenRenderer::new(),
            encoder,
            writer,
            scope: WriteScope::new(),
            transcoder,
            enabled,
            torn_down: false,
        }
    }

    pub fn state(&self) -> FramedumpState {
        self.state
    }

    pub fn settings(&self) -> &FramedumpSettings {
        &self.settings
    }

    pub fn target(&self) -> Option<&AssetRef> {
        self.target.as_ref()
    }

    pub fn stage(&self) -> &ObjectStage {
        &self.stage
    }

    pub fn job(&self) -> Option<&CaptureJob> {
        self.job.as_ref()
    }

    /// Sequence directories created so far.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.torn_down
    }

    pub fn renderer(&self) -> &OffscreenRenderer {
        &self.renderer
    }

    /// Frame sequence directory for the current target.
    pub fn sequence_dir(&self) -> Option<PathBuf> {
        self.target
            .as_ref()
            .map(|asset| self.settings.sequence_root.join(asset.name()))
    }

    /// Video the current target would be exported to.
    pub fn video_path(&self) -> Option<PathBuf> {
        self.target.as_ref().map(|asset| {
            ExportRequest::video(
                &self.settings.export_path,
                &asset.name(),
                self.settings.video_format,
                self.settings.width,
                self.settings.height,
            )
            .output_path
        })
    }

    /// Select the capture target and stage a fresh instance of it.
    ///
    /// When the asset fails to load the previous target stays selected and
    /// staged. Does nothing after teardown.
    pub fn set_target<H>(&mut self, host: &mut H, asset: Option<AssetRef>) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.torn_down {
            tracing::debug!("Target change ignored: panel is closed");
            return Ok(());
        }
        if self.state != FramedumpState::Idle {
            tracing::debug!("Target change ignored while recording");
            return Ok(());
        }
        match &asset {
            Some(asset) => {
                self.stage.stage(host, asset, self.settings.placement)?;
                tracing::info!(asset = %asset, "Frame-dump target selected");
            }
            None => self.stage.clear(host),
        }
        self.target = asset;
        Ok(())
    }

    pub fn set_export_path(&mut self, path: impl Into<PathBuf>) {
        self.settings.export_path = path.into();
    }

    pub fn set_image_size<H>(&mut self, host: &mut H, width: u32, height: u32) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        self.settings.width = width.max(1);
        self.settings.height = height.max(1);
        if self.torn_down {
            return Ok(());
        }
        self.render(host).map(|_| ())
    }

    /// Change the capture rate; the host picks it up immediately.
    pub fn set_frame_rate<H>(&mut self, host: &mut H, fps: u32)
    where
        H: SceneHost + ?Sized,
    {
        self.settings.frame_rate = fps.max(1);
        host.set_capture_frame_rate(self.settings.frame_rate);
    }

    pub fn set_length(&mut self, length: u32) {
        self.settings.length = length.max(1);
    }

    pub fn set_video_format(&mut self, format: VideoFormat) {
        self.settings.video_format = format;
    }

    /// Begin a capture run.
    ///
    /// Returns `Ok(false)` without side effects when the panel is disabled,
    /// already running, or has no target.
    pub fn start<H>(&mut self, host: &mut H) -> PropshotResult<bool>
    where
        H: SceneHost + ?Sized,
    {
        if !self.is_enabled() {
            tracing::debug!("Start ignored: frame-dump panel is disabled");
            return Ok(false);
        }
        if self.state != FramedumpState::Idle {
            tracing::debug!(state = ?self.state, "Start ignored: capture in progress");
            return Ok(false);
        }
        let (Some(asset), Some(dir)) = (self.target.clone(), self.sequence_dir()) else {
            tracing::debug!("Start ignored: no target selected");
            return Ok(false);
        };

        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir.clone());
        }

        host.set_capture_frame_rate(self.settings.frame_rate);
        host.set_playing(true);

        tracing::info!(
            asset = %asset,
            dir = %dir.display(),
            frames = self.settings.length,
            fps = self.settings.frame_rate,
            "Started frame dump"
        );
        self.job = Some(CaptureJob::new(dir, asset.name(), self.settings.length));
        self.state = FramedumpState::Recording;
        Ok(true)
    }

    /// Drive the panel by one step.
    pub fn tick<H>(&mut self, host: &mut H) -> PropshotResult<TickOutcome>
    where
        H: SceneHost + ?Sized,
    {
        match self.state {
            FramedumpState::Idle => Ok(TickOutcome::Idle),
            FramedumpState::Recording => self.record(host),
            FramedumpState::Finalizing => self.finalize(),
        }
    }

    /// Destroy the staged target, drop writes still in flight, and delete
    /// every sequence directory created by this panel. Safe to call twice.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: SceneHost + ?Sized,
    {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if self.state == FramedumpState::Recording {
            host.set_playing(false);
        }
        self.state = FramedumpState::Idle;
        self.job = None;
        self.stage.clear(host);
        self.renderer.release();

        let dirs = std::mem::take(&mut self.dirs);
        self.scope.revoke_with(|| {
            for dir in dirs.iter().filter(|d| d.exists()) {
                match std::fs::remove_dir_all(dir) {
                    Ok(()) => tracing::debug!(dir = %dir.display(), "Removed frame sequence"),
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "Failed to remove frame sequence")
                    }
                }
            }
        });
        tracing::info!("Closed frame-dump panel");
    }

    fn record<H>(&mut self, host: &mut H) -> PropshotResult<TickOutcome>
    where
        H: SceneHost + ?Sized,
    {
        let Some(job) = self.job.as_ref() else {
            self.state = FramedumpState::Idle;
            return Ok(TickOutcome::Idle);
        };

        if job.counter >= job.length {
            host.set_playing(false);
            self.state = FramedumpState::Finalizing;
            tracing::debug!(frames = job.counter, "Capture complete, waiting for writes");
            return self.finalize();
        }
        let frame = job.counter + 1;
        let request = ExportRequest::frame(
            &job.output_dir,
            &job.asset_name,
            frame,
            self.settings.width,
            self.settings.height,
        );

        self.render(host)?;
        let target = self
            .renderer
            .target()
            .ok_or_else(|| PropshotError::render("no render target to read back"))?;
        let bytes = self
            .encoder
            .encode(target, request.image_format().unwrap_or_default())?;

        let Some(job) = self.job.as_mut() else {
            return Ok(TickOutcome::Idle);
        };
        let handle = self.writer.write(
            &self.scope,
            request.output_path,
            bytes,
            WritePolicy::ReplaceExisting,
        );
        job.pending.push(handle);
        job.counter = frame;
        job.poll_writes();

        host.advance_frame();
        Ok(TickOutcome::Captured { frame })
    }

    fn finalize(&mut self) -> PropshotResult<TickOutcome> {
        let Some(job) = self.job.as_mut() else {
            self.state = FramedumpState::Idle;
            return Ok(TickOutcome::Idle);
        };

        job.poll_writes();
        if !job.pending.is_empty() {
            return Ok(TickOutcome::Finalizing {
                pending: job.pending.len(),
            });
        }

        let Some(job) = self.job.take() else {
            return Ok(TickOutcome::Idle);
        };
        self.state = FramedumpState::Idle;

        if let Some(first) = job.failures.into_iter().next() {
            return Err(PropshotError::capture(format!(
                "frame sequence in {} is incomplete, not transcoding: {first}",
                job.output_dir.display()
            )));
        }

        tracing::info!(
            frames = job.counter,
            started_at = %job.started_at,
            elapsed_secs = job.started.elapsed().as_secs_f64(),
            "Frame sequence written"
        );

        let request = ExportRequest::video(
            &self.settings.export_path,
            &job.asset_name,
            self.settings.video_format,
            self.settings.width,
            self.settings.height,
        );
        prepare_output(&self.settings.export_path, &request.output_path)?;

        let handle = self.transcoder.launch(&TranscodeJob {
            sequence_dir: job.output_dir,
            asset_name: job.asset_name,
            fps: self.settings.frame_rate,
            format: request.video_format().unwrap_or(self.settings.video_format),
            output_path: request.output_path,
        })?;
        Ok(TickOutcome::Launched(handle))
    }

    fn render<H>(&mut self, host: &mut H) -> PropshotResult<bool>
    where
        H: SceneHost + ?Sized,
    {
        let camera = host.main_camera();
        self.renderer
            .render_now(host, camera, self.settings.width, self.settings.height)
    }
}

/// Create the export directory and remove a previous video.
fn prepare_output(export_path: &Path, output_path: &Path) -> PropshotResult<()> {
    std::fs::create_dir_all(export_path)?;
    if output_path.exists() {
        std::fs::remove_file(output_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FramedumpSettings::default();
        assert_eq!(settings.frame_rate, 30);
        assert_eq!(settings.length, 30);
        assert_eq!((settings.width, settings.height), (256, 256));
        assert_eq!(settings.video_format, VideoFormat::Gif);
    }

    #[test]
    fn test_prepare_output_replaces_video() {
        let dir = std::env::temp_dir().join("propshot_test_prepare_output");
        let _ = std::fs::remove_dir_all(&dir);
        let video = dir.join("Turtle_gif.gif");

        prepare_output(&dir, &video).unwrap();
        assert!(dir.is_dir());

        std::fs::write(&video, b"old").unwrap();
        prepare_output(&dir, &video).unwrap();
        assert!(!video.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
