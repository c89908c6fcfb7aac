//! Intent dispatch for the capture panels.
//!
//! A front end (the CLI, a GUI, a test) turns user input into a list of
//! intents per frame and hands them to the panel's `dispatch`.

use std::path::PathBuf;

use propshot_common::error::PropshotResult;
use propshot_project_model::request::{ImageFormat, VideoFormat};
use propshot_project_model::settings::{AssetRef, LightingMode};
use propshot_render_engine::WriteHandle;
use propshot_scene::SceneHost;

use crate::framedump::FramedumpPanel;
use crate::icon::IconPanel;

/// User requests to the icon panel.
#[derive(Debug, Clone, PartialEq)]
pub enum IconIntent {
    Register(AssetRef),
    Replace { index: usize, asset: AssetRef },
    Remove(usize),
    ToggleAdvanced(usize),
    SetFraming {
        index: usize,
        camera_size: f32,
        camera_tilt: f32,
        camera_rotate: f32,
    },
    /// Framing offset of the focused entry.
    SetOffset { x: f32, y: f32 },
    Refresh,
    SetExportPath(PathBuf),
    SetImageSize { width: u32, height: u32 },
    SetLightRotation(f32),
    SetLightingMode(LightingMode),
    SetImageFormat(ImageFormat),
    ExportCurrent,
    ExportAll,
    Close,
}

/// User requests to the frame-dump panel.
#[derive(Debug, Clone, PartialEq)]
pub enum FramedumpIntent {
    SetTarget(Option<AssetRef>),
    SetExportPath(PathBuf),
    SetImageSize { width: u32, height: u32 },
    SetFrameRate(u32),
    SetLength(u32),
    SetVideoFormat(VideoFormat),
    Start,
    Close,
}

impl IconPanel {
    /// Apply `intents` in order. Writes started by export intents are
    /// returned in the order they were issued.
    pub fn dispatch<H, I>(&mut self, host: &mut H, intents: I) -> PropshotResult<Vec<WriteHandle>>
    where
        H: SceneHost + ?Sized,
        I: IntoIterator<Item = IconIntent>,
    {
        let mut writes = Vec::new();
        for intent in intents {
            if self.is_closed() {
                tracing::debug!(?intent, "Ignoring intent for closed icon panel");
                continue;
            }
            match intent {
                IconIntent::Register(asset) => {
                    self.register(host, &asset)?;
                }
                IconIntent::Replace { index, asset } => self.replace(host, index, &asset)?,
                IconIntent::Remove(index) => self.remove(host, index)?,
                IconIntent::ToggleAdvanced(index) => self.toggle_advanced(host, index)?,
                IconIntent::SetFraming {
                    index,
                    camera_size,
                    camera_tilt,
                    camera_rotate,
                } => self.set_framing(host, index, camera_size, camera_tilt, camera_rotate)?,
                IconIntent::SetOffset { x, y } => self.set_offset(host, x, y)?,
                IconIntent::Refresh => self.refresh(host)?,
                IconIntent::SetExportPath(path) => self.set_export_path(path),
                IconIntent::SetImageSize { width, height } => {
                    self.set_image_size(host, width, height)?
                }
                IconIntent::SetLightRotation(degrees) => self.set_light_rotation(host, degrees)?,
                IconIntent::SetLightingMode(mode) => self.set_lighting_mode(host, mode)?,
                IconIntent::SetImageFormat(format) => self.set_image_format(host, format)?,
                IconIntent::ExportCurrent => writes.extend(self.export_current(host)?),
                IconIntent::ExportAll => writes.extend(self.export_all(host)?),
                IconIntent::Close => self.close(host)?,
            }
        }
        Ok(writes)
    }
}

impl FramedumpPanel {
    /// Apply `intents` in order. Returns whether a capture run was started.
    pub fn dispatch<H, I>(&mut self, host: &mut H, intents: I) -> PropshotResult<bool>
    where
        H: SceneHost + ?Sized,
        I: IntoIterator<Item = FramedumpIntent>,
    {
        let mut started = false;
        for intent in intents {
            match intent {
                FramedumpIntent::SetTarget(asset) => self.set_target(host, asset)?,
                FramedumpIntent::SetExportPath(path) => self.set_export_path(path),
                FramedumpIntent::SetImageSize { width, height } => {
                    self.set_image_size(host, width, height)?
                }
                FramedumpIntent::SetFrameRate(fps) => self.set_frame_rate(host, fps),
                FramedumpIntent::SetLength(length) => self.set_length(length),
                FramedumpIntent::SetVideoFormat(format) => self.set_video_format(format),
                FramedumpIntent::Start => started |= self.start(host)?,
                FramedumpIntent::Close => self.teardown(host),
            }
        }
        Ok(started)
    }
}
