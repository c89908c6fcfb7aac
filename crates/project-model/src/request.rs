//! Export requests and output naming.
//!
//! File names produced here are part of the external contract:
//!
//! - icons: `<exportPath>/UI_Icon_<assetName>.<ext>`
//! - frame sequences: `<outputDir>/<assetName><NNNN>.png`, `NNNN` starting at `0001`
//! - videos: `<exportPath>/<assetName>_<fmt>.<fmt>`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Still-image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ImageFormat {
    /// Lossless, alpha preserved.
    #[default]
    Png,
    /// Lossy, alpha dropped.
    Jpg,
    /// Unencoded RGBA8 readback.
    Raw,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [Self::Png, Self::Jpg, Self::Raw];

    /// Persisted index of this format.
    pub fn index(self) -> u8 {
        match self {
            Self::Png => 0,
            Self::Jpg => 1,
            Self::Raw => 2,
        }
    }

    /// File extension (lowercase, no dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Raw => "raw",
        }
    }

    /// Whether the capture camera must clear to an opaque background.
    ///
    /// Only PNG keeps a transparent background.
    pub fn needs_opaque_background(self) -> bool {
        !matches!(self, Self::Png)
    }
}

impl TryFrom<u8> for ImageFormat {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|f| f.index() == value)
            .ok_or_else(|| format!("unknown image format index {value}"))
    }
}

impl From<ImageFormat> for u8 {
    fn from(format: ImageFormat) -> Self {
        format.index()
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "raw" => Ok(Self::Raw),
            other => Err(format!("Unknown image format: {other}. Use: png, jpg, raw")),
        }
    }
}

/// Container produced by the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    #[default]
    Gif,
    Mov,
}

impl VideoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mov => "mov",
        }
    }
}

impl std::str::FromStr for VideoFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gif" => Ok(Self::Gif),
            "mov" => Ok(Self::Mov),
            other => Err(format!("Unknown video format: {other}. Use: gif, mov")),
        }
    }
}

/// What an export produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingKind {
    Image(ImageFormat),
    Video(VideoFormat),
}

impl EncodingKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image(format) => format.extension(),
            Self::Video(format) => format.extension(),
        }
    }
}

/// A single export, built fresh for every render-and-write.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub width: u32,
    pub height: u32,
    pub output_path: PathBuf,
    pub kind: EncodingKind,
}

impl ExportRequest {
    /// Request for an icon of `asset_name` under `export_path`.
    pub fn icon(
        export_path: impl AsRef<Path>,
        asset_name: &str,
        format: ImageFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            output_path: icon_output_path(export_path, asset_name, format),
            kind: EncodingKind::Image(format),
        }
    }

    /// Request for frame `index` (1-based) of a sequence.
    pub fn frame(
        sequence_dir: impl AsRef<Path>,
        asset_name: &str,
        index: u32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            output_path: frame_output_path(sequence_dir, asset_name, index),
            kind: EncodingKind::Image(ImageFormat::Png),
        }
    }

    /// Request for the video merged from the frame sequence of `asset_name`.
    pub fn video(
        export_path: impl AsRef<Path>,
        asset_name: &str,
        format: VideoFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            output_path: video_output_path(export_path, asset_name, format),
            kind: EncodingKind::Video(format),
        }
    }

    /// The still-image format, if this is an image request.
    pub fn image_format(&self) -> Option<ImageFormat> {
        match self.kind {
            EncodingKind::Image(format) => Some(format),
            EncodingKind::Video(_) => None,
        }
    }

    /// The container format, if this is a video request.
    pub fn video_format(&self) -> Option<VideoFormat> {
        match self.kind {
            EncodingKind::Video(format) => Some(format),
            EncodingKind::Image(_) => None,
        }
    }
}

/// `UI_Icon_<name>.<ext>`
pub fn icon_file_name(asset_name: &str, format: ImageFormat) -> String {
    format!("UI_Icon_{asset_name}.{}", format.extension())
}

pub fn icon_output_path(
    export_path: impl AsRef<Path>,
    asset_name: &str,
    format: ImageFormat,
) -> PathBuf {
    export_path
        .as_ref()
        .join(icon_file_name(asset_name, format))
}

/// `<name><index:04>.png`
pub fn frame_file_name(asset_name: &str, index: u32) -> String {
    format!("{asset_name}{index:04}.png")
}

pub fn frame_output_path(sequence_dir: impl AsRef<Path>, asset_name: &str, index: u32) -> PathBuf {
    sequence_dir
        .as_ref()
        .join(frame_file_name(asset_name, index))
}

/// Input pattern handed to the transcoder for a frame sequence.
pub fn frame_sequence_pattern(sequence_dir: impl AsRef<Path>, asset_name: &str) -> PathBuf {
    sequence_dir.as_ref().join(format!("{asset_name}%04d.png"))
}

/// `<exportPath>/<name>_<fmt>.<fmt>`
pub fn video_output_path(
    export_path: impl AsRef<Path>,
    asset_name: &str,
    format: VideoFormat,
) -> PathBuf {
    let ext = format.extension();
    export_path.as_ref().join(format!("{asset_name}_{ext}.{ext}"))
}
