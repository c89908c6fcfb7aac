//! Persisted icon settings.
//!
//! One [`IconSettings`] record holds the base export parameters plus one
//! [`PrefabSettings`] entry per registered source asset. Entries are keyed by
//! [`AssetRef`] identity and the list never holds two entries for the same
//! asset.

use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::request::ImageFormat;

/// Default icon edge length in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 512;

/// Identity of a source visual asset.
///
/// Two references are the same asset when their normalized paths are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Create a reference from a path. Backslashes are normalized to `/` and
    /// a leading `./` is dropped so equivalent spellings compare equal.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let trimmed = raw.strip_prefix("./").unwrap_or(&raw);
        Self(trimmed.to_string())
    }

    /// The asset path.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Display name used in output file names: the file stem of the path.
    pub fn name(&self) -> String {
        Path::new(&self.0)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-asset camera framing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabSettings {
    /// The registered source asset.
    pub asset: AssetRef,

    /// Baseline height: the vertical centre of the asset's bounds.
    #[serde(default)]
    pub original_y: f32,

    /// 2D framing offset, each axis in `[-1.0, 1.0]`, scaled by camera size.
    #[serde(default)]
    pub offset: Vec2,

    /// Orthographic half-extent of the capture camera.
    #[serde(default = "default_camera_size")]
    pub camera_size: f32,

    /// Camera yaw in degrees.
    #[serde(default)]
    pub camera_rotate: f32,

    /// Camera pitch in degrees.
    #[serde(default)]
    pub camera_tilt: f32,
}

fn default_camera_size() -> f32 {
    1.0
}

impl PrefabSettings {
    /// Fresh settings derived from an instance's bounds.
    ///
    /// `center_y` becomes the baseline and the largest bounds extent becomes
    /// the camera size.
    pub fn from_bounds(asset: AssetRef, center_y: f32, size: [f32; 3]) -> Self {
        let max = size[0].max(size[1]).max(size[2]);
        Self {
            asset,
            original_y: center_y,
            offset: Vec2::ZERO,
            camera_size: max.max(0.0),
            camera_rotate: 0.0,
            camera_tilt: 0.0,
        }
    }

    /// Set the camera size, clamping negative values to zero.
    pub fn set_camera_size(&mut self, size: f32) {
        self.camera_size = if size.is_finite() { size.max(0.0) } else { 0.0 };
    }

    /// Set the framing offset, clamping each axis to `[-1.0, 1.0]`.
    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }
}

/// Lighting preset for the capture scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LightingMode {
    #[default]
    Neutral,
    Warm,
    Cold,
}

impl LightingMode {
    pub const ALL: [LightingMode; 3] = [Self::Neutral, Self::Warm, Self::Cold];

    /// Persisted index of this mode.
    pub fn index(self) -> u8 {
        match self {
            Self::Neutral => 0,
            Self::Warm => 1,
            Self::Cold => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Warm => "Warm",
            Self::Cold => "Cold",
        }
    }
}

impl TryFrom<u8> for LightingMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.index() == value)
            .ok_or_else(|| format!("unknown lighting mode index {value}"))
    }
}

impl From<LightingMode> for u8 {
    fn from(mode: LightingMode) -> Self {
        mode.index()
    }
}

/// The persisted settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconSettings {
    /// Directory icons are written into.
    pub export_path: PathBuf,

    /// Output image width in pixels.
    pub image_width: u32,

    /// Output image height in pixels.
    pub image_height: u32,

    /// Light pivot yaw in degrees.
    pub light_rotation: f32,

    /// Lighting preset.
    pub lighting_mode: LightingMode,

    /// Output image encoding.
    pub image_format: ImageFormat,

    /// Per-asset framing records.
    pub settings: Vec<PrefabSettings>,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from("Assets"),
            image_width: DEFAULT_ICON_SIZE,
            image_height: DEFAULT_ICON_SIZE,
            light_rotation: 0.0,
            lighting_mode: LightingMode::Neutral,
            image_format: ImageFormat::Png,
            settings: Vec::new(),
        }
    }
}

impl IconSettings {
    /// Index of the record for `asset`, if any.
    pub fn position(&self, asset: &AssetRef) -> Option<usize> {
        self.settings.iter().position(|s| &s.asset == asset)
    }

    /// The record for `asset`, if any.
    pub fn find(&self, asset: &AssetRef) -> Option<&PrefabSettings> {
        self.settings.iter().find(|s| &s.asset == asset)
    }

    /// Add `record` only when no record exists for its asset.
    ///
    /// Returns `true` when the record was inserted.
    pub fn insert_if_absent(&mut self, record: PrefabSettings) -> bool {
        if self.position(&record.asset).is_some() {
            return false;
        }
        self.settings.push(record);
        true
    }

    /// Replace the record for `record.asset`, or append it.
    pub fn upsert(&mut self, record: PrefabSettings) {
        match self.position(&record.asset) {
            Some(index) => self.settings[index] = record,
            None => self.settings.push(record),
        }
    }

    /// Remove the record for `asset`.
    pub fn remove(&mut self, asset: &AssetRef) -> Option<PrefabSettings> {
        let index = self.position(asset)?;
        Some(self.settings.remove(index))
    }

    /// Remove every record whose asset `resolves` rejects.
    ///
    /// Returns the removed asset references in their original order.
    pub fn prune<F>(&mut self, mut resolves: F) -> Vec<AssetRef>
    where
        F: FnMut(&AssetRef) -> bool,
    {
        let mut removed = Vec::new();
        self.settings.retain(|record| {
            if resolves(&record.asset) {
                true
            } else {
                removed.push(record.asset.clone());
                false
            }
        });
        removed
    }

    /// Drop duplicate records, keeping the first one per asset.
    ///
    /// Returns the number of records dropped.
    pub fn dedupe(&mut self) -> usize {
        let before = self.settings.len();
        let mut seen = std::collections::HashSet::new();
        self.settings.retain(|record| seen.insert(record.asset.clone()));
        before - self.settings.len()
    }

    /// Clamp image dimensions to at least one pixel.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
    }
}
