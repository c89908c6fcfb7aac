//! Subcommand implementations.

pub mod check;
pub mod framedump;
pub mod icon;
pub mod init;
pub mod prune;
pub mod register;
pub mod tune;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use propshot_capture_engine::IconPanel;
use propshot_common::config::AppConfig;
use propshot_project_model::{AssetRef, SettingsStore};
use propshot_render_engine::{FileWriter, FrameEncoder};
use propshot_scene::software::SoftwareHost;

/// Everything a subcommand needs from the command line and config.
pub struct Context {
    pub config: AppConfig,
    pub asset_root: PathBuf,
}

impl Context {
    pub fn open_store(&self) -> anyhow::Result<SettingsStore> {
        SettingsStore::open(&self.config.settings_path).with_context(|| {
            format!(
                "Failed to open settings at {}",
                self.config.settings_path.display()
            )
        })
    }

    pub fn host(&self) -> SoftwareHost {
        SoftwareHost::new(&self.asset_root)
    }

    pub fn encoder(&self) -> FrameEncoder {
        FrameEncoder::new(self.config.encoding.jpeg_quality)
    }

    /// Open the icon panel on `host` with the persisted settings.
    pub fn icon_panel(&self, host: &mut SoftwareHost) -> anyhow::Result<IconPanel> {
        let store = self.open_store()?;
        let writer = FileWriter::current()?;
        Ok(IconPanel::open(host, store, writer, self.encoder())?)
    }

    /// Asset reference for a path given on the command line.
    ///
    /// Paths under the asset root are stored relative to it.
    pub fn asset(&self, path: &Path) -> AssetRef {
        let relative = path.strip_prefix(&self.asset_root).unwrap_or(path);
        AssetRef::new(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(root: &str) -> Context {
        Context {
            config: AppConfig::default(),
            asset_root: PathBuf::from(root),
        }
    }

    #[test]
    fn test_asset_paths_are_relative_to_root() {
        let ctx = ctx("assets");
        assert_eq!(
            ctx.asset(Path::new("assets/props/crate.obj")),
            AssetRef::new("props/crate.obj")
        );
        assert_eq!(
            ctx.asset(Path::new("props/crate.obj")),
            AssetRef::new("props/crate.obj")
        );
    }
}
