//! `propshot init`: create the settings file or edit its base settings.

use std::path::PathBuf;

use anyhow::Context as _;
use propshot_project_model::{ImageFormat, LightingMode};

use super::Context;

/// Base settings given on the command line. `None` leaves a value as is.
pub struct BaseSettings {
    pub export_path: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub light_rotation: Option<f32>,
    pub lighting: Option<String>,
}

pub fn run(ctx: &Context, base: BaseSettings) -> anyhow::Result<()> {
    let format = base
        .format
        .as_deref()
        .map(str::parse::<ImageFormat>)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let lighting = base.lighting.as_deref().map(parse_lighting).transpose()?;

    let mut store = ctx.open_store()?;
    store.update(|s| {
        if let Some(path) = base.export_path {
            s.export_path = path;
        }
        let width = base.width.unwrap_or(s.image_width);
        let height = base.height.unwrap_or(s.image_height);
        s.set_image_size(width, height);
        if let Some(format) = format {
            s.image_format = format;
        }
        if let Some(rotation) = base.light_rotation {
            s.light_rotation = rotation;
        }
        if let Some(mode) = lighting {
            s.lighting_mode = mode;
        }
    });
    store.commit().context("Failed to write settings")?;

    let s = store.settings();
    println!("Settings: {}", store.path().display());
    println!("  Export path:    {}", s.export_path.display());
    println!("  Image size:     {}x{}", s.image_width, s.image_height);
    println!("  Image format:   {}", s.image_format.extension());
    println!("  Light rotation: {}°", s.light_rotation);
    println!("  Lighting:       {}", s.lighting_mode.label());
    println!("  Assets:         {}", s.settings.len());
    Ok(())
}

fn parse_lighting(value: &str) -> anyhow::Result<LightingMode> {
    LightingMode::ALL
        .into_iter()
        .find(|mode| mode.label().eq_ignore_ascii_case(value))
        .with_context(|| format!("Unknown lighting mode: {value}. Use: neutral, warm, cold"))
}
