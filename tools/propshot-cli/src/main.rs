//! Propshot CLI: icon thumbnails and frame-sequence exports of 3D assets.
//!
//! Usage:
//!   propshot init                 Create or update the icon settings file
//!   propshot register <ASSET>...  Register assets and derive their framing
//!   propshot unregister <ASSET>   Forget an asset's framing
//!   propshot tune <ASSET>         Adjust an asset's camera framing
//!   propshot icon [ASSET]...      Export icons
//!   propshot framedump <ASSET>    Capture a turntable GIF/MOV
//!   propshot prune                Drop settings for assets that no longer exist
//!   propshot check                Check the environment

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use propshot_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "propshot",
    about = "Icon thumbnails and turntable captures of 3D assets",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Icon settings file (overrides the configured location)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory asset paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    assets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the settings file or update its base settings
    Init {
        /// Directory icons are written into
        #[arg(long)]
        export_path: Option<PathBuf>,

        /// Icon width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Icon height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Image format: png, jpg, raw
        #[arg(long)]
        format: Option<String>,

        /// Light rotation in degrees
        #[arg(long)]
        light_rotation: Option<f32>,

        /// Lighting mode: neutral, warm, cold
        #[arg(long)]
        lighting: Option<String>,
    },

    /// Register assets, deriving framing from their bounds
    Register {
        /// Asset paths (OBJ)
        #[arg(required = true)]
        assets: Vec<PathBuf>,
    },

    /// Remove an asset's persisted framing
    Unregister {
        /// Asset path
        asset: PathBuf,
    },

    /// Adjust an asset's camera framing
    Tune {
        /// Asset path
        asset: PathBuf,

        /// Orthographic half-extent
        #[arg(long)]
        size: Option<f32>,

        /// Camera pitch in degrees
        #[arg(long)]
        tilt: Option<f32>,

        /// Camera yaw in degrees
        #[arg(long)]
        rotate: Option<f32>,

        /// Horizontal framing offset [-1, 1]
        #[arg(long, allow_hyphen_values = true)]
        offset_x: Option<f32>,

        /// Vertical framing offset [-1, 1]
        #[arg(long, allow_hyphen_values = true)]
        offset_y: Option<f32>,
    },

    /// Export icons
    Icon {
        /// Assets to export (defaults to every registered asset)
        assets: Vec<PathBuf>,

        /// Export every listed asset instead of only the last one
        #[arg(long)]
        all: bool,
    },

    /// Capture a frame sequence of an asset and merge it into a video
    Framedump {
        /// Asset path
        asset: PathBuf,

        /// Capture rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Frames to capture
        #[arg(long, default_value = "30")]
        length: u32,

        /// Frame width
        #[arg(long, default_value = "256")]
        width: u32,

        /// Frame height
        #[arg(long, default_value = "256")]
        height: u32,

        /// Video format: gif, mov
        #[arg(long, default_value = "gif")]
        format: String,

        /// Directory the video is written into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Turntable speed in degrees per second
        #[arg(long, default_value = "120")]
        spin: f32,

        /// Keep the frame sequence after the video is written
        #[arg(long)]
        keep_frames: bool,
    },

    /// Drop settings for assets that no longer resolve
    Prune,

    /// Check the environment
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::try_load();
    let mut config = loaded.as_ref().map(Clone::clone).unwrap_or_default();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    propshot_common::logging::init_logging(&config.logging);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "Using default configuration");
    }
    if let Some(settings) = cli.settings {
        config.settings_path = settings;
    }

    let ctx = commands::Context {
        config,
        asset_root: cli.assets,
    };

    match cli.command {
        Commands::Init {
            export_path,
            width,
            height,
            format,
            light_rotation,
            lighting,
        } => commands::init::run(
            &ctx,
            commands::init::BaseSettings {
                export_path,
                width,
                height,
                format,
                light_rotation,
                lighting,
            },
        ),
        Commands::Register { assets } => commands::register::run(&ctx, assets),
        Commands::Unregister { asset } => commands::register::unregister(&ctx, asset),
        Commands::Tune {
            asset,
            size,
            tilt,
            rotate,
            offset_x,
            offset_y,
        } => commands::tune::run(
            &ctx,
            asset,
            commands::tune::FramingArgs {
                size,
                tilt,
                rotate,
                offset_x,
                offset_y,
            },
        ),
        Commands::Icon { assets, all } => commands::icon::run(&ctx, assets, all).await,
        Commands::Framedump {
            asset,
            fps,
            length,
            width,
            height,
            format,
            output,
            spin,
            keep_frames,
        } => {
            commands::framedump::run(
                &ctx,
                commands::framedump::FramedumpArgs {
                    asset,
                    fps,
                    length,
                    width,
                    height,
                    format,
                    output,
                    spin,
                    keep_frames,
                },
            )
            .await
        }
        Commands::Prune => commands::prune::run(&ctx),
        Commands::Check => commands::check::run(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tune_accepts_negative_offsets() {
        let cli = Cli::try_parse_from(["propshot", "tune", "a.obj", "--offset-x", "-0.5"])
            .unwrap();
        match cli.command {
            Commands::Tune { offset_x, .. } => assert_eq!(offset_x, Some(-0.5)),
            _ => panic!("expected tune"),
        }
    }
}
