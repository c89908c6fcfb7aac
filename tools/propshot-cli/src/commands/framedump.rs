//! `propshot framedump`: capture a turntable sequence and merge it into a
//! GIF or MOV.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use propshot_capture_engine::{
    CameraFraming, FramedumpIntent, FramedumpPanel, FramedumpSettings, TickOutcome,
};
use propshot_project_model::{ImageFormat, PrefabSettings, VideoFormat};
use propshot_render_engine::{clear_color_for, FileWriter, Transcoder};
use propshot_scene::software::SoftwareHost;
use propshot_scene::SceneHost;

use super::Context;

pub struct FramedumpArgs {
    pub asset: PathBuf,
    pub fps: u32,
    pub length: u32,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub output: PathBuf,
    pub spin: f32,
    pub keep_frames: bool,
}

/// Delay between polls while frame writes drain.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

pub async fn run(ctx: &Context, args: FramedumpArgs) -> anyhow::Result<()> {
    let format: VideoFormat = args.format.parse().map_err(anyhow::Error::msg)?;
    let asset = ctx.asset(&args.asset);

    let mut host = ctx.host().with_turntable(args.spin);
    let settings = FramedumpSettings {
        export_path: args.output,
        sequence_root: ctx.config.sequence_root.clone(),
        ..FramedumpSettings::default()
    };
    let mut panel = FramedumpPanel::open(
        &mut host,
        settings,
        FileWriter::current()?,
        ctx.encoder(),
        Transcoder::new(&ctx.config.ffmpeg),
    );
    if !panel.is_enabled() {
        anyhow::bail!(
            "Transcoder not found: {} (install ffmpeg or set `ffmpeg` in the config)",
            ctx.config.ffmpeg.display()
        );
    }

    panel.dispatch(
        &mut host,
        [
            FramedumpIntent::SetVideoFormat(format),
            FramedumpIntent::SetFrameRate(args.fps),
            FramedumpIntent::SetLength(args.length),
            FramedumpIntent::SetTarget(Some(asset.clone())),
        ],
    )?;
    frame_target(ctx, &mut host, &panel)?;
    panel.dispatch(
        &mut host,
        [FramedumpIntent::SetImageSize {
            width: args.width,
            height: args.height,
        }],
    )?;

    let result = capture(&mut host, &mut panel).await;
    if args.keep_frames {
        if let Some(dir) = panel.sequence_dir() {
            println!("Frames kept in {}", dir.display());
        }
    } else {
        panel.teardown(&mut host);
    }

    let video = result?;
    println!("Wrote {}", video.display());
    Ok(())
}

/// Point a main camera at the staged target, using the asset's persisted
/// icon framing when there is one.
fn frame_target(
    ctx: &Context,
    host: &mut SoftwareHost,
    panel: &FramedumpPanel,
) -> anyhow::Result<()> {
    let (Some(asset), Some(id)) = (panel.target(), panel.stage().id()) else {
        anyhow::bail!("No target staged");
    };

    let persisted = ctx
        .open_store()?
        .settings()
        .find(asset)
        .cloned();
    let record = match persisted {
        Some(record) => record,
        None => {
            let bounds = host
                .world_bounds(id)
                .with_context(|| format!("{asset} has no geometry"))?;
            PrefabSettings::from_bounds(
                asset.clone(),
                bounds.center().y,
                bounds.size().to_array(),
            )
        }
    };

    let rig = CameraFraming::from_settings(&record).rig(clear_color_for(ImageFormat::Png));
    let camera = host.create_camera(rig);
    host.set_main_camera(Some(camera));
    tracing::debug!(asset = %asset, size = record.camera_size, "Framed capture camera");
    Ok(())
}

async fn capture(host: &mut SoftwareHost, panel: &mut FramedumpPanel) -> anyhow::Result<PathBuf> {
    if !panel.dispatch(host, [FramedumpIntent::Start])? {
        anyhow::bail!("Frame dump did not start");
    }
    let length = panel.settings().length;

    loop {
        match panel.tick(host)? {
            TickOutcome::Captured { frame } => {
                if frame % 10 == 0 || frame == length {
                    println!("Captured {frame}/{length} frames");
                }
            }
            TickOutcome::Finalizing { pending } => {
                tracing::trace!(pending, "Waiting for frame writes");
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            TickOutcome::Idle => anyhow::bail!("Frame dump stopped before the video was started"),
            TickOutcome::Launched(handle) => {
                println!("Merging frames (transcoder pid {})...", handle.pid());
                let video = tokio::task::spawn_blocking(move || handle.wait())
                    .await
                    .context("Transcoder task panicked")??;
                return Ok(video);
            }
        }
    }
}
