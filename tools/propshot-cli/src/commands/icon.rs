//! `propshot icon`: export icon thumbnails.

use std::path::PathBuf;

use anyhow::Context as _;
use propshot_capture_engine::IconIntent;
use propshot_project_model::AssetRef;
use propshot_render_engine::WriteOutcome;

use super::Context;

pub async fn run(ctx: &Context, assets: Vec<PathBuf>, all: bool) -> anyhow::Result<()> {
    let mut host = ctx.host();
    let mut panel = ctx.icon_panel(&mut host)?;

    // Without explicit assets every registered asset is exported.
    let export_all = all || assets.is_empty();
    let assets: Vec<AssetRef> = if assets.is_empty() {
        panel
            .store()
            .settings()
            .settings
            .iter()
            .map(|record| record.asset.clone())
            .collect()
    } else {
        assets.iter().map(|path| ctx.asset(path)).collect()
    };
    if assets.is_empty() {
        println!("No assets registered. Pass asset paths or run `propshot register`.");
        panel.close(&mut host)?;
        return Ok(());
    }

    let mut intents: Vec<IconIntent> = assets.into_iter().map(IconIntent::Register).collect();
    intents.push(if export_all {
        IconIntent::ExportAll
    } else {
        IconIntent::ExportCurrent
    });
    let handles = panel.dispatch(&mut host, intents)?;

    let mut written = 0;
    for handle in handles {
        let path = handle.path().to_path_buf();
        match handle
            .wait()
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?
        {
            WriteOutcome::Written { path, bytes } => {
                written += 1;
                println!("Wrote {} ({bytes} bytes)", path.display());
            }
            WriteOutcome::Dropped { path } => println!("Skipped {}", path.display()),
        }
    }

    panel.close(&mut host)?;
    println!("Exported {written} icon(s).");
    Ok(())
}
