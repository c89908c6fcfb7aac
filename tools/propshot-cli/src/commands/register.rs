//! `propshot register` / `propshot unregister`.

use std::path::PathBuf;

use anyhow::Context as _;
use propshot_capture_engine::IconIntent;

use super::Context;

pub fn run(ctx: &Context, assets: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut host = ctx.host();
    let mut panel = ctx.icon_panel(&mut host)?;

    let intents: Vec<IconIntent> = assets
        .iter()
        .map(|path| IconIntent::Register(ctx.asset(path)))
        .collect();
    panel.dispatch(&mut host, intents)?;

    for entry in panel.entries() {
        let s = entry.settings();
        println!(
            "{}: size {:.3}, baseline {:.3}, tilt {}°, rotate {}°",
            entry.asset(),
            s.camera_size,
            s.original_y,
            s.camera_tilt,
            s.camera_rotate
        );
    }
    panel.close(&mut host)?;
    Ok(())
}

pub fn unregister(ctx: &Context, asset: PathBuf) -> anyhow::Result<()> {
    let asset = ctx.asset(&asset);
    let mut store = ctx.open_store()?;
    match store.update(|s| s.remove(&asset)) {
        Some(_) => {
            store.commit().context("Failed to write settings")?;
            println!("Unregistered {asset}");
        }
        None => println!("{asset} is not registered"),
    }
    Ok(())
}
