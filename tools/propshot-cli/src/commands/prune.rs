//! `propshot prune`: drop records whose assets no longer exist.

use anyhow::Context as _;
use propshot_scene::SceneHost;

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let host = ctx.host();
    let mut store = ctx.open_store()?;

    let removed = store.update(|s| s.prune(|asset| host.resolves(asset)));
    store.commit().context("Failed to write settings")?;

    if removed.is_empty() {
        println!("Nothing to prune.");
    } else {
        for asset in &removed {
            println!("Removed {asset}");
        }
        println!("Pruned {} record(s).", removed.len());
    }
    Ok(())
}
