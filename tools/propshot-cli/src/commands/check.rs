//! Check the environment.

use propshot_common::config::config_file_path;
use propshot_project_model::SettingsStore;
use propshot_render_engine::Transcoder;
use propshot_scene::SceneHost;

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    println!("Propshot Environment Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[OK] Config: defaults ({} not found)", config_path.display());
    }

    let transcoder = Transcoder::new(&ctx.config.ffmpeg);
    let transcoder_ok = transcoder.is_available();
    if transcoder_ok {
        println!("[OK] Transcoder: {}", transcoder.binary().display());
    } else {
        println!(
            "[WARN] Transcoder not found: {} (frame dumps disabled)",
            transcoder.binary().display()
        );
    }

    let settings_path = &ctx.config.settings_path;
    let mut missing = 0;
    if settings_path.exists() {
        match SettingsStore::load(settings_path) {
            Ok(store) => {
                let host = ctx.host();
                let records = &store.settings().settings;
                println!(
                    "[OK] Settings: {} ({} asset(s))",
                    settings_path.display(),
                    records.len()
                );
                for record in records {
                    if host.resolves(&record.asset) {
                        println!("     {}", record.asset);
                    } else {
                        missing += 1;
                        println!("     {} (missing)", record.asset);
                    }
                }
            }
            Err(e) => println!("[WARN] Settings: {e}"),
        }
    } else {
        println!(
            "[WARN] Settings: {} not found (run `propshot init`)",
            settings_path.display()
        );
    }

    println!("[OK] Sequence root: {}", ctx.config.sequence_root.display());

    println!();
    if missing > 0 {
        println!("{missing} registered asset(s) are missing; `propshot prune` removes them.");
    } else if transcoder_ok {
        println!("Everything looks good. Propshot is ready.");
    } else {
        println!("Icons work; install ffmpeg to enable frame dumps.");
    }
    Ok(())
}
