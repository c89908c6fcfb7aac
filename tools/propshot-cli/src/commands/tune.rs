//! `propshot tune`: edit one asset's framing.

use std::path::PathBuf;

use propshot_capture_engine::IconIntent;

use super::Context;

pub struct FramingArgs {
    pub size: Option<f32>,
    pub tilt: Option<f32>,
    pub rotate: Option<f32>,
    pub offset_x: Option<f32>,
    pub offset_y: Option<f32>,
}

pub fn run(ctx: &Context, asset: PathBuf, args: FramingArgs) -> anyhow::Result<()> {
    let asset = ctx.asset(&asset);
    let mut host = ctx.host();
    let mut panel = ctx.icon_panel(&mut host)?;

    let index = panel.register(&mut host, &asset)?;
    let current = panel.entries()[index].settings().clone();

    let mut intents = vec![IconIntent::SetFraming {
        index,
        camera_size: args.size.unwrap_or(current.camera_size),
        camera_tilt: args.tilt.unwrap_or(current.camera_tilt),
        camera_rotate: args.rotate.unwrap_or(current.camera_rotate),
    }];
    if args.offset_x.is_some() || args.offset_y.is_some() {
        intents.push(IconIntent::SetOffset {
            x: args.offset_x.unwrap_or(current.offset.x),
            y: args.offset_y.unwrap_or(current.offset.y),
        });
    }
    panel.dispatch(&mut host, intents)?;

    let s = panel.entries()[index].settings();
    println!("{asset}");
    println!("  Size:   {:.3}", s.camera_size);
    println!("  Tilt:   {}°", s.camera_tilt);
    println!("  Rotate: {}°", s.camera_rotate);
    println!("  Offset: ({:.2}, {:.2})", s.offset.x, s.offset.y);

    panel.close(&mut host)?;
    Ok(())
}
