mod app;
mod util;
mod world;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// World file holding entities, categories and relationships.
    #[arg(long, default_value = "world.json")]
    world: PathBuf,

    /// Where the viewport/position snapshot is kept between runs.
    /// Defaults to the world path with a `.view.json` extension.
    #[arg(long)]
    view_state: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let view_state_path = args
        .view_state
        .unwrap_or_else(|| world::default_view_state_path(&args.world));
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "loreweave",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::LoreweaveApp::new(
                cc,
                args.world.clone(),
                view_state_path.clone(),
            )))
        }),
    )
}
