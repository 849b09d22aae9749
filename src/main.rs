use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use jaccard_viz::app::ViewerApp;
use jaccard_viz::config::{Args, ViewerConfig};
use jaccard_viz::data::loader::load_file;
use jaccard_viz::state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = ViewerConfig::from_args(&args)?;

    // Load before opening a window so bad input never reaches the display.
    let table = load_file(&config.data_path, &config.load_options())
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    log::info!(
        "Loaded {} rows from {} ({} vs {})",
        table.len(),
        config.data_path.display(),
        config.columns.y,
        config.columns.x
    );

    let state = AppState::new(config, table);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Jaccard Error Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(ViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("cannot open viewer window: {e}"))
}
