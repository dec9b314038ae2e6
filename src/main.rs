use spartito::{Pipeline, SpartitoApp, SpartitoConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "spartito.ron";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spartito=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = SpartitoConfig::load_or_default(&config_path)?;

    let title = if config.audio {
        "Spartito Musicale con Suono"
    } else {
        "Spartito Musicale"
    };
    let pipeline = Pipeline::with_serial(&config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([700.0, 120.0 + 240.0 * config.sources.len() as f32])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        "Spartito",
        options,
        Box::new(|_cc| Ok(Box::new(SpartitoApp::new(pipeline)))),
    )?;
    Ok(())
}
