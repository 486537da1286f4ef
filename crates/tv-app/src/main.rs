//! Main application entry point

use anyhow::{Context as _, Result};
use eframe::egui;
use tracing::info;

use tv_data::DashboardConfig;

mod app;

/// Dashboard layout from the path given on the command line, or the built-in demo
fn load_config() -> Result<DashboardConfig> {
    match std::env::args().nth(1) {
        Some(path) => DashboardConfig::load(&path)
            .with_context(|| format!("Failed to load dashboard config from {}", path)),
        None => Ok(DashboardConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    info!("Starting '{}' with {} widgets", config.title, config.widgets.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(app::ThreatDashboardApp::new(cc, config))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
