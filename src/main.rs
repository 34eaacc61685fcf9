mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use app::LaunchDashApp;
use config::DashConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashConfig::from_env().context("reading dashboard configuration")?;

    // The dashboard does not start without a dataset.
    let dataset = data::loader::load(&config.source)
        .with_context(|| format!("loading launch records from {}", config.source))?;
    log::info!(
        "Loaded {} launches from {} sites: {:?}",
        dataset.len(),
        dataset.distinct_sites().len(),
        dataset.distinct_sites()
    );
    if dataset.is_empty() {
        log::warn!("Launch table has no rows; every chart will be empty");
    }

    let state = AppState::new(Arc::new(dataset), &config).context("wiring dashboard view")?;
    let title = state.layout.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(LaunchDashApp::new(state)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
