//! Application entry point for the animated Voronoi viewer.
//!
//! This binary sets up tracing and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod gpu;
mod viewer;

use anyhow::Result;
use tracing::info;
use viewer::Viewer;
use voronoi_core::config::Config;

/// Starts the native eframe application.
///
/// The window is sized to the domain; the field strategy is resolved from
/// [`Config::strategy`] inside [`Viewer::new`]. Startup failures (shader
/// compilation, surface allocation, missing GL context for a forced GPU
/// strategy) abort app creation and exit with a non-zero status.
fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::default();
    info!(domain = ?cfg.domain, strategy = ?cfg.strategy, "starting voronoi viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([cfg.domain.x, cfg.domain.y]),
        ..Default::default()
    };

    eframe::run_native(
        "Voronoi",
        options,
        Box::new(move |cc| Ok(Box::new(Viewer::new(cc, cfg)?))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
