//! AeroScope - CENIPA Aviation Occurrence Analysis & Interactive Dashboard
//!
//! Loads the CENIPA occurrence and aircraft CSV exports, joins and cleans
//! them, and displays interactive filtered charts per year.

use aeroscope::config::AppConfig;
use aeroscope::gui::AeroScopeApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load_or_default();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("AeroScope"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "AeroScope",
        options,
        Box::new(move |cc| Ok(Box::new(AeroScopeApp::new(cc, config)))),
    )
}
