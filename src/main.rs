mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use app::CollegeScopeApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::discover();
    log::info!("Starting with data source {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "College Scope – Higher Education Performance Matrix",
        options,
        Box::new(|_cc| Ok(Box::new(CollegeScopeApp::new(config)))),
    )
}
