mod app;
mod color;
mod config;
mod data;
mod figure;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustySpectraApp;
use config::ViewerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::resolve().unwrap_or_else(|e| {
        log::error!("Ignoring configuration: {e:#}");
        ViewerConfig::default()
    });

    // Spectra named on the command line are opened at start-up.
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Spectra – FITS Spectrum Viewer",
        options,
        Box::new(move |_cc| {
            let mut app = RustySpectraApp::new(config);
            for path in &paths {
                let result = app.state.open_spectrum(path);
                app.state.report(result);
            }
            Ok(Box::new(app))
        }),
    )
}
