mod app;
mod config;
mod render;
mod trace;

use log::{info, warn};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

use crate::app::DriveApp;
use crate::config::AppConfig;

const DEBUG_ENV: &str = "DRIVE_DEMO_DEBUG";

fn main() -> eframe::Result<()> {
    init_logging();
    let config = load_config();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("Top-Down Driving"),
        ..Default::default()
    };
    eframe::run_native(
        "Top-Down Driving",
        options,
        Box::new(move |_cc| Ok(Box::new(DriveApp::new(config)))),
    )
}

fn init_logging() {
    let level = if std::env::var_os(DEBUG_ENV).is_some() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new().set_target_level(LevelFilter::Error).build();
    if let Err(err) = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("logger init failed: {err}");
    }
}

/// A missing or broken config file never stops the demo; it runs on defaults.
fn load_config() -> AppConfig {
    let Some(path) = AppConfig::locate() else {
        info!("no config file given, using defaults");
        return AppConfig::default();
    };
    match AppConfig::load(&path) {
        Ok(config) => {
            info!("loaded config from {}", path.display());
            config
        }
        Err(err) => {
            warn!("{err}; falling back to defaults");
            AppConfig::default()
        }
    }
}
