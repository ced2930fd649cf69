mod app;
mod panels;
mod theme;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use plymouth_toolkit::settings;

/// Plymouth theme viewer and installer.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Directory containing the `pack_*` theme directories.
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Read settings from this file instead of the per-user config.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Initial frame interval in milliseconds (10-200).
    #[arg(long, value_name = "MS")]
    interval: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => settings::load_from(path),
        None => settings::load(),
    };
    if let Some(root) = cli.root {
        settings.themes_root = Some(root);
    }
    if let Some(interval) = cli.interval {
        settings.frame_interval_ms = interval;
    }
    let themes_root = settings.resolve_themes_root()?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Plymouth Theme Viewer")
            .with_inner_size([900.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Plymouth Theme Viewer",
        native_options,
        Box::new(move |cc| Box::new(app::ToolkitApp::new(cc, settings, themes_root))),
    )
    .map_err(|err| anyhow::anyhow!("failed to start window: {err}"))?;
    Ok(())
}
