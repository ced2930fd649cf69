//! Window visuals for the egui-based viewer.

use eframe::egui;

use plymouth_toolkit::settings::ThemeMode;

/// Fill of the preview canvas behind the frames.
pub const PREVIEW_BACKGROUND: egui::Color32 = egui::Color32::BLACK;

/// Apply the configured visuals to the egui context.
pub fn apply_theme(ctx: &egui::Context, theme: ThemeMode) {
    let visuals = match theme {
        ThemeMode::Light => egui::Visuals::light(),
        ThemeMode::Dark => egui::Visuals::dark(),
    };
    ctx.set_visuals(visuals);
}
