//! Side and central panels of the viewer window.

use plymouth_toolkit::animation::{INTERVAL_STEP_MS, MAX_INTERVAL_MS, MIN_INTERVAL_MS, interval_for_speed};
use plymouth_toolkit::theme_list::{NodeRef, SelectionEvent, ThemeTree};

use crate::theme::PREVIEW_BACKGROUND;

/// User commands raised by the preview panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    TogglePlayback,
    Stop,
    SetSpeed(u64),
    PreviewWithPlymouth,
    Install,
    Apply,
}

/// Everything the preview panel needs to draw itself.
pub struct PreviewView<'a> {
    pub info: &'a str,
    pub frame: Option<&'a egui::TextureHandle>,
    pub canvas: egui::Vec2,
    pub playing: bool,
    pub has_frames: bool,
    pub actions_enabled: bool,
}

/// Render the pack/theme tree and report a theme selection.
pub fn theme_tree(ctx: &egui::Context, tree: &mut ThemeTree) -> Option<SelectionEvent> {
    let mut clicked = None;
    egui::SidePanel::left("themes")
        .resizable(true)
        .default_width(250.0)
        .show(ctx, |ui| {
            ui.heading("Themes");
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if tree.packs().is_empty() {
                        ui.label("No theme packs found.");
                    }
                    for (pack_idx, pack) in tree.packs().iter().enumerate() {
                        let header = egui::CollapsingHeader::new(pack.label.as_str())
                            .id_source(&pack.key)
                            .default_open(pack.expanded)
                            .show(ui, |ui| {
                                for (theme_idx, theme) in pack.themes.iter().enumerate() {
                                    let selected = tree.is_selected(theme.path.as_deref());
                                    if ui.selectable_label(selected, theme.label.as_str()).clicked() {
                                        clicked = Some(NodeRef::Theme {
                                            pack: pack_idx,
                                            theme: theme_idx,
                                        });
                                    }
                                }
                            });
                        if header.header_response.clicked() {
                            clicked = Some(NodeRef::Pack(pack_idx));
                        }
                    }
                });
        });
    clicked.and_then(|node| tree.select(node))
}

/// Render the preview canvas, playback controls and action buttons.
pub fn preview(ctx: &egui::Context, view: &PreviewView<'_>, speed: &mut u64) -> Option<UiCommand> {
    let mut command = None;
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Preview");
        egui::Frame::none().fill(PREVIEW_BACKGROUND).show(ui, |ui| {
            let (rect, _) = ui.allocate_exact_size(view.canvas, egui::Sense::hover());
            if let Some(texture) = view.frame {
                let image_rect = egui::Rect::from_center_size(rect.center(), texture.size_vec2());
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                ui.painter()
                    .image(texture.id(), image_rect, uv, egui::Color32::WHITE);
            }
        });

        ui.add_space(8.0);
        ui.label(view.info);
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let play_label = if view.playing { "⏸ Pause" } else { "▶ Play" };
            if ui
                .add_enabled(view.has_frames, egui::Button::new(play_label))
                .clicked()
            {
                command = Some(UiCommand::TogglePlayback);
            }
            if ui
                .add_enabled(view.has_frames, egui::Button::new("⏹ Stop"))
                .clicked()
            {
                command = Some(UiCommand::Stop);
            }
            ui.add_space(10.0);
            ui.label("Speed:");
            let slider = egui::Slider::new(speed, MIN_INTERVAL_MS..=MAX_INTERVAL_MS)
                .step_by(INTERVAL_STEP_MS as f64)
                .show_value(false);
            if ui.add(slider).changed() {
                command = Some(UiCommand::SetSpeed(*speed));
            }
            ui.label(format!("{} ms/frame", interval_for_speed(*speed)));
        });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let enabled = view.actions_enabled;
            if ui
                .add_enabled(enabled, egui::Button::new("🖥 Preview with Plymouth"))
                .on_hover_text("Preview using plymouth-x11 (requires root)")
                .clicked()
            {
                command = Some(UiCommand::PreviewWithPlymouth);
            }
            if ui
                .add_enabled(enabled, egui::Button::new("📦 Install Theme"))
                .on_hover_text("Copy theme to the system theme directory")
                .clicked()
            {
                command = Some(UiCommand::Install);
            }
            if ui
                .add_enabled(enabled, egui::Button::new("✓ Apply Theme"))
                .on_hover_text("Set as default Plymouth theme (requires root)")
                .clicked()
            {
                command = Some(UiCommand::Apply);
            }
        });
    });
    command
}
