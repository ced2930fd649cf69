use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::CreationContext;
use eframe::egui::{self, RichText};

use plymouth_toolkit::animation::{interval_for_speed, speed_for_interval};
use plymouth_toolkit::catalog::Catalog;
use plymouth_toolkit::dispatcher::{ActionKind, Dispatcher, Notice, PendingAction, SystemRunner};
use plymouth_toolkit::session::{Session, SelectionOutcome};
use plymouth_toolkit::settings::AppSettings;
use plymouth_toolkit::theme_list::{SelectionEvent, ThemeTree};

use crate::panels::{self, PreviewView, UiCommand};
use crate::theme::apply_theme;

/// Repaint cadence while a privileged action is in flight.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

enum Dialog {
    Confirm { action: PendingAction, notice: Notice },
    Info(Notice),
    Error(Notice),
}

pub struct ToolkitApp {
    session: Session,
    tree: ThemeTree,
    dispatcher: Dispatcher,
    textures: Vec<egui::TextureHandle>,
    speed: u64,
    dialog: Option<Dialog>,
}

impl ToolkitApp {
    pub fn new(cc: &CreationContext<'_>, settings: AppSettings, themes_root: PathBuf) -> Self {
        apply_theme(&cc.egui_ctx, settings.theme);
        let catalog = Catalog::scan(&themes_root, &settings.pack_prefix);
        let tree = ThemeTree::from_catalog(&catalog);
        let session = Session::new(catalog, settings.canvas(), settings.frame_interval_ms);
        let speed = speed_for_interval(session.animation().interval().as_millis() as u64);
        let dispatcher = Dispatcher::new(&settings, &themes_root, Arc::new(SystemRunner));
        Self {
            session,
            tree,
            dispatcher,
            textures: Vec::new(),
            speed,
            dialog: None,
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        self.drain_action();
        let now = Instant::now();
        self.session.poll(now);

        if let Some(event) = panels::theme_tree(ctx, &mut self.tree) {
            self.handle_selection(ctx, event);
        }

        let canvas = self.session.canvas();
        let frame = self
            .session
            .active()
            .and_then(|_| self.textures.get(self.session.animation().displayed()));
        let view = PreviewView {
            info: self.session.info(),
            frame,
            canvas: egui::vec2(canvas.width as f32, canvas.height as f32),
            playing: self.session.animation().is_running(),
            has_frames: self.session.active().is_some(),
            actions_enabled: self.session.actions_enabled() && self.dialog.is_none(),
        };
        let mut speed = self.speed;
        let command = panels::preview(ctx, &view, &mut speed);
        self.speed = speed;
        if let Some(command) = command {
            self.handle_command(command);
        }

        self.show_dialog(ctx);
        self.show_busy(ctx);

        if let Some(wait) = self.session.time_until_next_frame(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
        if self.session.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }

    fn handle_selection(&mut self, ctx: &egui::Context, event: SelectionEvent) {
        let SelectionEvent::ThemeSelected(path) = event;
        self.textures.clear();
        match self.session.select_theme(&path, Instant::now()) {
            SelectionOutcome::Loaded { .. } => self.upload_frames(ctx),
            SelectionOutcome::NoFrames | SelectionOutcome::Unknown => {}
        }
    }

    fn upload_frames(&mut self, ctx: &egui::Context) {
        let Some(active) = self.session.active() else {
            return;
        };
        self.textures = active
            .frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| {
                let (width, height) = frame.image.dimensions();
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [width as usize, height as usize],
                    frame.image.as_raw(),
                );
                ctx.load_texture(
                    format!("{}-{idx}", active.theme.name),
                    image,
                    egui::TextureOptions::LINEAR,
                )
            })
            .collect();
    }

    fn handle_command(&mut self, command: UiCommand) {
        let now = Instant::now();
        match command {
            UiCommand::TogglePlayback => self.session.toggle_playback(now),
            UiCommand::Stop => self.session.stop_playback(),
            UiCommand::SetSpeed(speed) => {
                self.session.set_interval_ms(interval_for_speed(speed), now);
            }
            UiCommand::PreviewWithPlymouth => {
                if let Some(active) = self.session.active() {
                    let notice = self
                        .dispatcher
                        .preview_instructions(&active.theme.path, &active.theme.name);
                    self.dialog = Some(Dialog::Info(notice));
                }
            }
            UiCommand::Install => self.confirm(ActionKind::Install),
            UiCommand::Apply => self.confirm(ActionKind::Apply),
        }
    }

    fn confirm(&mut self, kind: ActionKind) {
        if let Some(action) = self.session.pending_action(kind) {
            let notice = self.dispatcher.confirmation(&action);
            self.dialog = Some(Dialog::Confirm { action, notice });
        }
    }

    fn drain_action(&mut self) {
        let Some(event) = self.session.poll_action() else {
            return;
        };
        self.dialog = Some(match event.result {
            Ok(notice) => Dialog::Info(notice),
            Err(err) => Dialog::Error(Notice {
                title: "Error".into(),
                body: err.to_string(),
            }),
        });
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else {
            return;
        };
        let (title, body, is_error) = match dialog {
            Dialog::Confirm { notice, .. } | Dialog::Info(notice) => (&notice.title, &notice.body, false),
            Dialog::Error(notice) => (&notice.title, &notice.body, true),
        };
        let is_confirm = matches!(dialog, Dialog::Confirm { .. });

        let mut close = false;
        let mut accepted = false;
        egui::Window::new(title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if is_error {
                    ui.label(RichText::new(body.as_str()).color(ui.visuals().error_fg_color));
                } else {
                    ui.label(body.as_str());
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if is_confirm {
                        if ui.button("Yes").clicked() {
                            accepted = true;
                            close = true;
                        }
                        if ui.button("No").clicked() {
                            close = true;
                        }
                    } else if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            if let Some(Dialog::Confirm { action, .. }) = self.dialog.take() {
                if accepted {
                    self.session.start_action(&self.dispatcher, action);
                }
            }
        }
    }

    fn show_busy(&self, ctx: &egui::Context) {
        let Some(action) = self.session.running_action() else {
            return;
        };
        let (title, body) = match action.kind {
            ActionKind::Install => ("Installing theme...", "Please wait while the theme is being installed."),
            ActionKind::Apply => ("Applying theme...", "Please wait while the theme is being applied."),
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(body);
                });
            });
    }
}

impl Drop for ToolkitApp {
    fn drop(&mut self) {
        self.session.shutdown();
    }
}

impl eframe::App for ToolkitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}
