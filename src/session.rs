//! Per-window session state: the catalog, the active theme and its playback.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::animation::AnimationDriver;
use crate::catalog::{Catalog, Theme};
use crate::dispatcher::{ActionKind, Dispatcher, PendingAction};
use crate::frames::{self, CanvasSize, Frame, FrameSequence};
use crate::tasks::{ActionEvent, ActionTask};
use crate::theme_list::display_name;

/// Info text shown before anything is selected.
pub const IDLE_INFO: &str = "Select a theme to preview";

/// The selected theme together with its decoded frames.
#[derive(Debug, Clone)]
pub struct ActiveTheme {
    pub theme: Theme,
    pub frames: FrameSequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Frames were decoded and playback started.
    Loaded { frames: usize },
    /// The theme has no frame that could be loaded.
    NoFrames,
    /// The path is not part of the catalog.
    Unknown,
}

/// State owned by the top-level window.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    canvas: CanvasSize,
    active: Option<ActiveTheme>,
    animation: AnimationDriver,
    info: String,
    /// Confirmed privileged action still running, at most one.
    task: Option<ActionTask>,
}

impl Session {
    pub fn new(catalog: Catalog, canvas: CanvasSize, interval_ms: u64) -> Self {
        Self {
            catalog,
            canvas,
            active: None,
            animation: AnimationDriver::new(interval_ms),
            info: IDLE_INFO.to_string(),
            task: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn active(&self) -> Option<&ActiveTheme> {
        self.active.as_ref()
    }

    pub fn animation(&self) -> &AnimationDriver {
        &self.animation
    }

    /// Load the theme at `path`, replacing the previous frame cache.
    pub fn select_theme(&mut self, path: &Path, now: Instant) -> SelectionOutcome {
        self.animation.load(0);
        self.active = None;

        let Some(theme) = self.catalog.find_theme(path).cloned() else {
            log::warn!("selected theme is not catalogued: {}", path.display());
            self.info = IDLE_INFO.to_string();
            return SelectionOutcome::Unknown;
        };

        let frames = frames::load_frames(&theme.frames, self.canvas);
        if frames.is_empty() {
            self.info = format!("No animation frames found in {}", theme.name);
            return SelectionOutcome::NoFrames;
        }

        let count = frames.len();
        log::info!("loaded {count} frames for {}", theme.name);
        self.info = format!(
            "Theme: {}\nFrames: {count}\nPath: {}",
            display_name(&theme.name),
            theme.path.display()
        );
        self.animation.load(count);
        self.animation.start(now);
        self.active = Some(ActiveTheme { theme, frames });
        SelectionOutcome::Loaded { frames: count }
    }

    /// Actions need a selected theme with at least one loaded frame and no action in flight.
    pub fn actions_enabled(&self) -> bool {
        self.task.is_none() && self.active.as_ref().is_some_and(|active| !active.frames.is_empty())
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    /// The action currently running on the worker.
    pub fn running_action(&self) -> Option<&PendingAction> {
        self.task.as_ref().map(ActionTask::action)
    }

    /// Run a confirmed action in the background. Refused while another one runs.
    pub fn start_action(&mut self, dispatcher: &Dispatcher, action: PendingAction) -> bool {
        if let Some(running) = self.running_action() {
            log::warn!(
                "ignoring {:?} of {}: {:?} of {} still running",
                action.kind,
                action.theme_name,
                running.kind,
                running.theme_name
            );
            return false;
        }
        self.task = Some(ActionTask::spawn(dispatcher.clone(), action));
        true
    }

    /// Collect the outcome of the running action once the worker reported.
    pub fn poll_action(&mut self) -> Option<ActionEvent> {
        let event = self.task.as_mut()?.try_finish()?;
        self.task = None;
        Some(event)
    }

    pub fn pending_action(&self, kind: ActionKind) -> Option<PendingAction> {
        let active = self.active.as_ref()?;
        Some(PendingAction::new(kind, &active.theme.path))
    }

    /// Frame currently on screen.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.active.as_ref()?.frames.get(self.animation.displayed())
    }

    pub fn toggle_playback(&mut self, now: Instant) {
        if self.active.is_some() {
            self.animation.toggle(now);
        }
    }

    pub fn stop_playback(&mut self) {
        self.animation.stop();
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64, now: Instant) {
        self.animation.set_interval_ms(interval_ms, now);
    }

    /// Advance the animation if its timer is due. Returns true when the frame changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.animation.poll(now).is_some()
    }

    pub fn time_until_next_frame(&self, now: Instant) -> Option<Duration> {
        self.animation.time_until_next(now)
    }

    /// Tear down the animation timer and wait for a running action before the window goes away.
    pub fn shutdown(&mut self) {
        self.animation.pause();
        if let Some(task) = self.task.take() {
            log::info!("waiting for {} to finish", task.action().theme_name);
            drop(task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{CommandOutput, CommandRunner};
    use crate::settings::AppSettings;
    use std::fs;
    use std::io;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use tempfile::TempDir;

    /// Holds every command until the test releases it.
    struct GatedRunner {
        release: Mutex<Receiver<()>>,
        calls: Mutex<usize>,
    }

    impl GatedRunner {
        fn new() -> (Arc<Self>, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let runner = Arc::new(Self {
                release: Mutex::new(rx),
                calls: Mutex::new(0),
            });
            (runner, tx)
        }
    }

    impl CommandRunner for GatedRunner {
        fn run(&self, _program: &str, _args: &[String]) -> io::Result<CommandOutput> {
            *self.calls.lock().unwrap() += 1;
            let _ = self.release.lock().unwrap().recv();
            Ok(CommandOutput {
                success: true,
                stderr: String::new(),
            })
        }
    }

    fn theme_dir(root: &Path, frames: &[&str]) -> std::path::PathBuf {
        let dir = root.join("pack_sample").join("glow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("glow.plymouth"), b"[Plymouth Theme]\n").unwrap();
        for name in frames {
            image::RgbaImage::new(8, 8).save(dir.join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn selection_loads_frames_and_starts_playback() {
        let root = TempDir::new().unwrap();
        let dir = theme_dir(root.path(), &["progress-0.png", "progress-1.png"]);
        let mut session = Session::new(Catalog::scan(root.path(), "pack_"), CanvasSize::default(), 50);

        let outcome = session.select_theme(&dir, Instant::now());
        assert_eq!(outcome, SelectionOutcome::Loaded { frames: 2 });
        assert!(session.actions_enabled());
        assert!(session.animation().is_running());
        assert!(session.info().starts_with("Theme: Glow\nFrames: 2"));
        assert_eq!(
            session.pending_action(ActionKind::Install).unwrap().theme_name,
            "glow"
        );
    }

    #[test]
    fn unknown_path_clears_selection() {
        let root = TempDir::new().unwrap();
        let dir = theme_dir(root.path(), &["progress-0.png"]);
        let mut session = Session::new(Catalog::scan(root.path(), "pack_"), CanvasSize::default(), 50);
        session.select_theme(&dir, Instant::now());

        let outcome = session.select_theme(&root.path().join("elsewhere"), Instant::now());
        assert_eq!(outcome, SelectionOutcome::Unknown);
        assert_eq!(session.info(), IDLE_INFO);
        assert!(!session.actions_enabled());
        assert!(!session.animation().is_running());
        assert!(session.pending_action(ActionKind::Apply).is_none());
    }

    #[test]
    fn shutdown_tears_down_timer() {
        let root = TempDir::new().unwrap();
        let dir = theme_dir(root.path(), &["progress-0.png"]);
        let mut session = Session::new(Catalog::scan(root.path(), "pack_"), CanvasSize::default(), 50);
        session.select_theme(&dir, Instant::now());
        session.shutdown();
        assert!(!session.animation().is_running());
        assert_eq!(session.time_until_next_frame(Instant::now()), None);
    }

    #[test]
    fn one_action_at_a_time() {
        let root = TempDir::new().unwrap();
        let dir = theme_dir(root.path(), &["progress-0.png"]);
        let mut session = Session::new(Catalog::scan(root.path(), "pack_"), CanvasSize::default(), 50);
        session.select_theme(&dir, Instant::now());

        let (runner, release) = GatedRunner::new();
        let dispatcher = Dispatcher::new(&AppSettings::default(), root.path(), runner.clone());
        let install = session.pending_action(ActionKind::Install).unwrap();
        assert!(session.start_action(&dispatcher, install.clone()));
        assert!(session.is_busy());
        assert!(!session.actions_enabled());
        assert_eq!(session.running_action(), Some(&install));

        let apply = session.pending_action(ActionKind::Apply).unwrap();
        assert!(!session.start_action(&dispatcher, apply));
        assert_eq!(session.running_action(), Some(&install));
        assert!(session.poll_action().is_none());

        release.send(()).unwrap();
        let event = loop {
            if let Some(event) = session.poll_action() {
                break event;
            }
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(event.action, install);
        assert!(event.result.is_ok());
        assert_eq!(*runner.calls.lock().unwrap(), 1);
        assert!(!session.is_busy());
        assert!(session.actions_enabled());
    }

    #[test]
    fn shutdown_waits_for_running_action() {
        let root = TempDir::new().unwrap();
        let dir = theme_dir(root.path(), &["progress-0.png"]);
        let mut session = Session::new(Catalog::scan(root.path(), "pack_"), CanvasSize::default(), 50);
        session.select_theme(&dir, Instant::now());

        let (runner, release) = GatedRunner::new();
        let dispatcher = Dispatcher::new(&AppSettings::default(), root.path(), runner);
        let apply = session.pending_action(ActionKind::Apply).unwrap();
        assert!(session.start_action(&dispatcher, apply));

        release.send(()).unwrap();
        release.send(()).unwrap();
        session.shutdown();
        assert!(!session.is_busy());
        assert!(session.poll_action().is_none());
    }
}
