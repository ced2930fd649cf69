//! Privileged install/apply actions and the commands behind them.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use thiserror::Error;

use crate::settings::AppSettings;

/// Output of an external command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stderr: String,
}

/// Process launcher used for privileged steps.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, blocking until it exits.
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Runs commands with [`std::process::Command`], capturing stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A fully resolved external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Install,
    Apply,
}

/// A privileged operation awaiting confirmation or execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub theme_name: String,
    pub theme_path: PathBuf,
}

impl PendingAction {
    pub fn new(kind: ActionKind, theme_path: &Path) -> Self {
        let theme_name = theme_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            kind,
            theme_name,
            theme_path: theme_path.to_path_buf(),
        }
    }
}

/// Failure of one privileged step; the text is shown verbatim to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Failed to install theme:\n{detail}")]
    Install { detail: String },
    #[error("Failed to copy theme:\n{detail}")]
    Copy { detail: String },
    #[error("Failed to apply theme:\n{detail}")]
    SetDefault { detail: String },
    #[error("Action did not complete:\n{detail}")]
    Interrupted { detail: String },
}

impl ActionError {
    /// Captured stderr, or the launch error text.
    pub fn detail(&self) -> &str {
        match self {
            ActionError::Install { detail }
            | ActionError::Copy { detail }
            | ActionError::SetDefault { detail }
            | ActionError::Interrupted { detail } => detail,
        }
    }
}

/// Text of a dialog shown before or after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Builds and runs the privileged command sequences.
#[derive(Clone)]
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    launcher: String,
    set_default_command: String,
    system_theme_dir: PathBuf,
    preview_script: PathBuf,
    preview_seconds: u32,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("launcher", &self.launcher)
            .field("set_default_command", &self.set_default_command)
            .field("system_theme_dir", &self.system_theme_dir)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(settings: &AppSettings, themes_root: &Path, runner: Arc<dyn CommandRunner>) -> Self {
        let preview_script = settings
            .preview_script
            .clone()
            .unwrap_or_else(|| themes_root.join("showplymouth.sh"));
        Self {
            runner,
            launcher: settings.privilege_launcher.clone(),
            set_default_command: settings.set_default_command.clone(),
            system_theme_dir: settings.system_theme_dir.clone(),
            preview_script,
            preview_seconds: settings.preview_seconds,
        }
    }

    /// Destination directory argument, with the trailing slash `cp` expects.
    fn destination_arg(&self) -> String {
        let dir = self.system_theme_dir.display().to_string();
        if dir.ends_with('/') { dir } else { format!("{dir}/") }
    }

    pub fn copy_command(&self, theme_path: &Path) -> CommandLine {
        CommandLine {
            program: self.launcher.clone(),
            args: vec![
                "cp".into(),
                "-r".into(),
                theme_path.display().to_string(),
                self.destination_arg(),
            ],
        }
    }

    pub fn set_default_command(&self, theme_name: &str) -> CommandLine {
        CommandLine {
            program: self.launcher.clone(),
            args: vec![
                self.set_default_command.clone(),
                "-R".into(),
                theme_name.to_string(),
            ],
        }
    }

    /// Commands for a live preview, shown to the user but never executed here.
    pub fn preview_instructions(&self, theme_path: &Path, theme_name: &str) -> Notice {
        let body = format!(
            "This will temporarily install and preview '{theme_name}' using plymouth-x11.\n\n\
             Requires root privileges and plymouth-x11 package.\n\n\
             Run this command in terminal:\n\
             sudo cp -r {} {} && sudo {} {theme_name} && sudo {} {}",
            theme_path.display(),
            self.destination_arg(),
            self.set_default_command,
            self.preview_script.display(),
            self.preview_seconds,
        );
        Notice {
            title: "Preview with Plymouth".into(),
            body,
        }
    }

    /// Confirmation prompt for `action`.
    pub fn confirmation(&self, action: &PendingAction) -> Notice {
        let copy = sudo_display(&self.copy_command(&action.theme_path));
        match action.kind {
            ActionKind::Install => Notice {
                title: format!("Install '{}'?", action.theme_name),
                body: format!(
                    "This will copy the theme to:\n{}\n\n\
                     Requires root privileges.\n\n\
                     Command to run:\n{copy}",
                    self.system_theme_dir.join(&action.theme_name).display(),
                ),
            },
            ActionKind::Apply => Notice {
                title: format!("Apply '{}' as default?", action.theme_name),
                body: format!(
                    "This will:\n\
                     1. Install the theme (if not already installed)\n\
                     2. Set it as the default Plymouth theme\n\
                     3. Rebuild initramfs\n\n\
                     Requires root privileges.\n\n\
                     Commands to run:\n{copy}\n{}",
                    sudo_display(&self.set_default_command(&action.theme_name)),
                ),
            },
        }
    }

    /// Run `action` to completion, returning the success notice.
    pub fn execute(&self, action: &PendingAction) -> Result<Notice, ActionError> {
        match action.kind {
            ActionKind::Install => self.install(&action.theme_path, &action.theme_name),
            ActionKind::Apply => self.apply(&action.theme_path, &action.theme_name),
        }
    }

    pub fn install(&self, theme_path: &Path, theme_name: &str) -> Result<Notice, ActionError> {
        self.run_step(&self.copy_command(theme_path))
            .map_err(|detail| ActionError::Install { detail })?;
        Ok(Notice {
            title: "Success".into(),
            body: format!("Theme '{theme_name}' installed successfully!"),
        })
    }

    /// Copy the theme, then make it the default and rebuild the initramfs.
    pub fn apply(&self, theme_path: &Path, theme_name: &str) -> Result<Notice, ActionError> {
        self.run_step(&self.copy_command(theme_path))
            .map_err(|detail| ActionError::Copy { detail })?;
        self.run_step(&self.set_default_command(theme_name))
            .map_err(|detail| ActionError::SetDefault { detail })?;
        Ok(Notice {
            title: "Success".into(),
            body: format!(
                "Theme '{theme_name}' has been applied!\n\n\
                 The theme will be visible on your next boot."
            ),
        })
    }

    /// Run one step; a non-zero exit and a launch error both yield the diagnostic text.
    fn run_step(&self, command: &CommandLine) -> Result<(), String> {
        log::info!("running: {command}");
        match self.runner.run(&command.program, &command.args) {
            Ok(output) if output.success => Ok(()),
            Ok(output) => {
                log::error!("{} failed: {}", command.program, output.stderr.trim_end());
                Err(output.stderr)
            }
            Err(err) => {
                log::error!("could not launch {}: {err}", command.program);
                Err(err.to_string())
            }
        }
    }
}

/// Shell form of a privileged command for display, with `sudo` in place of the launcher.
fn sudo_display(command: &CommandLine) -> String {
    let mut line = String::from("sudo");
    for arg in &command.args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every invocation and replays scripted results.
    #[derive(Default)]
    struct ScriptedRunner {
        calls: Mutex<Vec<CommandLine>>,
        results: Mutex<VecDeque<io::Result<CommandOutput>>>,
    }

    impl ScriptedRunner {
        fn with(results: Vec<io::Result<CommandOutput>>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                results: Mutex::new(results.into()),
            })
        }

        fn calls(&self) -> Vec<CommandLine> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
            self.calls.lock().unwrap().push(CommandLine {
                program: program.to_string(),
                args: args.to_vec(),
            });
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(ok()))
        }
    }

    fn ok() -> CommandOutput {
        CommandOutput {
            success: true,
            stderr: String::new(),
        }
    }

    fn failed(stderr: &str) -> io::Result<CommandOutput> {
        Ok(CommandOutput {
            success: false,
            stderr: stderr.to_string(),
        })
    }

    fn dispatcher(runner: Arc<ScriptedRunner>) -> Dispatcher {
        Dispatcher::new(&AppSettings::default(), Path::new("/opt/themes"), runner)
    }

    const THEME: &str = "/opt/themes/pack_sample/my_theme";

    #[test]
    fn install_copies_into_system_dir() {
        let runner = ScriptedRunner::with(vec![]);
        let notice = dispatcher(runner.clone())
            .install(Path::new(THEME), "my_theme")
            .unwrap();
        assert_eq!(notice.body, "Theme 'my_theme' installed successfully!");
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].to_string(),
            format!("pkexec cp -r {THEME} /usr/share/plymouth/themes/")
        );
    }

    #[test]
    fn install_failure_reports_stderr() {
        let runner = ScriptedRunner::with(vec![failed("Permission denied")]);
        let err = dispatcher(runner.clone())
            .install(Path::new(THEME), "my_theme")
            .unwrap_err();
        assert_eq!(err.detail(), "Permission denied");
        assert_eq!(err.to_string(), "Failed to install theme:\nPermission denied");
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn apply_runs_copy_then_set_default() {
        let runner = ScriptedRunner::with(vec![]);
        let notice = dispatcher(runner.clone())
            .apply(Path::new(THEME), "my_theme")
            .unwrap();
        assert!(notice.body.contains("next boot"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args[0], "cp");
        assert_eq!(
            calls[1].to_string(),
            "pkexec plymouth-set-default-theme -R my_theme"
        );
    }

    #[test]
    fn apply_stops_after_failed_copy() {
        let runner = ScriptedRunner::with(vec![failed("cp: cannot create directory")]);
        let err = dispatcher(runner.clone())
            .apply(Path::new(THEME), "my_theme")
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::Copy {
                detail: "cp: cannot create directory".into()
            }
        );
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn apply_reports_set_default_failure() {
        let runner = ScriptedRunner::with(vec![Ok(ok()), failed("update-initramfs failed")]);
        let err = dispatcher(runner.clone())
            .apply(Path::new(THEME), "my_theme")
            .unwrap_err();
        assert!(matches!(err, ActionError::SetDefault { .. }));
        assert!(err.to_string().starts_with("Failed to apply theme:"));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn launch_errors_are_reported_like_failures() {
        let runner = ScriptedRunner::with(vec![Err(io::Error::new(
            io::ErrorKind::NotFound,
            "pkexec not found",
        ))]);
        let err = dispatcher(runner)
            .install(Path::new(THEME), "my_theme")
            .unwrap_err();
        assert_eq!(err.detail(), "pkexec not found");
    }

    #[test]
    fn preview_only_describes_commands() {
        let runner = ScriptedRunner::with(vec![]);
        let notice = dispatcher(runner.clone()).preview_instructions(Path::new(THEME), "my_theme");
        assert!(notice.body.contains(&format!(
            "sudo cp -r {THEME} /usr/share/plymouth/themes/ && \
             sudo plymouth-set-default-theme my_theme && \
             sudo /opt/themes/showplymouth.sh 10"
        )));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn confirmations_list_the_commands() {
        let dispatcher = dispatcher(ScriptedRunner::with(vec![]));
        let install = dispatcher.confirmation(&PendingAction::new(ActionKind::Install, Path::new(THEME)));
        assert_eq!(install.title, "Install 'my_theme'?");
        assert!(install.body.contains("/usr/share/plymouth/themes/my_theme"));

        let apply = dispatcher.confirmation(&PendingAction::new(ActionKind::Apply, Path::new(THEME)));
        assert_eq!(apply.title, "Apply 'my_theme' as default?");
        assert!(apply.body.contains("sudo plymouth-set-default-theme -R my_theme"));
    }

    #[test]
    fn system_runner_reports_missing_programs() {
        let err = SystemRunner
            .run("plymouth-toolkit-no-such-program", &[])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stderr_verbatim() {
        let args = ["-c".to_string(), "echo Permission denied >&2; exit 1".to_string()];
        let output = SystemRunner.run("sh", &args).unwrap();
        assert!(!output.success);
        assert_eq!(output.stderr, "Permission denied\n");

        let output = SystemRunner.run("sh", &["-c".to_string(), "true".to_string()]).unwrap();
        assert_eq!(output, ok());
    }

    #[test]
    fn missing_launcher_fails_install_with_launch_error() {
        let settings = AppSettings {
            privilege_launcher: "plymouth-toolkit-no-such-launcher".into(),
            ..AppSettings::default()
        };
        let dispatcher = Dispatcher::new(&settings, Path::new("/opt/themes"), Arc::new(SystemRunner));
        let err = dispatcher.install(Path::new(THEME), "my_theme").unwrap_err();
        assert!(matches!(err, ActionError::Install { .. }));
        assert!(err.detail().contains("os error"), "unexpected detail: {}", err.detail());
    }
}
