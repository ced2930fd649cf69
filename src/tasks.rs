//! Background worker running one confirmed privileged action.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::dispatcher::{ActionError, Dispatcher, Notice, PendingAction};

/// Final result of a worker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub action: PendingAction,
    pub result: Result<Notice, ActionError>,
}

/// Handle to a running action; the UI polls it once per frame.
#[derive(Debug)]
pub struct ActionTask {
    action: PendingAction,
    event_rx: Receiver<ActionEvent>,
    join: Option<thread::JoinHandle<()>>,
}

impl ActionTask {
    /// Spawn a worker that executes `action` with `dispatcher`.
    pub fn spawn(dispatcher: Dispatcher, action: PendingAction) -> Self {
        let (evt_tx, evt_rx) = mpsc::channel();
        let job = action.clone();
        let handle = thread::spawn(move || {
            let result = dispatcher.execute(&job);
            let _ = evt_tx.send(ActionEvent {
                action: job,
                result,
            });
        });
        Self {
            action,
            event_rx: evt_rx,
            join: Some(handle),
        }
    }

    pub fn action(&self) -> &PendingAction {
        &self.action
    }

    /// Non-blocking check for the outcome; joins the worker once it reported.
    pub fn try_finish(&mut self) -> Option<ActionEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => {
                self.join_worker();
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join_worker();
                Some(ActionEvent {
                    action: self.action.clone(),
                    result: Err(ActionError::Interrupted {
                        detail: "worker exited without a result".into(),
                    }),
                })
            }
        }
    }

    /// Block until the worker reports.
    pub fn wait(mut self) -> Option<ActionEvent> {
        let event = self.event_rx.recv().ok();
        self.join_worker();
        event
    }

    fn join_worker(&mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::error!("action worker panicked");
            }
        }
    }
}

impl Drop for ActionTask {
    fn drop(&mut self) {
        self.join_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{ActionKind, CommandOutput, CommandRunner};
    use crate::settings::AppSettings;
    use std::io;
    use std::path::Path;
    use std::sync::Arc;

    struct FailingRunner;

    impl CommandRunner for FailingRunner {
        fn run(&self, _program: &str, _args: &[String]) -> io::Result<CommandOutput> {
            Ok(CommandOutput {
                success: false,
                stderr: "Permission denied".into(),
            })
        }
    }

    #[test]
    fn worker_reports_the_outcome() {
        let dispatcher = Dispatcher::new(
            &AppSettings::default(),
            Path::new("/opt/themes"),
            Arc::new(FailingRunner),
        );
        let action = PendingAction::new(ActionKind::Apply, Path::new("/opt/themes/pack_a/glow"));
        let task = ActionTask::spawn(dispatcher, action.clone());
        assert_eq!(task.action(), &action);

        let event = task.wait().unwrap();
        assert_eq!(event.action, action);
        assert_eq!(
            event.result,
            Err(ActionError::Copy {
                detail: "Permission denied".into()
            })
        );
    }
}
