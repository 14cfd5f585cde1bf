use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::oneshot;

use super::{TaskErrorKind, TaskOutcome};

/// Temporizador del paso. Arranca al entrar en `run`; sólo cuenta si el paso
/// lo detiene antes de reportar éxito.
#[derive(Debug, Clone, Copy)]
pub struct TaskTimer {
    started: Instant,
    stopped: Option<Duration>,
}

impl TaskTimer {
    pub fn start() -> Self {
        Self { started: Instant::now(),
               stopped: None }
    }

    pub fn stop(&mut self) {
        if self.stopped.is_none() {
            self.stopped = Some(self.started.elapsed());
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.stopped
    }
}

/// Canal de un solo uso por el que un paso emite su resultado.
#[derive(Debug)]
pub struct TaskReporter {
    step_id: String,
    sender: oneshot::Sender<TaskOutcome>,
    timer: TaskTimer,
}

impl TaskReporter {
    /// Crea el reporter y el receptor que conserva el runner.
    pub fn channel(step_id: impl Into<String>) -> (Self, oneshot::Receiver<TaskOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { step_id: step_id.into(),
                sender,
                timer: TaskTimer::start() },
         receiver)
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    pub fn success(self) {
        self.send_success(None);
    }

    /// Éxito publicando un archivo para los pasos siguientes.
    pub fn success_with_package(self, location: PathBuf) {
        self.send_success(Some(location));
    }

    pub fn error(self, kind: TaskErrorKind) {
        self.send(TaskOutcome::Error { kind, message: None });
    }

    pub fn error_with_message(self, kind: TaskErrorKind, message: impl Into<String>) {
        self.send(TaskOutcome::Error { kind,
                                       message: Some(message.into()) });
    }

    fn send_success(self, package_location: Option<PathBuf>) {
        let elapsed = self.timer.elapsed();
        self.send(TaskOutcome::Success { package_location, elapsed });
    }

    fn send(self, outcome: TaskOutcome) {
        if self.sender.send(outcome).is_err() {
            debug!("{}: outcome dropped, runner no longer listening", self.step_id);
        }
    }
}
