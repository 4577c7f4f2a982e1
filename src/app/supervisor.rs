// Nexus Shell - app/supervisor.rs
//
// Backend supervision: locate, launch, forward output, restart on crash,
// terminate on quit.
//
// Architecture:
//   - `Supervisor` lives on the UI thread and owns the only backend handle.
//     It is constructed once in `main`, started before the window opens,
//     and polled every frame by the eframe app.
//   - Background threads (see app::process) never touch supervisor state;
//     they only send `ProcessEvent`s over the channel drained by `poll`.
//   - The restart timer is a deadline stored in `SupervisorState::PendingRestart`
//     and checked by `poll`; nothing blocks while it is pending.
//
// Failure policy: every failure is logged here, at its origin, and never
// propagated far enough to stop the shell.
//   - Binary not found: one error log, state Stopped, no retry.
//   - Spawn failure: one error log, state Stopped, no retry. Only a child
//     that ran and then crashed schedules a restart.
//   - Non-zero exit (or death by signal): restart after `RestartPolicy::delay`,
//     indefinitely unless `max_restarts` is set. The cap counts consecutive
//     restarts: a child that ran for STABLE_RUN_MS resets the count.
//   - Zero exit: Stopped.
//   - Shutdown: one termination signal; a pending restart is cancelled.

use crate::app::process::{self, BackendProcess};
use crate::core::locate;
use crate::core::model::{
    ConsoleLine, ExitOutcome, OutputStream, ProcessEvent, RestartPolicy, SupervisorState,
};
use crate::util::constants::{BACKEND_LOG_TARGET, MAX_PROCESS_EVENTS_PER_FRAME, STABLE_RUN_MS};
use crate::util::error::SupervisorError;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Everything the supervisor needs to know, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Ordered backend locations; the first existing one is launched.
    pub candidates: Vec<PathBuf>,
    /// Restart delay and cap.
    pub restart: RestartPolicy,
    /// How long `shutdown` waits for the child before killing it.
    /// Zero sends the termination signal and returns immediately.
    pub shutdown_grace: Duration,
}

/// Owns and supervises the backend process.
pub struct Supervisor {
    config: SupervisorConfig,
    state: SupervisorState,
    process: Option<BackendProcess>,
    /// Successful launches so far; also the generation of the current child.
    launches: u64,
    /// Consecutive restarts since the last stable run.
    restarts: u32,
    /// Set once `shutdown` has run; no launches happen afterwards.
    shut_down: bool,
    /// Most recent failure, for the status bar.
    last_error: Option<String>,
    events_tx: mpsc::Sender<ProcessEvent>,
    events_rx: mpsc::Receiver<ProcessEvent>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            config,
            state: SupervisorState::Idle,
            process: None,
            launches: 0,
            restarts: 0,
            shut_down: false,
            last_error: None,
            events_tx,
            events_rx,
        }
    }

    /// Locate and launch the backend. Returns the child's PID.
    ///
    /// Failures are logged here; callers only need the result to decide
    /// what to show, never to log again.
    pub fn start(&mut self) -> Result<u32, SupervisorError> {
        if let Some(ref p) = self.process {
            tracing::debug!(pid = p.pid, "Backend already running");
            return Ok(p.pid);
        }
        if self.shut_down {
            tracing::debug!("Supervisor shut down; not launching backend");
            return Err(SupervisorError::ShutDown);
        }

        let Some(path) = locate::first_existing(&self.config.candidates).map(Path::to_path_buf)
        else {
            let err = SupervisorError::BinaryNotFound {
                candidates: self.config.candidates.clone(),
            };
            tracing::error!(error = %err, "Backend launch aborted");
            return Err(self.fail(err));
        };

        tracing::info!(path = %path.display(), "Launching backend");

        let launch = self.launches + 1;
        match process::spawn_backend(&path, launch, self.events_tx.clone()) {
            Ok(child) => {
                let pid = child.pid;
                tracing::info!(pid, launch, "Backend started");
                self.launches = launch;
                self.process = Some(child);
                self.state = SupervisorState::Running { pid };
                Ok(pid)
            }
            Err(err) => {
                tracing::error!(error = %err, "Backend execution failed");
                Err(self.fail(err))
            }
        }
    }

    /// Drain pending process events and fire a due restart.
    ///
    /// Returns the output chunks received since the last poll so the UI can
    /// show them; they have already been logged.
    pub fn poll(&mut self) -> Vec<ConsoleLine> {
        self.poll_at(Instant::now())
    }

    /// [`poll`](Self::poll) with an explicit clock reading.
    pub fn poll_at(&mut self, now: Instant) -> Vec<ConsoleLine> {
        let mut lines = Vec::new();

        let events: Vec<ProcessEvent> = self
            .events_rx
            .try_iter()
            .take(MAX_PROCESS_EVENTS_PER_FRAME)
            .collect();

        for event in events {
            let current = self.is_current(event.launch());
            match event {
                ProcessEvent::Output { stream, text, .. } => {
                    forward_to_log(stream, &text);
                    lines.push(ConsoleLine {
                        timestamp: chrono::Local::now(),
                        stream,
                        text,
                    });
                }
                ProcessEvent::Exited { outcome, .. } if current => {
                    self.on_child_exit(outcome, now);
                }
                ProcessEvent::Exited { launch, .. } => {
                    tracing::debug!(launch, "Ignoring exit of a previous backend");
                }
                ProcessEvent::WaitFailed { message, .. } if current => {
                    // Fate unknown: drop the handle and do not guess at a restart.
                    self.process = None;
                    self.state = SupervisorState::Stopped;
                    self.last_error = Some(format!("Lost track of backend: {message}"));
                }
                ProcessEvent::WaitFailed { .. } => {}
            }
        }

        if let SupervisorState::PendingRestart { due } = self.state {
            if now >= due {
                self.state = SupervisorState::Idle;
                self.restarts += 1;
                tracing::info!(restart = self.restarts, "Restarting backend");
                // Failures are logged inside start().
                let _ = self.start();
            }
        }

        lines
    }

    /// React to the current child's exit.
    fn on_child_exit(&mut self, outcome: ExitOutcome, now: Instant) {
        let uptime = self
            .process
            .take()
            .map(|p| now.saturating_duration_since(p.started))
            .unwrap_or_default();
        tracing::info!(
            exit = %outcome,
            uptime_ms = uptime.as_millis() as u64,
            "Backend process exited"
        );

        if self.restarts > 0 && uptime >= Duration::from_millis(STABLE_RUN_MS) {
            tracing::debug!(restarts = self.restarts, "Backend ran stably; restart count reset");
            self.restarts = 0;
        }

        let current = self.state;
        self.state = match current {
            SupervisorState::Terminating { .. } => SupervisorState::Stopped,
            _ if self.shut_down => SupervisorState::Stopped,
            _ if outcome.is_normal() => SupervisorState::Stopped,
            _ if self.config.restart.allows(self.restarts) => {
                let delay = self.config.restart.delay;
                tracing::warn!(
                    exit = %outcome,
                    delay_ms = delay.as_millis() as u64,
                    "Backend crashed; scheduling restart"
                );
                self.last_error = Some(format!("Backend crashed ({outcome})"));
                SupervisorState::PendingRestart { due: now + delay }
            }
            _ => {
                let err = SupervisorError::RestartLimitReached {
                    restarts: self.restarts,
                };
                tracing::error!(error = %err, "Backend not restarted");
                self.fail(err);
                SupervisorState::Stopped
            }
        };
    }

    /// Stop supervising: cancel a pending restart and signal the child once.
    ///
    /// With a zero grace period this returns as soon as the signal is sent.
    /// Otherwise it waits up to the grace period for the child to exit and
    /// kills it on timeout. Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        match self.state {
            SupervisorState::PendingRestart { .. } => {
                tracing::info!("Cancelled pending backend restart");
                self.state = SupervisorState::Stopped;
            }
            SupervisorState::Idle => self.state = SupervisorState::Stopped,
            _ => {}
        }

        let Some(ref child) = self.process else {
            return;
        };

        match child.terminate() {
            Ok(true) => tracing::info!(pid = child.pid, "Terminating backend..."),
            // Reaped already; the exit event is waiting on inherited pipes.
            Ok(false) => tracing::info!(pid = child.pid, "Backend already exited; no signal sent"),
            Err(e) => tracing::error!(error = %e, "Backend termination signal failed"),
        }
        self.state = SupervisorState::Terminating { pid: child.pid };

        let grace = self.config.shutdown_grace;
        if grace.is_zero() {
            return;
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if child.has_exited() {
                tracing::info!(pid = child.pid, "Backend stopped");
                self.process = None;
                self.state = SupervisorState::Stopped;
                return;
            }
            std::thread::sleep(Duration::from_millis(
                crate::util::constants::EXIT_POLL_INTERVAL_MS.min(grace.as_millis() as u64),
            ));
        }

        tracing::warn!(
            pid = child.pid,
            grace_ms = grace.as_millis() as u64,
            "Backend did not exit in time; killing"
        );
        if let Err(e) = child.force_kill() {
            tracing::error!(error = %e, "Backend kill failed");
        }
        self.process = None;
        self.state = SupervisorState::Stopped;
    }

    fn is_current(&self, launch: u64) -> bool {
        self.process.as_ref().is_some_and(|p| p.launch == launch)
    }

    /// Record a terminal failure for this launch attempt.
    fn fail(&mut self, err: SupervisorError) -> SupervisorError {
        self.last_error = Some(err.to_string());
        self.state = SupervisorState::Stopped;
        err
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// PID of the tracked child, if one is held.
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|p| p.pid)
    }

    /// Executable of the tracked child, if one is held.
    pub fn backend_path(&self) -> Option<&Path> {
        self.process.as_ref().map(|p| p.path.as_path())
    }

    /// Number of successful launches, including restarts.
    pub fn launch_count(&self) -> u64 {
        self.launches
    }

    /// When a pending restart is due, if one is scheduled.
    pub fn restart_due(&self) -> Option<Instant> {
        match self.state {
            SupervisorState::PendingRestart { due } => Some(due),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the supervisor still expects events or has a timer pending,
    /// i.e. whether the UI should keep polling without user input.
    pub fn is_active(&self) -> bool {
        !matches!(
            self.state,
            SupervisorState::Stopped | SupervisorState::Idle
        )
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Log a backend output chunk verbatim: stdout at INFO, stderr at ERROR.
fn forward_to_log(stream: OutputStream, text: &str) {
    match stream {
        OutputStream::Stdout => tracing::info!(target: BACKEND_LOG_TARGET, "Backend Log: {text}"),
        OutputStream::Stderr => {
            tracing::error!(target: BACKEND_LOG_TARGET, "Backend Error: {text}")
        }
    }
}
