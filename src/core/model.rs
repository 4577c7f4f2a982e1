// Nexus Shell - core/model.rs
//
// Core data types shared across all layers.
// These types are the "lingua franca" of the application: the supervisor
// produces them, the background process threads send them, the UI renders them.

use chrono::{DateTime, Local};
use std::fmt;
use std::time::{Duration, Instant};

/// Whether the shell is running from a development checkout or an installed
/// package. Selects which candidate backend locations are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Development,
    Packaged,
}

impl LaunchMode {
    /// Debug builds are treated as development runs, release builds as packaged.
    pub fn detect() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Packaged
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Packaged => write!(f, "packaged"),
        }
    }
}

/// The child stream a chunk of output was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// How a backend process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, or `None` when the process was ended by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    /// Only a clean zero exit counts as normal. A process killed by a signal
    /// has no code and is treated as a crash.
    pub fn is_normal(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "code {code}"),
            None => write!(f, "no exit code (terminated by signal)"),
        }
    }
}

/// Messages sent from the per-child background threads to the supervisor.
///
/// `launch` is the generation number of the child that produced the event,
/// so late events from a previous child can be recognised and dropped.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// A chunk of output, verbatim minus the trailing line terminator.
    Output {
        launch: u64,
        stream: OutputStream,
        text: String,
    },
    /// The child exited. Sent after both output streams reached EOF.
    Exited { launch: u64, outcome: ExitOutcome },
    /// Waiting on the child failed; its fate is unknown.
    WaitFailed { launch: u64, message: String },
}

impl ProcessEvent {
    pub fn launch(&self) -> u64 {
        match self {
            Self::Output { launch, .. }
            | Self::Exited { launch, .. }
            | Self::WaitFailed { launch, .. } => *launch,
        }
    }
}

/// Supervisor lifecycle.
///
/// ```text
/// Idle -> Running -> (exit 0) -> Stopped
///                 -> (exit != 0) -> PendingRestart -> (delay) -> Idle
///                 -> (quit) -> Terminating -> Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running { pid: u32 },
    PendingRestart { due: Instant },
    Terminating { pid: u32 },
    Stopped,
}

impl SupervisorState {
    /// Short human-readable label for the status bar.
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "Backend idle".to_string(),
            Self::Running { pid } => format!("Backend running (PID {pid})"),
            Self::PendingRestart { due } => {
                let secs = due.saturating_duration_since(Instant::now()).as_secs_f32();
                format!("Backend crashed; restarting in {secs:.1}s")
            }
            Self::Terminating { pid } => format!("Stopping backend (PID {pid})"),
            Self::Stopped => "Backend stopped".to_string(),
        }
    }
}

/// When and how often a crashed backend is relaunched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Fixed delay between an abnormal exit and the relaunch.
    pub delay: Duration,
    /// Maximum consecutive restarts; `None` restarts forever. A child that
    /// stays up for `STABLE_RUN_MS` resets the count.
    pub max_restarts: Option<u32>,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(crate::util::constants::DEFAULT_RESTART_DELAY_MS),
            max_restarts: None,
        }
    }
}

impl RestartPolicy {
    /// Whether another restart is allowed after `restarts` have already run.
    pub fn allows(&self, restarts: u32) -> bool {
        self.max_restarts.map_or(true, |max| restarts < max)
    }
}

/// One forwarded backend output chunk, as kept for the console pane.
#[derive(Debug, Clone)]
pub struct ConsoleLine {
    pub timestamp: DateTime<Local>,
    pub stream: OutputStream,
    pub text: String,
}
