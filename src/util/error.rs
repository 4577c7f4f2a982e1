// Nexus Shell - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. Every error is caught where it
// originates and logged; nothing here is allowed to crash the shell.

use std::fmt;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Supervisor errors
// ---------------------------------------------------------------------------

/// Errors raised while locating, launching, or signalling the backend.
#[derive(Debug)]
pub enum SupervisorError {
    /// None of the candidate paths exists. Terminal for this launch attempt.
    BinaryNotFound { candidates: Vec<PathBuf> },

    /// Process creation failed (permission denied, bad format, ...).
    /// No handle is held afterwards and no restart is scheduled.
    SpawnFailed { path: PathBuf, source: io::Error },

    /// The termination signal could not be delivered.
    Signal { pid: u32, source: io::Error },

    /// Restarts stopped because the configured cap was reached.
    RestartLimitReached { restarts: u32 },

    /// A launch was requested after the supervisor was shut down.
    ShutDown,
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinaryNotFound { candidates } => {
                let list: Vec<String> = candidates
                    .iter()
                    .map(|p| format!("'{}'", p.display()))
                    .collect();
                write!(
                    f,
                    "Backend executable not found at any expected location: {}",
                    if list.is_empty() {
                        "(no candidates)".to_string()
                    } else {
                        list.join(", ")
                    }
                )
            }
            Self::SpawnFailed { path, source } => {
                write!(f, "Failed to launch '{}': {source}", path.display())
            }
            Self::Signal { pid, source } => {
                write!(f, "Failed to signal backend process {pid}: {source}")
            }
            Self::RestartLimitReached { restarts } => write!(
                f,
                "Backend crashed after {restarts} consecutive restart(s); giving up. \
                 Raise [backend] max_restarts or remove it for unbounded restarts."
            ),
            Self::ShutDown => write!(f, "Supervisor is shut down; backend not launched"),
        }
    }
}

impl std::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SpawnFailed { source, .. } => Some(source),
            Self::Signal { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Document errors
// ---------------------------------------------------------------------------

/// Errors related to loading the displayed document.
#[derive(Debug)]
pub enum DocumentError {
    /// The document path does not exist.
    NotFound { path: PathBuf },

    /// The document exceeds the maximum size the window will display.
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// I/O error while reading the document.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Document '{}' does not exist", path.display())
            }
            Self::TooLarge { path, size, max } => write!(
                f,
                "Document '{}' is {size} bytes, exceeds maximum of {max} bytes",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "Cannot read document '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Problems found while loading `config.toml`.
///
/// None of these is fatal: each is reported as a startup warning and the
/// affected setting keeps its default.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed; every setting uses its default.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is invalid or out of the allowed range.
    ValueOutOfRange {
        /// `[section] key`.
        field: String,
        value: String,
        expected: String,
        /// What is used instead.
        fallback: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => write!(
                f,
                "Failed to parse config file '{}': {source}. Using defaults.",
                path.display()
            ),
            Self::ValueOutOfRange {
                field,
                value,
                expected,
                fallback,
            } => write!(
                f,
                "{field} = {value} is out of range (expected {expected}). Using {fallback}."
            ),
            Self::Io { path, source } => write!(
                f,
                "Could not read config file '{}': {source}. Using defaults.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
