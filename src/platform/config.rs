// Nexus Shell - platform/config.rs
//
// Platform-specific configuration, directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::RestartPolicy;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for Nexus Shell configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/nexusshell/ or %APPDATA%\NexusShell\config\)
    pub config_dir: PathBuf,

    /// False when the platform directories could not be determined and the
    /// current directory is used instead.
    pub from_platform: bool,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    /// Does not log: this runs before logging is initialised, so the caller
    /// reports the outcome afterwards.
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => Self {
                config_dir: proj_dirs.config_dir().to_path_buf(),
                from_platform: true,
            },
            None => Self {
                config_dir: PathBuf::from("."),
                from_platform: false,
            },
        }
    }

    /// Full path of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[backend]` section.
    pub backend: BackendSection,
    /// `[window]` section.
    pub window: WindowSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[backend]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Backend executable stem.
    pub name: Option<String>,
    /// Extra candidate paths, checked before the built-in locations.
    pub candidates: Option<Vec<String>>,
    /// Delay before relaunching a crashed backend (ms).
    pub restart_delay_ms: Option<u64>,
    /// Maximum consecutive restarts (absent = unbounded). A run of one
    /// minute or more resets the count.
    pub max_restarts: Option<u32>,
    /// How long to wait for the backend to exit on quit (ms, 0 = don't wait).
    pub shutdown_grace_ms: Option<u64>,
}

/// `[window]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct WindowSection {
    /// Initial inner width in points.
    pub width: Option<f32>,
    /// Initial inner height in points.
    pub height: Option<f32>,
    /// Document to display.
    pub document: Option<String>,
    /// Whether the backend console pane starts expanded.
    pub console_visible: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Backend --
    /// Backend executable stem.
    pub backend_name: String,
    /// Extra candidate paths from config, in file order.
    pub extra_candidates: Vec<PathBuf>,
    /// Restart delay and cap.
    pub restart: RestartPolicy,
    /// Shutdown grace period; zero means fire-and-forget.
    pub shutdown_grace: Duration,

    // -- Window --
    /// Initial inner size in points.
    pub window_size: [f32; 2],
    /// Document override.
    pub document: Option<PathBuf>,
    /// Console pane expanded at startup.
    pub console_visible: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_name: constants::DEFAULT_BACKEND_NAME.to_string(),
            extra_candidates: Vec::new(),
            restart: RestartPolicy::default(),
            shutdown_grace: Duration::from_millis(constants::DEFAULT_SHUTDOWN_GRACE_MS),
            window_size: [
                constants::DEFAULT_WINDOW_WIDTH,
                constants::DEFAULT_WINDOW_HEIGHT,
            ],
            document: None,
            console_visible: true,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and every non-fatal problem
/// found. If the file does not exist, returns defaults with no problems
/// (first run). If the file is unreadable or unparseable, returns defaults
/// and one error: the application still starts but the user is informed.
///
/// This runs before logging is initialised (the log level comes from here),
/// so callers should log the returned problems once tracing is up.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path,
                source,
            };
            return (AppConfig::default(), vec![err]);
        }
    };

    match toml::from_str::<RawConfig>(&content) {
        Ok(raw) => validate(raw),
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path,
                source,
            };
            (AppConfig::default(), vec![err])
        }
    }
}

fn out_of_range(
    field: &str,
    value: impl std::fmt::Display,
    expected: impl std::fmt::Display,
    fallback: impl std::fmt::Display,
) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
        fallback: fallback.to_string(),
    }
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut problems: Vec<ConfigError> = Vec::new();

    // -- Backend: name --
    if let Some(name) = raw.backend.name {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
            problems.push(out_of_range(
                "[backend] name",
                format!("{name:?}"),
                "a bare file name",
                format!("default ({})", constants::DEFAULT_BACKEND_NAME),
            ));
        } else {
            config.backend_name = trimmed.to_string();
        }
    }

    // -- Backend: candidates --
    if let Some(candidates) = raw.backend.candidates {
        if candidates.len() > constants::MAX_CONFIG_CANDIDATES {
            problems.push(out_of_range(
                "[backend] candidates",
                format!("{} entries", candidates.len()),
                format!("at most {}", constants::MAX_CONFIG_CANDIDATES),
                format!("the first {}", constants::MAX_CONFIG_CANDIDATES),
            ));
        }
        config.extra_candidates = candidates
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .take(constants::MAX_CONFIG_CANDIDATES)
            .map(PathBuf::from)
            .collect();
    }

    // -- Backend: restart_delay_ms --
    if let Some(ms) = raw.backend.restart_delay_ms {
        if (constants::MIN_RESTART_DELAY_MS..=constants::MAX_RESTART_DELAY_MS).contains(&ms) {
            config.restart.delay = Duration::from_millis(ms);
        } else {
            problems.push(out_of_range(
                "[backend] restart_delay_ms",
                ms,
                format!(
                    "{}-{}",
                    constants::MIN_RESTART_DELAY_MS,
                    constants::MAX_RESTART_DELAY_MS
                ),
                format!("default ({})", constants::DEFAULT_RESTART_DELAY_MS),
            ));
        }
    }

    // -- Backend: max_restarts --
    if let Some(max) = raw.backend.max_restarts {
        if (1..=constants::ABSOLUTE_MAX_RESTARTS).contains(&max) {
            config.restart.max_restarts = Some(max);
        } else {
            problems.push(out_of_range(
                "[backend] max_restarts",
                max,
                format!(
                    "1-{}; remove the key for unbounded restarts",
                    constants::ABSOLUTE_MAX_RESTARTS
                ),
                "default (unbounded)",
            ));
        }
    }

    // -- Backend: shutdown_grace_ms --
    if let Some(ms) = raw.backend.shutdown_grace_ms {
        if ms <= constants::MAX_SHUTDOWN_GRACE_MS {
            config.shutdown_grace = Duration::from_millis(ms);
        } else {
            problems.push(out_of_range(
                "[backend] shutdown_grace_ms",
                ms,
                format!("0-{}", constants::MAX_SHUTDOWN_GRACE_MS),
                format!("default ({})", constants::DEFAULT_SHUTDOWN_GRACE_MS),
            ));
        }
    }

    // -- Window: width / height --
    // The lower bound is the enforced minimum window size.
    for (idx, field, value, min, default) in [
        (
            0,
            "[window] width",
            raw.window.width,
            constants::MIN_WINDOW_SIZE[0],
            constants::DEFAULT_WINDOW_WIDTH,
        ),
        (
            1,
            "[window] height",
            raw.window.height,
            constants::MIN_WINDOW_SIZE[1],
            constants::DEFAULT_WINDOW_HEIGHT,
        ),
    ] {
        let Some(v) = value else { continue };
        if (min..=constants::MAX_WINDOW_DIMENSION).contains(&v) {
            config.window_size[idx] = v;
        } else {
            problems.push(out_of_range(
                field,
                v,
                format!("{min}-{}", constants::MAX_WINDOW_DIMENSION),
                format!("default ({default})"),
            ));
        }
    }

    // -- Window: document --
    if let Some(doc) = raw.window.document {
        if !doc.trim().is_empty() {
            config.document = Some(PathBuf::from(doc));
        }
    }

    // -- Window: console_visible --
    if let Some(visible) = raw.window.console_visible {
        config.console_visible = visible;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            problems.push(out_of_range(
                "[logging] level",
                format!("{level:?}"),
                "error, warn, info, debug or trace",
                "default (info)",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, problems)
}
