// Nexus Shell - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Config values are validated against the MIN/MAX pairs defined here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Nexus Shell";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "NexusShell";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Backend location
// =============================================================================

/// Default backend executable stem. The platform executable suffix
/// (`.exe` on Windows) is appended when candidate paths are composed.
pub const DEFAULT_BACKEND_NAME: &str = "nexus_backend";

/// Directory holding the backend build in a development checkout, a sibling
/// of the application directory (`../backend/dist/<name>/<binary>`).
pub const DEV_BACKEND_DIST_DIR: &str = "dist";

/// Directory name the backend is bundled under, in both layouts.
pub const BACKEND_DIR_NAME: &str = "backend";

/// Resources directory next to the packaged executable.
pub const RESOURCES_DIR_NAME: &str = "resources";

/// Unpacked-archive directory inside `resources/` used by archive-based
/// installers for files that must stay executable.
pub const UNPACKED_DIR_NAME: &str = "app.asar.unpacked";

/// Maximum number of extra candidate paths accepted from config.toml.
pub const MAX_CONFIG_CANDIDATES: usize = 16;

// =============================================================================
// Supervision
// =============================================================================

/// Delay between an abnormal backend exit and the relaunch (ms).
pub const DEFAULT_RESTART_DELAY_MS: u64 = 5_000;

/// Minimum user-configurable restart delay (ms).
pub const MIN_RESTART_DELAY_MS: u64 = 100;

/// Maximum user-configurable restart delay (ms).
pub const MAX_RESTART_DELAY_MS: u64 = 600_000; // 10 min

/// Hard upper bound on a configured restart cap. Unset means unbounded.
pub const ABSOLUTE_MAX_RESTARTS: u32 = 10_000;

/// How often the waiter thread checks whether the child has exited (ms).
pub const EXIT_POLL_INTERVAL_MS: u64 = 100;

/// A backend that ran at least this long before crashing resets the
/// consecutive-restart count, so `max_restarts` only stops a crash loop.
pub const STABLE_RUN_MS: u64 = 60_000;

/// Default shutdown grace period (ms). Zero sends the termination signal
/// and returns immediately without waiting for the child.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 0;

/// Maximum user-configurable shutdown grace period (ms).
pub const MAX_SHUTDOWN_GRACE_MS: u64 = 30_000;

/// Maximum bytes of a single forwarded output chunk. Longer lines are
/// split so a child that never writes a newline cannot grow memory unbounded.
pub const MAX_OUTPUT_CHUNK_BYTES: usize = 64 * 1024; // 64 KiB

/// Maximum process events drained from the channel per UI frame.
pub const MAX_PROCESS_EVENTS_PER_FRAME: usize = 500;

// =============================================================================
// Window host
// =============================================================================

/// Default window inner width in logical points.
pub const DEFAULT_WINDOW_WIDTH: f32 = 1200.0;

/// Default window inner height in logical points.
pub const DEFAULT_WINDOW_HEIGHT: f32 = 800.0;

/// Largest accepted window dimension.
pub const MAX_WINDOW_DIMENSION: f32 = 8_192.0;

/// Minimum window inner size enforced by the viewport; also the smallest
/// size config.toml may request.
pub const MIN_WINDOW_SIZE: [f32; 2] = [640.0, 400.0];

/// Default document shown in the window, resolved next to the executable.
pub const DEFAULT_DOCUMENT_NAME: &str = "index.html";

/// Documents larger than this are refused rather than loaded into the UI.
pub const MAX_DOCUMENT_BYTES: u64 = 8 * 1024 * 1024; // 8 MiB

/// Number of backend console lines kept for the console pane.
pub const MAX_CONSOLE_LINES: usize = 2_000;

/// Repaint interval while the supervisor has pending work (ms).
pub const SUPERVISOR_REPAINT_INTERVAL_MS: u64 = 250;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Tracing target used for forwarded backend output.
pub const BACKEND_LOG_TARGET: &str = "backend";

// =============================================================================
// File names
// =============================================================================

/// Configuration file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
