// Nexus Shell - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Backend candidate resolution and supervisor start
// 4. eframe window launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use nexus_shell::app;
pub use nexus_shell::core;
pub use nexus_shell::platform;
pub use nexus_shell::ui;
pub use nexus_shell::util;

use clap::Parser;
use std::path::PathBuf;

/// Compile-time-embedded icon PNG bytes.
///
/// Using `include_bytes!` ensures the asset is baked into the binary so the
/// icon is always available regardless of the working directory at runtime.
static ICON_PNG: &[u8] = include_bytes!("../assets/icon.png");

/// Decode the embedded PNG and return an `eframe`-compatible `IconData`.
///
/// Falls back to a transparent 1x1 placeholder if decoding fails so the
/// application always launches rather than panicking on a bad asset.
fn load_icon() -> egui::IconData {
    use image::ImageDecoder;

    match image::codecs::png::PngDecoder::new(std::io::Cursor::new(ICON_PNG)) {
        Ok(decoder) => {
            let (w, h) = decoder.dimensions();
            match image::DynamicImage::from_decoder(decoder) {
                Ok(img) => egui::IconData {
                    rgba: img.into_rgba8().into_raw(),
                    width: w,
                    height: h,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to decode icon PNG; using placeholder");
                    placeholder_icon()
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open icon PNG decoder; using placeholder");
            placeholder_icon()
        }
    }
}

/// 1x1 transparent RGBA icon used when the real icon cannot be loaded.
fn placeholder_icon() -> egui::IconData {
    egui::IconData {
        rgba: vec![0u8; 4],
        width: 1,
        height: 1,
    }
}

/// Nexus Shell - desktop host for a bundled backend.
///
/// Launches the backend executable, keeps it running, and shows the local
/// document in a single window.
#[derive(Parser, Debug)]
#[command(name = "Nexus Shell", version, about)]
struct Cli {
    /// Document to display (defaults to index.html beside the executable).
    document: Option<PathBuf>,

    /// Backend executable to try before the built-in locations.
    #[arg(short = 'b', long = "backend")]
    backend: Option<PathBuf>,

    /// Look for the backend in the development checkout layout.
    #[arg(long = "dev", conflicts_with = "packaged")]
    dev: bool,

    /// Look for the backend in the packaged install layout.
    #[arg(long = "packaged")]
    packaged: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config comes first: it supplies the log level and log file.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (config, config_problems) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "Nexus Shell starting"
    );
    if platform_paths.from_platform {
        tracing::debug!(config = %platform_paths.config_file().display(), "Platform paths resolved");
    } else {
        tracing::warn!("Could not determine platform directories, using current directory");
    }
    for problem in &config_problems {
        tracing::warn!(config = %platform_paths.config_file().display(), "{problem}");
    }

    let mode = if cli.dev {
        core::model::LaunchMode::Development
    } else if cli.packaged {
        core::model::LaunchMode::Packaged
    } else {
        core::model::LaunchMode::detect()
    };

    let layout = platform::install::InstallLayout::detect(&config.backend_name);
    let mut extra: Vec<PathBuf> = cli.backend.iter().cloned().collect();
    extra.extend(config.extra_candidates.iter().cloned());
    let candidates = layout.candidates(mode, &extra);

    tracing::info!(
        mode = %mode,
        candidates = candidates.len(),
        restart_delay_ms = config.restart.delay.as_millis() as u64,
        max_restarts = ?config.restart.max_restarts,
        "Backend supervision configured"
    );

    // Backend first, then the window. A missing or unlaunchable backend is
    // logged by the supervisor and the window opens regardless.
    let mut supervisor = app::supervisor::Supervisor::new(app::supervisor::SupervisorConfig {
        candidates,
        restart: config.restart,
        shutdown_grace: config.shutdown_grace,
    });
    let _ = supervisor.start();

    let document_path = cli
        .document
        .or_else(|| config.document.clone())
        .unwrap_or_else(|| layout.default_document());
    let state = app::state::AppState::new(document_path, config.console_visible, cli.debug);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size(config.window_size)
            .with_min_inner_size(util::constants::MIN_WINDOW_SIZE)
            .with_icon(load_icon()),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::ShellApp::new(state, supervisor)))),
    );

    // The supervisor moved into the app; if the window never opened it was
    // dropped with the closure and its Drop impl already signalled the backend.
    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch Nexus Shell window: {e}");
        std::process::exit(1);
    }

    tracing::info!("Nexus Shell exiting");
}
