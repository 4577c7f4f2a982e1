// Nexus Shell - platform/install.rs
//
// Install-layout knowledge: where the backend executable and the default
// document live relative to the running shell.
//
// Both layouts are resolved from the application directory (the one holding
// the shell executable), never from the working directory. Development runs
// look in the sibling `../backend/dist/<name>/` build output; packaged runs
// look in the `resources/` directory shipped next to the executable. Extra
// candidates (CLI, config.toml) are tried first.

use crate::core::model::LaunchMode;
use crate::util::constants;
use std::path::{Path, PathBuf};

/// Inputs for composing the ordered backend candidate list.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    /// Application directory: the one containing the shell executable.
    pub exe_dir: PathBuf,
    /// Backend executable stem (without platform suffix).
    pub backend_name: String,
}

impl InstallLayout {
    /// Resolve the layout from the current process.
    ///
    /// Falls back to `.` for any directory that cannot be determined.
    pub fn detect(backend_name: &str) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        tracing::debug!(
            exe_dir = %exe_dir.display(),
            backend = backend_name,
            "Install layout resolved"
        );

        Self {
            exe_dir,
            backend_name: backend_name.to_string(),
        }
    }

    /// Backend executable file name for the host platform.
    pub fn binary_name(&self) -> String {
        format!("{}{}", self.backend_name, std::env::consts::EXE_SUFFIX)
    }

    /// Built-in candidate locations for `mode`, in preference order.
    pub fn builtin_candidates(&self, mode: LaunchMode) -> Vec<PathBuf> {
        let binary = self.binary_name();
        match mode {
            LaunchMode::Development => {
                vec![self
                    .exe_dir
                    .join("..")
                    .join(constants::BACKEND_DIR_NAME)
                    .join(constants::DEV_BACKEND_DIST_DIR)
                    .join(&self.backend_name)
                    .join(&binary)]
            }
            LaunchMode::Packaged => {
                let resources = self.exe_dir.join(constants::RESOURCES_DIR_NAME);
                vec![
                    resources.join(constants::BACKEND_DIR_NAME).join(&binary),
                    resources
                        .join(constants::UNPACKED_DIR_NAME)
                        .join(constants::BACKEND_DIR_NAME)
                        .join(&binary),
                ]
            }
        }
    }

    /// Full ordered candidate list: `extra` first, then the built-in ones.
    pub fn candidates(&self, mode: LaunchMode, extra: &[PathBuf]) -> Vec<PathBuf> {
        let mut all: Vec<PathBuf> = extra.to_vec();
        for path in self.builtin_candidates(mode) {
            if !all.contains(&path) {
                all.push(path);
            }
        }
        all
    }

    /// Default document: `index.html` beside the executable.
    pub fn default_document(&self) -> PathBuf {
        self.exe_dir.join(constants::DEFAULT_DOCUMENT_NAME)
    }
}
