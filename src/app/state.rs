// Nexus Shell - app/state.rs
//
// Application state management. Holds the displayed document and the
// backend console buffer.
// Owned by the eframe::App implementation.

use crate::core::document::{self, Document};
use crate::core::model::{ConsoleLine, OutputStream};
use crate::platform;
use crate::util::constants::MAX_CONSOLE_LINES;
use crate::util::error::DocumentError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Path of the displayed document.
    pub document_path: PathBuf,

    /// The loaded document, or the reason it could not be shown.
    pub document: Result<Document, String>,

    /// Most recent backend output, oldest first, at most `MAX_CONSOLE_LINES`.
    pub console: VecDeque<ConsoleLine>,

    /// Total stderr chunks received this session (not capped).
    pub stderr_total: u64,

    /// Whether the console pane is expanded.
    pub console_visible: bool,

    /// Set when new console output arrived and the pane should scroll down.
    pub console_scroll_to_bottom: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    /// Create initial state, loading the document immediately.
    pub fn new(document_path: PathBuf, console_visible: bool, debug_mode: bool) -> Self {
        let document = load_document(&document_path).map_err(|e| {
            tracing::error!(error = %e, "Document could not be loaded");
            e.to_string()
        });
        Self {
            document_path,
            document,
            console: VecDeque::new(),
            stderr_total: 0,
            console_visible,
            console_scroll_to_bottom: false,
            debug_mode,
        }
    }

    /// Re-read the document from disk.
    pub fn reload_document(&mut self) {
        self.document = load_document(&self.document_path).map_err(|e| {
            tracing::warn!(error = %e, "Document reload failed");
            e.to_string()
        });
    }

    /// Append forwarded backend output, dropping the oldest lines beyond the cap.
    pub fn push_console(&mut self, lines: Vec<ConsoleLine>) {
        if lines.is_empty() {
            return;
        }
        for line in lines {
            if line.stream == OutputStream::Stderr {
                self.stderr_total += 1;
            }
            if self.console.len() == MAX_CONSOLE_LINES {
                self.console.pop_front();
            }
            self.console.push_back(line);
        }
        self.console_scroll_to_bottom = true;
    }

    pub fn clear_console(&mut self) {
        self.console.clear();
    }
}

/// Read and reduce the document at `path`.
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let content = platform::fs::read_document(path)?;
    let doc = document::parse(&content, path);
    tracing::info!(
        path = %path.display(),
        lines = doc.lines.len(),
        title = doc.title.as_deref().unwrap_or(""),
        "Document loaded"
    );
    Ok(doc)
}
