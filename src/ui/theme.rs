// Nexus Shell - ui/theme.rs
//
// Colour scheme, output-stream colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::{OutputStream, SupervisorState};
use egui::Color32;

/// Text colour for a console line from `stream`.
pub fn stream_colour(stream: OutputStream) -> Color32 {
    match stream {
        OutputStream::Stdout => Color32::from_rgb(209, 213, 219), // Gray 300
        OutputStream::Stderr => Color32::from_rgb(248, 113, 113), // Red 400
    }
}

/// Badge colour for the supervisor state shown in the status bar.
pub fn state_colour(state: &SupervisorState) -> Color32 {
    match state {
        SupervisorState::Running { .. } => Color32::from_rgb(34, 197, 94), // Green 500
        SupervisorState::PendingRestart { .. } => Color32::from_rgb(217, 119, 6), // Amber 600
        SupervisorState::Terminating { .. } => Color32::from_rgb(107, 114, 128), // Gray 500
        SupervisorState::Idle | SupervisorState::Stopped => Color32::from_rgb(185, 28, 28), // Red 800
    }
}

/// Layout constants.
pub const CONSOLE_PANE_HEIGHT: f32 = 180.0;
pub const CONSOLE_ROW_HEIGHT: f32 = 16.0;
pub const DOCUMENT_MAX_WIDTH: f32 = 900.0;
pub const DOCUMENT_TITLE_SIZE: f32 = 24.0;
