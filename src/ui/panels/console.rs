// Nexus Shell - ui/panels/console.rs
//
// Backend console pane: the most recent forwarded stdout/stderr chunks.
//
// Uses `ScrollArea::show_rows` so only visible rows are laid out. Each row is
// a LayoutJob with a dim timestamp prefix and the chunk text coloured by
// stream, so stderr stands out without a separate pane.

use crate::app::state::AppState;
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};

/// Render the console pane (bottom panel).
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.strong("Backend console");
        ui.label(
            egui::RichText::new(format!(
                "{} line(s), {} error(s)",
                state.console.len(),
                state.stderr_total
            ))
            .weak(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Clear").clicked() {
                state.clear_console();
            }
        });
    });
    ui.separator();

    if state.console.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("No backend output yet.").weak());
        });
        return;
    }

    let font = egui::TextStyle::Monospace.resolve(ui.style());
    let stick = std::mem::take(&mut state.console_scroll_to_bottom);

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(stick)
        .show_rows(
            ui,
            theme::CONSOLE_ROW_HEIGHT,
            state.console.len(),
            |ui, row_range| {
                for idx in row_range {
                    let Some(line) = state.console.get(idx) else {
                        continue;
                    };
                    let mut job = LayoutJob::default();
                    job.append(
                        &format!("{} ", line.timestamp.format("%H:%M:%S")),
                        0.0,
                        TextFormat {
                            font_id: font.clone(),
                            color: ui.visuals().weak_text_color(),
                            ..Default::default()
                        },
                    );
                    job.append(
                        &line.text,
                        0.0,
                        TextFormat {
                            font_id: font.clone(),
                            color: theme::stream_colour(line.stream),
                            ..Default::default()
                        },
                    );
                    ui.label(job);
                }
            },
        );
}
