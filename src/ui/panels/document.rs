// Nexus Shell - ui/panels/document.rs
//
// Central document view. Shows the reduced document text, or the load
// error in place of the content so a bad path never takes the window down.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the document (central area).
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let mut reload = false;

    match &state.document {
        Ok(doc) => {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.set_max_width(theme::DOCUMENT_MAX_WIDTH);
                    if let Some(ref title) = doc.title {
                        ui.label(
                            egui::RichText::new(title)
                                .size(theme::DOCUMENT_TITLE_SIZE)
                                .strong(),
                        );
                        ui.add_space(8.0);
                    }
                    if doc.lines.is_empty() {
                        ui.label(egui::RichText::new("(empty document)").weak());
                    }
                    for line in &doc.lines {
                        if line.is_empty() {
                            ui.add_space(6.0);
                        } else {
                            ui.label(line);
                        }
                    }
                });
        }
        Err(message) => {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("Document unavailable")
                            .size(18.0)
                            .strong(),
                    );
                    ui.add_space(4.0);
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("Retry").clicked() {
                        reload = true;
                    }
                });
            });
        }
    }

    if reload {
        state.reload_document();
    }
}
