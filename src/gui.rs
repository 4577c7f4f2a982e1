// Nexus Shell - gui.rs
//
// Top-level eframe::App implementation.
// Polls the backend supervisor every frame and lays out the single window:
// status bar, backend console pane, and the document. There is no menu bar.
//
// Restart deadlines are also armed on a waker thread that requests a repaint
// when the deadline passes, so a restart fires on time while the window is
// minimised and frames only come from the event loop's timers.
//
// Window close: on platforms that quit with their last window the close goes
// ahead and `on_exit` shuts the backend down. On macOS the close is cancelled
// and the window minimised; Cmd+Q quits.

use crate::app::state::AppState;
use crate::app::supervisor::Supervisor;
use crate::core::model::SupervisorState;
use crate::platform::desktop;
use crate::ui;
use std::time::{Duration, Instant};

/// The Nexus Shell application.
pub struct ShellApp {
    pub state: AppState,
    pub supervisor: Supervisor,
    /// Set by an explicit quit so a resident-style close is not cancelled.
    quit_requested: bool,
    restart_waker: DeadlineWaker,
}

/// Requests a repaint from a background thread once a deadline passes.
#[derive(Debug, Default)]
struct DeadlineWaker {
    /// Deadline a thread is already sleeping towards.
    armed: Option<Instant>,
}

impl DeadlineWaker {
    /// Arm for `due` unless that deadline is already armed. Returns whether a
    /// new waker thread was started.
    fn arm(&mut self, ctx: &egui::Context, due: Option<Instant>) -> bool {
        let Some(due) = due else {
            self.armed = None;
            return false;
        };
        if self.armed == Some(due) {
            return false;
        }
        self.armed = Some(due);

        let ctx = ctx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(due.saturating_duration_since(Instant::now()));
            ctx.request_repaint();
        });
        true
    }
}

impl ShellApp {
    /// Create the application around an already-started supervisor.
    pub fn new(state: AppState, supervisor: Supervisor) -> Self {
        Self {
            state,
            supervisor,
            quit_requested: false,
            restart_waker: DeadlineWaker::default(),
        }
    }

    fn handle_close(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Q)) {
            self.quit_requested = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if close_requested && !self.quit_requested && !desktop::host_quits_when_windows_closed()
        {
            tracing::debug!("Window closed; staying resident");
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
        }
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll the supervisor: forwards output and fires a due restart.
        let lines = self.supervisor.poll();
        let had_output = !lines.is_empty();
        self.state.push_console(lines);
        self.restart_waker.arm(ctx, self.supervisor.restart_due());

        if had_output {
            ctx.request_repaint();
        } else if self.supervisor.is_active() {
            // Keep frames coming so exit events and the restart deadline are
            // noticed without user input.
            ctx.request_repaint_after(Duration::from_millis(
                crate::util::constants::SUPERVISOR_REPAINT_INTERVAL_MS,
            ));
        }

        self.handle_close(ctx);

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let sup_state = self.supervisor.state();
                ui.label(
                    egui::RichText::new(" \u{25cf} ")
                        .strong()
                        .color(ui::theme::state_colour(&sup_state)),
                );
                ui.label(sup_state.label());
                if let Some(err) = self.supervisor.last_error() {
                    if !matches!(sup_state, SupervisorState::Running { .. }) {
                        ui.separator();
                        ui.label(egui::RichText::new(err).color(ui::theme::stream_colour(
                            crate::core::model::OutputStream::Stderr,
                        )));
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let toggle = if self.state.console_visible {
                        "Hide console"
                    } else {
                        "Show console"
                    };
                    if ui.small_button(toggle).clicked() {
                        self.state.console_visible = !self.state.console_visible;
                    }
                    if self.state.debug_mode {
                        ui.label(
                            egui::RichText::new(format!(
                                "launches: {}",
                                self.supervisor.launch_count()
                            ))
                            .weak(),
                        );
                    }
                });
            });
        });

        // Console pane (bottom)
        if self.state.console_visible {
            egui::TopBottomPanel::bottom("console_pane")
                .resizable(true)
                .default_height(ui::theme::CONSOLE_PANE_HEIGHT)
                .show(ctx, |ui| {
                    ui::panels::console::render(ui, &mut self.state);
                });
        }

        // Central panel (document)
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::document::render(ui, &mut self.state);
        });
    }

    /// Called by eframe when the application is about to quit.
    ///
    /// Sends the backend its termination signal; by default this does not
    /// wait for the backend to exit.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.supervisor.shutdown();
    }
}
