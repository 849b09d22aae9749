use eframe::egui;

use crate::export::save_png;
use crate::state::AppState;
use crate::ui::{panels, plot};

/// Frames to draw before capturing for `--save`, so the plot has laid out.
const FRAMES_BEFORE_CAPTURE: u64 = 2;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ViewerApp {
    pub state: AppState,
    frames_drawn: u64,
}

impl ViewerApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            frames_drawn: 0,
        }
    }

    /// Request a screenshot when a save is pending and write the result
    /// once it arrives.
    fn handle_pending_save(&mut self, ctx: &egui::Context) {
        let Some(path) = self.state.pending_save.clone() else {
            return;
        };

        if !self.state.screenshot_requested {
            if self.frames_drawn >= FRAMES_BEFORE_CAPTURE {
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(
                    egui::UserData::default(),
                ));
                self.state.screenshot_requested = true;
            }
            ctx.request_repaint();
            return;
        }

        let captured = ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        let Some(image) = captured else {
            ctx.request_repaint();
            return;
        };

        self.state.pending_save = None;
        self.state.screenshot_requested = false;
        match save_png(&path, &image) {
            Ok(()) => {
                self.state.status_message = Some(format!("Saved {}", path.display()));
                if self.state.close_after_save {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
            Err(e) => {
                log::error!("Failed to save figure: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: series and summary ----
        egui::SidePanel::left("series_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::error_plot(ui, &self.state);
        });

        self.frames_drawn += 1;
        self.handle_pending_save(ctx);
    }
}
