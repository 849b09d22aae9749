use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::figure::Series;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – series toggles and summary table
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Series");
    ui.label(RichText::new(&state.figure.band_label).weak());
    ui.separator();

    if state.figure.series.is_empty() {
        ui.label("No series to show.");
        return;
    }

    if let Some(title) = state.figure.legend_title.clone() {
        ui.strong(title);
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all();
        }
    });

    // Collect names first so toggling can borrow state mutably.
    let entries: Vec<(String, Color32)> = state
        .figure
        .series
        .iter()
        .map(|s| (s.name.clone(), s.color))
        .collect();

    for (index, (name, color)) in entries.iter().enumerate() {
        let mut checked = state.is_visible(index);
        if ui
            .checkbox(&mut checked, RichText::new(name).color(*color))
            .changed()
        {
            state.toggle_series(index);
        }
    }

    ui.separator();
    ui.strong("Summary");

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (index, series) in state.figure.series.iter().enumerate() {
                if !state.is_visible(index) {
                    continue;
                }
                egui::CollapsingHeader::new(RichText::new(&series.name).color(series.color))
                    .id_salt(("summary", index))
                    .default_open(state.figure.series.len() == 1)
                    .show(ui, |ui: &mut Ui| summary_table(ui, series));
            }
        });
}

/// Per-x aggregate values of one series.
fn summary_table(ui: &mut Ui, series: &Series) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .columns(Column::auto(), 3)
        .header(18.0, |mut header| {
            for title in ["x", "n", "estimate", "lower", "upper"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, series.points.len(), |mut row| {
                let p = &series.points[row.index()];
                let (lower, upper) = match p.band {
                    Some(b) => (format!("{:.4}", b.lower), format!("{:.4}", b.upper)),
                    None => ("–".to_string(), "–".to_string()),
                };
                let cells = [
                    format!("{}", p.x),
                    p.count.to_string(),
                    format!("{:.4}", p.estimate),
                    lower,
                    upper,
                ];
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save PNG…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} rows, {} plotted, {} series",
            state.source.display(),
            state.table.len(),
            state.figure.observations(),
            state.figure.series.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open error measurements")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save figure")
        .set_file_name("errors.png")
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        state.request_save(path);
    }
}
