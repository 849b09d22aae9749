use eframe::egui::{RichText, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Polygon};

use crate::color::with_alpha;
use crate::figure::Series;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Error plot (central panel)
// ---------------------------------------------------------------------------

/// Render the figure in the central panel.
pub fn error_plot(ui: &mut Ui, state: &AppState) {
    let figure = &state.figure;
    let theme = &figure.theme;

    if let Some(title) = &figure.title {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).strong().color(theme.text_color));
        });
    }

    if figure.series.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No plottable rows in this file  (File → Open…)");
        });
        return;
    }

    // The plot fills its background with `extreme_bg_color`.
    ui.visuals_mut().extreme_bg_color = theme.background;

    let mut plot = Plot::new("error_plot")
        .x_axis_label(&figure.x_label)
        .y_axis_label(&figure.y_label)
        .show_grid(theme.show_grid)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if figure.wants_legend() {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for series in state.visible_series() {
            for quad in band_quads(series) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(quad))
                        .name(&series.name)
                        .fill_color(with_alpha(series.color, theme.band_alpha))
                        .stroke(Stroke::NONE),
                );
            }

            let points: PlotPoints = series.points.iter().map(|p| [p.x, p.estimate]).collect();
            let line = Line::new(points)
                .name(&series.name)
                .color(series.color)
                .width(theme.line_width);

            plot_ui.line(line);
        }
    });
}

/// Split the band into one quadrilateral per segment between adjacent x
/// values. Each piece is convex, which the polygon fill requires.
pub fn band_quads(series: &Series) -> Vec<Vec<[f64; 2]>> {
    series
        .points
        .windows(2)
        .filter_map(|w| {
            let (a, b) = (&w[0], &w[1]);
            let (ba, bb) = (a.band?, b.band?);
            Some(vec![
                [a.x, ba.lower],
                [b.x, bb.lower],
                [b.x, bb.upper],
                [a.x, ba.upper],
            ])
        })
        .collect()
}
