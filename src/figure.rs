//! Render step: turn a measurement table into a drawable figure.
//!
//! Building a [`Figure`] is pure. The same table, plot spec and theme always give
//! an equal figure, so the viewer only has to draw what it is handed.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color::series_colors;
use crate::data::aggregate::{aggregate, ErrorBar, Estimator, SummaryPoint};
use crate::data::model::MeasurementTable;
use crate::style::Theme;

/// How rows are reduced to lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSpec {
    pub estimator: Estimator,
    pub errorbar: ErrorBar,
    /// Optional figure title.
    pub title: Option<String>,
}

/// One line (plus optional band) on the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    /// Ascending in x.
    pub points: Vec<SummaryPoint>,
}

impl Series {
    /// Number of rows that went into this series.
    pub fn observations(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }

    pub fn has_band(&self) -> bool {
        self.points.iter().any(|p| p.band.is_some())
    }
}

/// A fully computed line plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    /// Legend title (the hue column), when series are grouped.
    pub legend_title: Option<String>,
    pub band_label: String,
    pub series: Vec<Series>,
    pub theme: Theme,
}

impl Figure {
    /// Aggregate `table` into one series per group.
    ///
    /// Without a hue column the figure has exactly one series named after the
    /// y column. Groups with no plottable rows are left out.
    pub fn build(table: &MeasurementTable, spec: &PlotSpec, theme: &Theme) -> Self {
        let groups = table.groups();
        let colors = series_colors(&theme.palette, groups.len());

        let series: Vec<Series> = groups
            .iter()
            .zip(colors)
            .filter_map(|(group, color)| {
                let points = aggregate(table.group_records(group), spec.estimator, &spec.errorbar);
                if points.is_empty() {
                    return None;
                }
                let name = match (group, &table.columns.hue) {
                    (Some(g), _) => g.clone(),
                    (None, Some(_)) => "<null>".to_string(),
                    (None, None) => table.columns.y.clone(),
                };
                Some(Series {
                    name,
                    color,
                    points,
                })
            })
            .collect();

        if series.is_empty() {
            log::warn!("no plottable rows; the figure will be empty");
        }

        Figure {
            title: spec.title.clone(),
            x_label: table.columns.x.clone(),
            y_label: table.columns.y.clone(),
            legend_title: table.columns.hue.clone(),
            band_label: spec.errorbar.describe(),
            series,
            theme: theme.clone(),
        }
    }

    /// Whether a legend helps tell series apart.
    pub fn wants_legend(&self) -> bool {
        self.legend_title.is_some() || self.series.len() > 1
    }

    /// Total rows drawn across all series.
    pub fn observations(&self) -> usize {
        self.series.iter().map(Series::observations).sum()
    }
}
