use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::ViewerConfig;
use crate::data::loader::load_file;
use crate::data::model::MeasurementTable;
use crate::figure::{Figure, Series};
use crate::style::Theme;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct AppState {
    /// Settings the viewer was started with; reused when opening new files.
    pub config: ViewerConfig,

    /// Path of the file currently shown.
    pub source: PathBuf,

    /// Loaded measurements.
    pub table: MeasurementTable,

    /// Figure computed from `table`.
    pub figure: Figure,

    /// Indices (into `figure.series`) of series the user switched off.
    pub hidden_series: BTreeSet<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// PNG destination waiting for the next captured frame.
    pub pending_save: Option<PathBuf>,

    /// Whether a screenshot has been requested for `pending_save`.
    pub screenshot_requested: bool,

    /// Close the window once `pending_save` is written.
    pub close_after_save: bool,
}

impl AppState {
    /// Build the state for an already loaded table.
    pub fn new(config: ViewerConfig, table: MeasurementTable) -> Self {
        let theme = Theme::new(config.theme);
        let figure = Figure::build(&table, &config.plot, &theme);
        let pending_save = config.save_path.clone();
        let close_after_save = config.close_after_save;
        Self {
            source: config.data_path.clone(),
            config,
            table,
            figure,
            hidden_series: BTreeSet::new(),
            status_message: None,
            pending_save,
            screenshot_requested: false,
            close_after_save,
        }
    }

    /// Replace the table and recompute the figure with the same settings.
    pub fn set_table(&mut self, source: PathBuf, table: MeasurementTable) {
        self.figure = Figure::build(&table, &self.config.plot, &self.figure.theme);
        self.table = table;
        self.source = source;
        self.hidden_series.clear();
        self.status_message = None;
    }

    /// Load another file with the current column settings.
    ///
    /// On failure the current figure stays and the error is shown.
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path, &self.config.load_options()) {
            Ok(table) => {
                log::info!("Loaded {} rows from {}", table.len(), path.display());
                self.set_table(path.to_path_buf(), table);
            }
            Err(e) => {
                let err = anyhow::Error::from(e);
                log::error!("Failed to load {}: {err:#}", path.display());
                self.status_message = Some(format!("Error: {err:#}"));
            }
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        !self.hidden_series.contains(&index)
    }

    /// Series currently switched on, in legend order.
    pub fn visible_series(&self) -> impl Iterator<Item = &Series> {
        self.figure
            .series
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_visible(*i))
            .map(|(_, s)| s)
    }

    /// Toggle a single series on or off.
    pub fn toggle_series(&mut self, index: usize) {
        if !self.hidden_series.remove(&index) {
            self.hidden_series.insert(index);
        }
    }

    pub fn show_all(&mut self) {
        self.hidden_series.clear();
    }

    pub fn hide_all(&mut self) {
        self.hidden_series = (0..self.figure.series.len()).collect();
    }

    /// Ask for the next frame to be written to `path`.
    pub fn request_save(&mut self, path: PathBuf) {
        self.pending_save = Some(path);
        self.screenshot_requested = false;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{Columns, Measurement};

    fn grouped_table() -> MeasurementTable {
        let row = |x, y, g: &str| Measurement {
            x,
            y,
            group: Some(g.to_string()),
        };
        MeasurementTable::new(
            Columns {
                hue: Some("k".to_string()),
                ..Columns::default()
            },
            vec![row(0.1, 0.01, "a"), row(0.1, 0.02, "b")],
        )
    }

    fn grouped_state() -> AppState {
        let config = ViewerConfig {
            columns: Columns {
                hue: Some("k".to_string()),
                ..Columns::default()
            },
            ..ViewerConfig::default()
        };
        AppState::new(config, grouped_table())
    }

    #[test]
    fn toggling_hides_and_restores_series() {
        let mut state = grouped_state();
        assert_eq!(state.visible_series().count(), 2);

        state.toggle_series(0);
        let names: Vec<&str> = state.visible_series().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);

        state.toggle_series(0);
        assert!(state.is_visible(0));
    }

    #[test]
    fn series_with_equal_labels_toggle_independently() {
        let row = |x, y, g: Option<&str>| Measurement {
            x,
            y,
            group: g.map(str::to_string),
        };
        let columns = Columns {
            hue: Some("k".to_string()),
            ..Columns::default()
        };
        let table = MeasurementTable::new(
            columns.clone(),
            vec![row(0.1, 0.01, None), row(0.1, 0.02, Some("<null>"))],
        );
        let config = ViewerConfig {
            columns,
            ..ViewerConfig::default()
        };
        let mut state = AppState::new(config, table);
        assert_eq!(state.figure.series.len(), 2);

        state.toggle_series(1);
        assert!(state.is_visible(0));
        assert!(!state.is_visible(1));
        assert_eq!(state.visible_series().count(), 1);
    }

    #[test]
    fn hide_all_then_show_all() {
        let mut state = grouped_state();
        state.hide_all();
        assert_eq!(state.visible_series().count(), 0);
        state.show_all();
        assert_eq!(state.visible_series().count(), 2);
    }

    #[test]
    fn failed_open_keeps_current_figure() {
        let mut state = grouped_state();
        let before = state.figure.clone();

        state.open_path(Path::new("/nonexistent/data.csv"));

        assert_eq!(state.figure, before);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("not found")));
    }

    #[test]
    fn successful_open_replaces_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("more.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"k,real_jaccard,jaccard_error\nz,0.3,0.1\n").unwrap();

        let mut state = grouped_state();
        state.toggle_series(0);
        state.open_path(&path);

        assert_eq!(state.source, path);
        assert_eq!(state.figure.series.len(), 1);
        assert_eq!(state.figure.series[0].name, "z");
        assert!(state.hidden_series.is_empty());
    }

    #[test]
    fn save_path_from_config_is_pending() {
        let config = ViewerConfig {
            save_path: Some(PathBuf::from("errors.png")),
            ..ViewerConfig::default()
        };
        let state = AppState::new(config, grouped_table());
        assert_eq!(state.pending_save, Some(PathBuf::from("errors.png")));
        assert!(!state.screenshot_requested);
    }
}
