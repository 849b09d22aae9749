use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::data::aggregate::{ErrorBar, ErrorBarKind, Estimator};
use crate::data::loader::LoadOptions;
use crate::data::model::Columns;
use crate::figure::PlotSpec;
use crate::style::ThemeName;

pub const DEFAULT_DATA_FILE: &str = "data.csv";

#[derive(Parser, Debug, Default)]
#[command(name = "jaccard-viz")]
#[command(about = "Plot Jaccard estimation error against the true Jaccard index", long_about = None)]
pub struct Args {
    /// Measurement file (.csv, .tsv, .json, .parquet) [default: ./data.csv]
    pub file: Option<PathBuf>,

    /// Column holding the true Jaccard index (x-axis)
    #[arg(short = 'x', long)]
    pub x_column: Option<String>,

    /// Column holding the estimation error (y-axis)
    #[arg(short = 'y', long)]
    pub y_column: Option<String>,

    /// Column to split the data into separately coloured lines
    #[arg(long)]
    pub hue: Option<String>,

    /// Field delimiter for delimited text files
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Plot theme
    #[arg(long, value_enum)]
    pub theme: Option<ThemeName>,

    /// Statistic drawn as the line
    #[arg(long, value_enum)]
    pub estimator: Option<Estimator>,

    /// Uncertainty band around the line
    #[arg(long, value_enum)]
    pub errorbar: Option<ErrorBarKind>,

    /// Interval width in percent (ci, pi) or multiplier (sd, se)
    #[arg(long)]
    pub errorbar_level: Option<f64>,

    /// Bootstrap resamples for the ci band
    #[arg(long)]
    pub n_boot: Option<usize>,

    /// Bootstrap seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Figure title
    #[arg(long)]
    pub title: Option<String>,

    /// Write the rendered window to this PNG file once it is drawn
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Close the window after --save has written the PNG
    #[arg(long, requires = "save")]
    pub close_after_save: bool,

    /// JSON file with default settings; command line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Resolved settings for one viewer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data_path: PathBuf,
    pub columns: Columns,
    pub delimiter: Option<char>,
    pub theme: ThemeName,
    pub plot: PlotSpec,
    pub save_path: Option<PathBuf>,
    pub close_after_save: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            columns: Columns::default(),
            delimiter: None,
            theme: ThemeName::default(),
            plot: PlotSpec::default(),
            save_path: None,
            close_after_save: false,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Settings from `--config` (if any) with command line flags applied on top.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply_args(args)?;
        Ok(cfg)
    }

    fn apply_args(&mut self, args: &Args) -> Result<()> {
        if let Some(file) = &args.file {
            self.data_path = file.clone();
        }
        if let Some(x) = &args.x_column {
            self.columns.x = x.clone();
        }
        if let Some(y) = &args.y_column {
            self.columns.y = y.clone();
        }
        if args.hue.is_some() {
            self.columns.hue = args.hue.clone();
        }
        if args.delimiter.is_some() {
            self.delimiter = args.delimiter;
        }
        if let Some(theme) = args.theme {
            self.theme = theme;
        }
        if let Some(estimator) = args.estimator {
            self.plot.estimator = estimator;
        }
        if args.title.is_some() {
            self.plot.title = args.title.clone();
        }
        self.apply_errorbar_args(args);
        if args.save.is_some() {
            self.save_path = args.save.clone();
        }
        self.close_after_save |= args.close_after_save;

        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                bail!("delimiter must be a single ASCII character, got '{d}'");
            }
        }
        Ok(())
    }

    /// Merge the error bar flags into the configured error bar. Flags that
    /// do not apply to the resulting kind are ignored.
    fn apply_errorbar_args(&mut self, args: &Args) {
        let (kind, level, n_boot, seed) = match self.plot.errorbar {
            ErrorBar::Ci { level, n_boot, seed } => (ErrorBarKind::Ci, Some(level), n_boot, seed),
            ErrorBar::Pi { level } => (ErrorBarKind::Pi, Some(level), 1000, 0),
            ErrorBar::Sd { scale } => (ErrorBarKind::Sd, Some(scale), 1000, 0),
            ErrorBar::Se { scale } => (ErrorBarKind::Se, Some(scale), 1000, 0),
            ErrorBar::None => (ErrorBarKind::None, None, 1000, 0),
        };

        // A new kind resets the level to that kind's convention.
        let (kind, level) = match args.errorbar {
            Some(k) if k != kind => (k, None),
            _ => (kind, level),
        };

        self.plot.errorbar = ErrorBar::from_kind(
            kind,
            args.errorbar_level.or(level),
            args.n_boot.unwrap_or(n_boot),
            args.seed.unwrap_or(seed),
        );
    }

    /// Loader settings derived from this config.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            columns: self.columns.clone(),
            delimiter: self.delimiter.map(|d| d as u8),
        }
    }
}
