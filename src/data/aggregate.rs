use serde::{Deserialize, Serialize};

use super::model::Measurement;
use crate::rng::SimpleRng;

// ---------------------------------------------------------------------------
// Estimator and error bar configuration
// ---------------------------------------------------------------------------

/// Central tendency drawn as the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    #[default]
    Mean,
    Median,
}

impl Estimator {
    /// Apply to a non-empty slice of finite values.
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Estimator::Mean => mean(values),
            Estimator::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                percentile(&sorted, 50.0)
            }
        }
    }
}

/// Uncertainty band drawn around the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ErrorBar {
    /// Percentile bootstrap confidence interval of the estimator.
    Ci { level: f64, n_boot: usize, seed: u64 },
    /// Percentile interval of the raw values.
    Pi { level: f64 },
    /// Estimate ± `scale` sample standard deviations.
    Sd { scale: f64 },
    /// Estimate ± `scale` standard errors.
    Se { scale: f64 },
    None,
}

impl Default for ErrorBar {
    fn default() -> Self {
        ErrorBar::Ci {
            level: 95.0,
            n_boot: 1000,
            seed: 0,
        }
    }
}

/// Error bar selector used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorBarKind {
    Ci,
    Pi,
    Sd,
    Se,
    None,
}

impl ErrorBar {
    /// Build an error bar from its kind, using the conventional default
    /// level (95 for intervals, 1 for sd/se) unless one is given.
    pub fn from_kind(kind: ErrorBarKind, level: Option<f64>, n_boot: usize, seed: u64) -> Self {
        match kind {
            ErrorBarKind::Ci => ErrorBar::Ci {
                level: level.unwrap_or(95.0),
                n_boot,
                seed,
            },
            ErrorBarKind::Pi => ErrorBar::Pi {
                level: level.unwrap_or(95.0),
            },
            ErrorBarKind::Sd => ErrorBar::Sd {
                scale: level.unwrap_or(1.0),
            },
            ErrorBarKind::Se => ErrorBar::Se {
                scale: level.unwrap_or(1.0),
            },
            ErrorBarKind::None => ErrorBar::None,
        }
    }

    /// Short label for the UI.
    pub fn describe(&self) -> String {
        match self {
            ErrorBar::Ci { level, .. } => format!("{level}% CI"),
            ErrorBar::Pi { level } => format!("{level}% PI"),
            ErrorBar::Sd { scale } => format!("±{scale} sd"),
            ErrorBar::Se { scale } => format!("±{scale} se"),
            ErrorBar::None => "no band".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary points
// ---------------------------------------------------------------------------

/// Lower and upper edge of the uncertainty band at one x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

/// All rows sharing one x value, reduced to a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPoint {
    pub x: f64,
    pub estimate: f64,
    pub band: Option<Band>,
    /// Number of finite observations aggregated.
    pub count: usize,
}

/// Summarize y by x over the given rows.
///
/// Rows with a non-finite coordinate are skipped. Output is sorted by x.
/// The bootstrap generator is seeded once per call, so the same rows always
/// produce the same points.
pub fn aggregate<'a>(
    records: impl IntoIterator<Item = &'a Measurement>,
    estimator: Estimator,
    errorbar: &ErrorBar,
) -> Vec<SummaryPoint> {
    let mut pairs: Vec<(f64, f64)> = records
        .into_iter()
        .filter(|r| r.is_finite())
        .map(|r| (r.x, r.y))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut rng = match errorbar {
        ErrorBar::Ci { seed, .. } => Some(SimpleRng::new(*seed)),
        _ => None,
    };

    pairs
        .chunk_by(|a, b| a.0 == b.0)
        .map(|chunk| {
            let values: Vec<f64> = chunk.iter().map(|&(_, y)| y).collect();
            summarize(chunk[0].0, &values, estimator, errorbar, rng.as_mut())
        })
        .collect()
}

/// Reduce one group of values to a summary point.
pub fn summarize(
    x: f64,
    values: &[f64],
    estimator: Estimator,
    errorbar: &ErrorBar,
    rng: Option<&mut SimpleRng>,
) -> SummaryPoint {
    let estimate = estimator.apply(values);
    let n = values.len();

    let band = match *errorbar {
        ErrorBar::None => None,
        ErrorBar::Sd { .. } | ErrorBar::Se { .. } if n < 2 => None,
        ErrorBar::Sd { scale } => {
            let half = scale * std_dev(values);
            Some(Band {
                lower: estimate - half,
                upper: estimate + half,
            })
        }
        ErrorBar::Se { scale } => {
            let half = scale * std_dev(values) / (n as f64).sqrt();
            Some(Band {
                lower: estimate - half,
                upper: estimate + half,
            })
        }
        ErrorBar::Pi { level } => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            Some(interval(&sorted, level))
        }
        ErrorBar::Ci { level, n_boot, seed } => {
            let mut local = SimpleRng::new(seed);
            let rng = rng.unwrap_or(&mut local);
            let mut boots = bootstrap(values, estimator, n_boot, rng);
            boots.sort_by(f64::total_cmp);
            Some(interval(&boots, level))
        }
    };

    SummaryPoint {
        x,
        estimate,
        band,
        count: n,
    }
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Percentile of sorted data with linear interpolation between ranks.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn interval(sorted: &[f64], level: f64) -> Band {
    let tail = (100.0 - level.clamp(0.0, 100.0)) / 2.0;
    Band {
        lower: percentile(sorted, tail),
        upper: percentile(sorted, 100.0 - tail),
    }
}

/// Estimator applied to `n_boot` resamples (with replacement) of `values`.
fn bootstrap(
    values: &[f64],
    estimator: Estimator,
    n_boot: usize,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    let n = values.len();
    let mut sample = vec![0.0; n];
    (0..n_boot.max(1))
        .map(|_| {
            for slot in sample.iter_mut() {
                *slot = values[rng.next_index(n)];
            }
            estimator.apply(&sample)
        })
        .collect()
}
