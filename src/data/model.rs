use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Columns – which table columns feed the plot
// ---------------------------------------------------------------------------

pub const DEFAULT_X_COLUMN: &str = "real_jaccard";
pub const DEFAULT_Y_COLUMN: &str = "jaccard_error";

/// Names of the columns read from the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    /// Ground-truth similarity (x-axis).
    pub x: String,
    /// Observed estimation error (y-axis).
    pub y: String,
    /// Optional grouping column; one series per distinct value.
    pub hue: Option<String>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            x: DEFAULT_X_COLUMN.to_string(),
            y: DEFAULT_Y_COLUMN.to_string(),
            hue: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Measurement – one row of the input file
// ---------------------------------------------------------------------------

/// A single measurement row. Empty cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub x: f64,
    pub y: f64,
    /// Value of the hue column, when one was requested.
    pub group: Option<String>,
}

impl Measurement {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, group: None }
    }

    /// Whether both coordinates can be plotted.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – the complete loaded file
// ---------------------------------------------------------------------------

/// All measurements in file order, plus the columns they were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    pub columns: Columns,
    pub records: Vec<Measurement>,
}

impl MeasurementTable {
    pub fn new(columns: Columns, records: Vec<Measurement>) -> Self {
        Self { columns, records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct group labels in order of first appearance.
    ///
    /// Rows without a group are collected under `None`, which is listed only
    /// when such rows exist.
    pub fn groups(&self) -> Vec<Option<String>> {
        let mut seen: Vec<Option<String>> = Vec::new();
        for rec in &self.records {
            if !seen.contains(&rec.group) {
                seen.push(rec.group.clone());
            }
        }
        seen
    }

    /// Rows belonging to one group.
    pub fn group_records<'a>(
        &'a self,
        group: &'a Option<String>,
    ) -> impl Iterator<Item = &'a Measurement> + 'a {
        self.records.iter().filter(move |r| &r.group == group)
    }
}
