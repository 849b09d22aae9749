use std::io::ErrorKind;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::LoadError;
use super::model::{Columns, Measurement, MeasurementTable};

type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// How to read a measurement file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub columns: Columns,
    /// Field delimiter for delimited text. Defaults to `,` (`\t` for `.tsv`).
    pub delimiter: Option<u8>,
}

/// Load a measurement table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – header row, one measurement per line
/// * `.json`    – `[{ "real_jaccard": 0.1, "jaccard_error": 0.01 }, ...]`
/// * `.parquet` – flat numeric columns
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<MeasurementTable> {
    let metadata = std::fs::metadata(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if metadata.is_dir() {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "is a directory"),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" | "" => load_csv(path, options, options.delimiter.unwrap_or(b','))?,
        "tsv" => load_csv(path, options, options.delimiter.unwrap_or(b'\t'))?,
        "json" => load_json(path, &options.columns)?,
        "parquet" | "pq" => load_parquet(path, &options.columns)?,
        other => {
            return Err(LoadError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    let dropped = table.records.iter().filter(|r| !r.is_finite()).count();
    if dropped > 0 {
        log::warn!(
            "{dropped} of {} rows have a missing '{}' or '{}' value and will not be plotted",
            table.len(),
            table.columns.x,
            table.columns.y
        );
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, numeric x and y columns.
/// Headers and cells are trimmed, so `"a, b"` style output loads as-is.
/// Columns other than x, y and hue are ignored.
fn load_csv(path: &Path, options: &LoadOptions, delimiter: u8) -> Result<MeasurementTable> {
    let columns = &options.columns;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let x_idx = column_index(&headers, &columns.x)?;
    let y_idx = column_index(&headers, &columns.y)?;
    let hue_idx = columns
        .hue
        .as_deref()
        .map(|h| column_index(&headers, h))
        .transpose()?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;

        let x = parse_cell(record.get(x_idx).unwrap_or(""), &columns.x, row)?;
        let y = parse_cell(record.get(y_idx).unwrap_or(""), &columns.y, row)?;
        let group = hue_idx
            .and_then(|idx| record.get(idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(Measurement { x, y, group });
    }

    Ok(MeasurementTable::new(columns.clone(), records))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| LoadError::MissingColumn {
            column: name.to_string(),
        })
}

/// Parse one numeric cell. Empty cells become NaN, anything else must parse.
fn parse_cell(s: &str, column: &str, row: usize) -> Result<f64> {
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|_| LoadError::NonNumeric {
        column: column.to_string(),
        row,
        value: s.to_string(),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "real_jaccard": 0.1, "jaccard_error": 0.012 },
///   { "real_jaccard": 0.2, "jaccard_error": null }
/// ]
/// ```
///
/// `null` or an absent key reads as NaN, but each required key must occur in
/// at least one record.
fn load_json(path: &Path, columns: &Columns) -> Result<MeasurementTable> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| LoadError::Json(e.to_string()))?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Json("expected top-level JSON array".to_string()))?;

    let mut seen_x = false;
    let mut seen_y = false;
    let mut seen_hue = false;
    let mut records = Vec::with_capacity(rows.len());

    for (i, rec) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Json(format!("row {row} is not a JSON object")))?;

        seen_x |= obj.contains_key(&columns.x);
        seen_y |= obj.contains_key(&columns.y);

        let x = json_number(obj, &columns.x, row)?;
        let y = json_number(obj, &columns.y, row)?;
        let group = columns.hue.as_deref().and_then(|h| {
            seen_hue |= obj.contains_key(h);
            json_label(obj.get(h)?)
        });

        records.push(Measurement { x, y, group });
    }

    for (seen, name) in [(seen_x, &columns.x), (seen_y, &columns.y)] {
        if !seen {
            return Err(LoadError::MissingColumn {
                column: name.clone(),
            });
        }
    }
    if let Some(hue) = &columns.hue {
        if !seen_hue {
            return Err(LoadError::MissingColumn {
                column: hue.clone(),
            });
        }
    }

    Ok(MeasurementTable::new(columns.clone(), records))
}

fn json_number(obj: &Map<String, JsonValue>, column: &str, row: usize) -> Result<f64> {
    match obj.get(column) {
        None | Some(JsonValue::Null) => Ok(f64::NAN),
        Some(JsonValue::Number(n)) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        Some(JsonValue::String(s)) => parse_cell(s.trim(), column, row),
        Some(other) => Err(LoadError::NonNumeric {
            column: column.to_string(),
            row,
            value: other.to_string(),
        }),
    }
}

fn json_label(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// The x and y columns may be any integer or floating point type; nulls read
/// as NaN. The hue column may be any type castable to a string.
fn load_parquet(path: &Path, columns: &Columns) -> Result<MeasurementTable> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Resolve columns from the file schema so empty files are checked too.
    let schema = builder.schema().clone();
    let index_of = |name: &str| {
        schema.index_of(name).map_err(|_| LoadError::MissingColumn {
            column: name.to_string(),
        })
    };
    let x_idx = index_of(&columns.x)?;
    let y_idx = index_of(&columns.y)?;
    let hue_idx = columns.hue.as_deref().map(index_of).transpose()?;
    ensure_numeric(schema.field(x_idx).data_type(), &columns.x)?;
    ensure_numeric(schema.field(y_idx).data_type(), &columns.y)?;

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let xs = cast(batch.column(x_idx), &DataType::Float64)?;
        let ys = cast(batch.column(y_idx), &DataType::Float64)?;
        let hue_col = match hue_idx {
            Some(idx) => Some(cast(batch.column(idx), &DataType::Utf8)?),
            None => None,
        };
        let hues = hue_col.as_ref().map(|c| c.as_string::<i32>());

        for row in 0..batch.num_rows() {
            let group = hues
                .filter(|h| !h.is_null(row))
                .map(|h| h.value(row).to_string());
            records.push(Measurement {
                x: value_or_nan(&xs, row),
                y: value_or_nan(&ys, row),
                group,
            });
        }
    }

    Ok(MeasurementTable::new(columns.clone(), records))
}

// -- Parquet / Arrow helpers --

/// Reject x/y columns that cannot be cast to Float64.
fn ensure_numeric(data_type: &DataType, name: &str) -> Result<()> {
    if data_type.is_numeric() {
        Ok(())
    } else {
        Err(LoadError::NonNumeric {
            column: name.to_string(),
            row: 1,
            value: format!("<{data_type}>"),
        })
    }
}

fn value_or_nan(col: &ArrayRef, row: usize) -> f64 {
    if col.is_null(row) {
        f64::NAN
    } else {
        col.as_primitive::<Float64Type>().value(row)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_with_n_rows_loads_n_numeric_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.csv",
            "real_jaccard,jaccard_error\n0.1,0.01\n0.2,0.02\n0.1,0.015\n",
        );

        let table = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0], Measurement::new(0.1, 0.01));
        assert_eq!(table.records[2], Measurement::new(0.1, 0.015));
    }

    #[test]
    fn extra_columns_and_padding_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.csv",
            "sketch, real_jaccard, estimated, jaccard_error\nbeta, 0.5, 0.49, 0.02\n",
        );

        let table = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.records, vec![Measurement::new(0.5, 0.02)]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("data.csv"), &LoadOptions::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", "real_jaccard,error\n0.1,0.01\n");

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MissingColumn { column } => assert_eq!(column, "jaccard_error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_fails_with_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.csv",
            "real_jaccard,jaccard_error\n0.1,0.01\n0.2,oops\n",
        );

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::NonNumeric { column, row, value } => {
                assert_eq!(column, "jaccard_error");
                assert_eq!(row, 2);
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_cells_read_as_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", "real_jaccard,jaccard_error\n0.1,\n");

        let table = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.records[0].y.is_nan());
    }

    #[test]
    fn custom_delimiter_and_hue() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.csv",
            "k;real_jaccard;jaccard_error\n2;0.1;0.01\n3;0.1;0.03\n",
        );
        let options = LoadOptions {
            columns: Columns {
                hue: Some("k".to_string()),
                ..Columns::default()
            },
            delimiter: Some(b';'),
        };

        let table = load_file(&path, &options).unwrap();
        assert_eq!(table.records[1].group.as_deref(), Some("3"));
    }

    #[test]
    fn tsv_defaults_to_tab() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.tsv", "real_jaccard\tjaccard_error\n0.3\t0.05\n");

        let table = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.records, vec![Measurement::new(0.3, 0.05)]);
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.xlsx", "");

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn json_records_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.json",
            r#"[{"real_jaccard": 0.1, "jaccard_error": 0.01},
                {"real_jaccard": 0.2, "jaccard_error": null}]"#,
        );

        let table = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0], Measurement::new(0.1, 0.01));
        assert!(table.records[1].y.is_nan());
    }

    #[test]
    fn json_without_required_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.json", r#"[{"real_jaccard": 0.1}]"#);

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn json_rejects_non_numeric_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.json",
            r#"[{"real_jaccard": "high", "jaccard_error": 0.1}]"#,
        );

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NonNumeric { row: 1, .. }));
    }

    fn write_parquet(path: &Path, batch: RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_numeric_columns_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("real_jaccard", DataType::Float64, false),
            Field::new("jaccard_error", DataType::Float64, true),
            Field::new("sketches", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![0.1, 0.2])),
                Arc::new(Float64Array::from(vec![Some(0.01), None])),
                Arc::new(Int64Array::from(vec![2, 3])),
            ],
        )
        .unwrap();
        write_parquet(&path, batch);

        let options = LoadOptions {
            columns: Columns {
                hue: Some("sketches".to_string()),
                ..Columns::default()
            },
            delimiter: None,
        };
        let table = load_file(&path, &options).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].x, 0.1);
        assert!(table.records[1].y.is_nan());
        assert_eq!(table.records[1].group.as_deref(), Some("3"));
    }

    #[test]
    fn empty_parquet_without_error_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new(
            "real_jaccard",
            DataType::Float64,
            false,
        )]));
        let batch = RecordBatch::new_empty(schema);
        write_parquet(&path, batch);

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MissingColumn { column } => assert_eq!(column, "jaccard_error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn directory_path_is_io_error_not_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::create_dir(&path).unwrap();

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
        assert!(!err.is_not_found());
    }

    #[test]
    fn parquet_string_value_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("real_jaccard", DataType::Float64, false),
            Field::new("jaccard_error", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![0.1])),
                Arc::new(StringArray::from(vec!["n/a"])),
            ],
        )
        .unwrap();
        write_parquet(&path, batch);

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NonNumeric { .. }));
    }
}
