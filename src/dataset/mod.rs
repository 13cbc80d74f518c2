//! Earthquake dataset loading
//!
//! Reads a CSV file (or an uploaded CSV body) into an immutable [`Table`].
//! The header is mapped by name, so the source layout
//! (`Magnitud,Latitud,Longitud,Profundidad,Gravedad`) and English names are
//! both accepted in any column order. Every required cell must parse as a
//! finite number; the first bad cell aborts the load, so a `Table` is never
//! built from partial data.

mod columns;
mod random;

pub use columns::NumericColumn;
pub(crate) use columns::{csv_escape, csv_split};
pub use random::generate_random;

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::types::{EarthquakeRecord, Severity};
use columns::ColumnMap;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("Failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset '{0}' contains no data rows")]
    Empty(String),

    #[error("Dataset is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Line {line}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },
}

// ============================================================================
// Table
// ============================================================================

/// One row of the table as shown in previews.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    #[serde(flatten)]
    pub record: EarthquakeRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Immutable in-memory earthquake table.
///
/// `records` and `observed` always have the same length. The observed
/// severity is the label present in the file, kept for display only.
#[derive(Debug, Clone)]
pub struct Table {
    source: String,
    headers: Vec<String>,
    records: Vec<EarthquakeRecord>,
    observed: Vec<Option<Severity>>,
    has_severity: bool,
    missing_values: usize,
}

impl Table {
    /// Build a table from already-parsed records.
    pub fn from_records(
        source: impl Into<String>,
        records: Vec<EarthquakeRecord>,
        observed: Option<Vec<Option<Severity>>>,
    ) -> Self {
        let has_severity = observed.is_some();
        let observed = observed.unwrap_or_else(|| vec![None; records.len()]);
        debug_assert_eq!(records.len(), observed.len());

        let mut headers: Vec<String> = NumericColumn::ALL
            .iter()
            .map(|c| c.source_name().to_string())
            .collect();
        if has_severity {
            headers.push("Gravedad".to_string());
        }
        let missing_values = if has_severity {
            observed.iter().filter(|o| o.is_none()).count()
        } else {
            0
        };

        Self {
            source: source.into(),
            headers,
            records,
            observed,
            has_severity,
            missing_values,
        }
    }

    /// Name of the file or upload the table came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Header fields as read.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EarthquakeRecord] {
        &self.records
    }

    /// Observed severity labels, one per row.
    pub fn observed(&self) -> &[Option<Severity>] {
        &self.observed
    }

    /// Whether the file carried a severity column.
    pub fn has_severity(&self) -> bool {
        self.has_severity
    }

    /// Blank cells in optional columns (severity, location).
    pub fn missing_values(&self) -> usize {
        self.missing_values
    }

    /// All values of one numeric column, in row order.
    pub fn column(&self, column: NumericColumn) -> Vec<f64> {
        self.records.iter().map(|r| column.value(r)).collect()
    }

    /// First `n` rows.
    pub fn preview(&self, n: usize) -> Vec<TableRow> {
        self.records
            .iter()
            .zip(&self.observed)
            .take(n)
            .map(|(record, severity)| TableRow {
                record: record.clone(),
                severity: *severity,
            })
            .collect()
    }

    /// Rows that exactly repeat an earlier row.
    pub fn duplicate_rows(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.records.len());
        let mut duplicates = 0;
        for (record, severity) in self.records.iter().zip(&self.observed) {
            let key = (
                record.magnitude().to_bits(),
                record.latitude().to_bits(),
                record.longitude().to_bits(),
                record.depth().to_bits(),
                record.location().map(str::to_string),
                severity.map(Severity::index),
            );
            if !seen.insert(key) {
                duplicates += 1;
            }
        }
        duplicates
    }

    /// MD5 digest of everything the dataset analyses read: headers, cell
    /// values, location labels and blank-cell count. Used as a cache key.
    pub fn content_hash(&self) -> String {
        let mut ctx = md5::Context::new();
        for header in &self.headers {
            ctx.consume(header.trim().as_bytes());
            ctx.consume(b"\x1f");
        }
        ctx.consume(b"\n");
        for (record, severity) in self.records.iter().zip(&self.observed) {
            for value in record.features() {
                ctx.consume(value.to_le_bytes());
            }
            let label = severity.map_or("-", Severity::source_label);
            ctx.consume(label.as_bytes());
            ctx.consume(b"\x1f");
            ctx.consume(record.location().unwrap_or("").as_bytes());
            ctx.consume(b"\n");
        }
        ctx.consume(self.missing_values.to_le_bytes());
        format!("{:x}", ctx.compute())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a dataset from disk.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Table, DataLoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path.display().to_string();
    let table = parse_csv(&name, &text)?;

    tracing::info!(
        file = %name,
        rows = table.len(),
        labelled = table.has_severity(),
        "Dataset loaded"
    );
    Ok(table)
}

/// Parse CSV text into a table. `name` identifies the source in messages.
pub fn parse_csv(name: &str, text: &str) -> Result<Table, DataLoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| DataLoadError::Empty(name.to_string()))?;
    let headers = csv_split(header_line);
    let col_map = ColumnMap::from_header(&headers);

    let missing = col_map.missing_required();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    let mut observed = Vec::new();
    let mut missing_values = 0usize;

    for (line_num, line) in lines {
        let fields = csv_split(line);
        let (record, severity, blanks) = parse_row(&fields, &headers, &col_map, line_num)?;
        records.push(record);
        observed.push(severity);
        missing_values += blanks;
    }

    if records.is_empty() {
        return Err(DataLoadError::Empty(name.to_string()));
    }

    Ok(Table {
        source: name.to_string(),
        headers: headers.iter().map(|h| h.trim().to_string()).collect(),
        records,
        observed,
        has_severity: col_map.severity.is_some(),
        missing_values,
    })
}

fn parse_row(
    fields: &[String],
    headers: &[String],
    col_map: &ColumnMap,
    line: usize,
) -> Result<(EarthquakeRecord, Option<Severity>, usize), DataLoadError> {
    let cell = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");
    let header = |idx: usize| headers.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();

    let mut values = [0.0; 4];
    for (slot, column) in values.iter_mut().zip(NumericColumn::ALL) {
        // Required columns were checked before any row is parsed
        let Some(idx) = col_map.index_of(column) else {
            return Err(DataLoadError::MissingColumns(vec![column.source_name().to_string()]));
        };
        let raw = cell(idx);
        *slot = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DataLoadError::InvalidValue {
                line,
                column: header(idx),
                value: raw.to_string(),
            })?;
    }
    let [magnitude, latitude, longitude, depth] = values;
    let mut record = EarthquakeRecord::new(magnitude, depth, latitude, longitude);

    let mut blanks = 0;
    let mut severity = None;
    if let Some(idx) = col_map.severity {
        let raw = cell(idx);
        if raw.is_empty() {
            blanks += 1;
        } else {
            severity = Some(Severity::from_label(raw).ok_or_else(|| {
                DataLoadError::InvalidValue {
                    line,
                    column: header(idx),
                    value: raw.to_string(),
                }
            })?);
        }
    }
    if let Some(idx) = col_map.location {
        let raw = cell(idx);
        if raw.is_empty() {
            blanks += 1;
        } else {
            record = record.with_location(raw);
        }
    }

    Ok((record, severity, blanks))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Magnitud,Latitud,Longitud,Profundidad,Gravedad
5.2,16.9,-99.8,12.0,Media
7.1,18.4,-98.7,57.0,Muy Alta
4.0,15.7,-96.1,35.5,Baja
";

    #[test]
    fn test_parse_source_layout() {
        let table = parse_csv("sample.csv", SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.has_severity());
        assert_eq!(table.observed()[1], Some(Severity::VeryHigh));
        let first = &table.records()[0];
        assert!((first.magnitude() - 5.2).abs() < 1e-12);
        assert!((first.depth() - 12.0).abs() < 1e-12);
        assert!((first.latitude() - 16.9).abs() < 1e-12);
        assert!((first.longitude() + 99.8).abs() < 1e-12);
    }

    #[test]
    fn test_missing_column_fails_without_partial_table() {
        let text = "Magnitud,Latitud,Profundidad\n5.0,10.0,3.0\n";
        match parse_csv("bad.csv", text) {
            Err(DataLoadError::MissingColumns(cols)) => assert_eq!(cols, vec!["Longitud"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_cell_is_rejected() {
        let text = "magnitude,latitude,longitude,depth\n5.0,10.0,-99.0,abc\n";
        match parse_csv("bad.csv", text) {
            Err(DataLoadError::InvalidValue { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "depth");
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_cell_is_rejected() {
        let text = "magnitude,latitude,longitude,depth\nNaN,10.0,-99.0,5\n";
        assert!(matches!(
            parse_csv("nan.csv", text),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_severity_label_is_rejected() {
        let text = "Magnitud,Latitud,Longitud,Profundidad,Gravedad\n5,1,1,1,Catastrophic\n";
        assert!(matches!(
            parse_csv("labels.csv", text),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let text = "Magnitud,Latitud,Longitud,Profundidad\n\n";
        assert!(matches!(parse_csv("empty.csv", text), Err(DataLoadError::Empty(_))));
        assert!(matches!(parse_csv("blank.csv", ""), Err(DataLoadError::Empty(_))));
    }

    #[test]
    fn test_blank_optional_cells_count_as_missing() {
        let text = "Magnitud,Latitud,Longitud,Profundidad,Gravedad,Localidad\n5,1,1,1,,\n6,2,2,2,Alta,Colima\n";
        let table = parse_csv("gaps.csv", text).unwrap();
        assert_eq!(table.missing_values(), 2);
        assert_eq!(table.observed()[0], None);
        assert_eq!(table.records()[1].location(), Some("Colima"));
    }

    #[test]
    fn test_duplicates_and_hash() {
        let text = "magnitude,latitude,longitude,depth\n5,1,1,1\n5,1,1,1\n6,1,1,1\n";
        let table = parse_csv("dups.csv", text).unwrap();
        assert_eq!(table.duplicate_rows(), 1);

        let again = parse_csv("other-name.csv", text).unwrap();
        assert_eq!(table.content_hash(), again.content_hash());

        let changed = parse_csv("dups.csv", "magnitude,latitude,longitude,depth\n5,1,1,2\n").unwrap();
        assert_ne!(table.content_hash(), changed.content_hash());
    }

    #[test]
    fn test_hash_covers_columns_and_labels() {
        let plain = parse_csv("a.csv", "Magnitud,Latitud,Longitud,Profundidad\n5,1,1,1\n6,2,2,2\n").unwrap();
        let extra = parse_csv(
            "b.csv",
            "Magnitud,Latitud,Longitud,Profundidad,Localidad,Extra\n5,1,1,1,,x\n6,2,2,2,,y\n",
        )
        .unwrap();
        let labelled = parse_csv(
            "c.csv",
            "Magnitud,Latitud,Longitud,Profundidad,Localidad,Extra\n5,1,1,1,Oaxaca,x\n6,2,2,2,,y\n",
        )
        .unwrap();

        assert_eq!(plain.records(), extra.records());
        assert_ne!(plain.content_hash(), extra.content_hash());
        assert_ne!(extra.content_hash(), labelled.content_hash());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_dataset("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}
