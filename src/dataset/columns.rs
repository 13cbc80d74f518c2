//! Header parsing and column lookup for earthquake CSV files.

use serde::Serialize;

use crate::types::EarthquakeRecord;

/// Split a CSV line on commas, honouring double-quoted fields.
pub(crate) fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Quote a field for CSV output when it contains a delimiter or quote.
pub(crate) fn csv_escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ============================================================================
// Numeric Columns
// ============================================================================

/// The numeric columns every dataset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Magnitude,
    Latitude,
    Longitude,
    Depth,
}

impl NumericColumn {
    pub const ALL: [Self; 4] = [Self::Magnitude, Self::Latitude, Self::Longitude, Self::Depth];

    /// Column name used in JSON and CSV output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Magnitude => "magnitude",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Depth => "depth",
        }
    }

    /// Header name used by the source dataset.
    pub fn source_name(self) -> &'static str {
        match self {
            Self::Magnitude => "Magnitud",
            Self::Latitude => "Latitud",
            Self::Longitude => "Longitud",
            Self::Depth => "Profundidad",
        }
    }

    /// Axis label for charts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Magnitude => "Magnitude",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::Depth => "Depth (km)",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name) || c.source_name().eq_ignore_ascii_case(name))
    }

    pub fn value(self, record: &EarthquakeRecord) -> f64 {
        match self {
            Self::Magnitude => record.magnitude(),
            Self::Latitude => record.latitude(),
            Self::Longitude => record.longitude(),
            Self::Depth => record.depth(),
        }
    }
}

impl std::fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Maps header names to field indices.
#[derive(Debug, Clone, Default)]
pub(crate) struct ColumnMap {
    pub magnitude: Option<usize>,
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
    pub depth: Option<usize>,
    pub severity: Option<usize>,
    pub location: Option<usize>,
}

impl ColumnMap {
    /// Build the map from a header line. Unknown columns are ignored; the
    /// first occurrence of a recognised name wins.
    pub fn from_header(headers: &[String]) -> Self {
        let mut map = Self::default();
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim().trim_start_matches('\u{feff}').to_lowercase();
            let slot = match name.as_str() {
                "magnitud" | "magnitude" | "mag" => &mut map.magnitude,
                "latitud" | "latitude" | "lat" => &mut map.latitude,
                "longitud" | "longitude" | "lon" | "lng" => &mut map.longitude,
                "profundidad" | "depth" | "depth_km" => &mut map.depth,
                "gravedad" | "severity" => &mut map.severity,
                "localidad" | "location" | "place" => &mut map.location,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    /// Required numeric columns absent from the header, in model order.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for column in NumericColumn::ALL {
            if self.index_of(column).is_none() {
                missing.push(column.source_name().to_string());
            }
        }
        missing
    }

    pub fn index_of(&self, column: NumericColumn) -> Option<usize> {
        match column {
            NumericColumn::Magnitude => self.magnitude,
            NumericColumn::Latitude => self.latitude,
            NumericColumn::Longitude => self.longitude,
            NumericColumn::Depth => self.depth,
        }
    }
}
