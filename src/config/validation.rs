//! Config validation: unknown-key detection with Levenshtein suggestions
//! and suspicious-value checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for AppConfig.
///
/// Maintained by hand to match the struct hierarchy in app_config.rs.
/// Any new field added to AppConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        // [data]
        "data",
        "data.dataset_path",
        "data.max_upload_mb",
        "data.preview_rows",
        "data.random_rows",
        // [model]
        "model",
        "model.artifact_path",
        // [llm]
        "llm",
        "llm.endpoint",
        "llm.model",
        "llm.api_key_env",
        "llm.timeout_secs",
        "llm.cache_ttl_secs",
        "llm.cache_max_entries",
        // [validation]
        "validation",
        "validation.magnitude_min",
        "validation.magnitude_max",
        "validation.depth_min",
        "validation.latitude_min",
        "validation.latitude_max",
        "validation.longitude_min",
        "validation.longitude_max",
        // [charts]
        "charts",
        "charts.map_zoom",
        "charts.map_style",
        "charts.histogram_bins",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        // Ties resolve alphabetically so the suggestion is stable across runs
        let better = match best {
            None => true,
            Some((best_key, best_dist)) => dist < best_dist || (dist == best_dist && k < best_key),
        };
        if better {
            best = Some((k, dist));
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(&key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key,
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Suspicious Value Checks
// ============================================================================

/// Values that are legal but probably a mistake.
pub fn validate_suspicious_values(config: &super::AppConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if config.llm.timeout_secs > 120 {
        warnings.push(ValidationWarning {
            field: "llm.timeout_secs".to_string(),
            message: format!(
                "llm.timeout_secs = {} lets a slow provider stall a page for over two minutes",
                config.llm.timeout_secs
            ),
            suggestion: None,
        });
    }

    if config.data.max_upload_mb > 1024 {
        warnings.push(ValidationWarning {
            field: "data.max_upload_mb".to_string(),
            message: format!(
                "data.max_upload_mb = {} exceeds 1 GB; uploads are parsed in memory",
                config.data.max_upload_mb
            ),
            suggestion: None,
        });
    }

    if config.charts.histogram_bins > 200 {
        warnings.push(ValidationWarning {
            field: "charts.histogram_bins".to_string(),
            message: format!(
                "charts.histogram_bins = {} is unusually high (typical 10-50)",
                config.charts.histogram_bins
            ),
            suggestion: None,
        });
    }

    let v = &config.validation;
    if v.magnitude_max > 10.0 || v.magnitude_min < 0.0 {
        warnings.push(ValidationWarning {
            field: "validation.magnitude_max".to_string(),
            message: format!(
                "magnitude bounds {:.1}-{:.1} extend beyond the Richter range (0-10)",
                v.magnitude_min, v.magnitude_max
            ),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
