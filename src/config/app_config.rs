//! Application configuration - every tunable as a TOML value
//!
//! Each section implements `Default` with the built-in values, so a missing
//! file or a partial file yields a complete configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "QUAKE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "quake_grade.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `AppConfig::load()` which searches:
/// 1. `$QUAKE_CONFIG` env var
/// 2. `./quake_grade.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dataset locations and upload limits
    #[serde(default)]
    pub data: DataConfig,

    /// Classifier artifact
    #[serde(default)]
    pub model: ModelConfig,

    /// Hosted LLM provider
    #[serde(default)]
    pub llm: LlmConfig,

    /// Record validation rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Chart presentation
    #[serde(default)]
    pub charts: ChartConfig,
}

impl AppConfig {
    /// Load configuration using the standard search order:
    /// 1. `$QUAKE_CONFIG` environment variable
    /// 2. `./quake_grade.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents, path)
    }

    /// Parse and validate TOML text. `origin` is only used in error messages.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
        config.validate()?;

        for w in super::validation::validate_suspicious_values(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Validate internal consistency.
    ///
    /// Rules:
    /// - Every min must be below its max, and all bounds must be finite
    /// - Limits used as sizes or timeouts must be non-zero
    /// - Paths and endpoints must be non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.validation;
        let mut errors: Vec<String> = Vec::new();

        Self::check_range(v.magnitude_min, v.magnitude_max, "validation.magnitude", &mut errors);
        Self::check_range(v.latitude_min, v.latitude_max, "validation.latitude", &mut errors);
        Self::check_range(v.longitude_min, v.longitude_max, "validation.longitude", &mut errors);
        if !v.depth_min.is_finite() {
            errors.push(format!("validation.depth_min must be finite (got {})", v.depth_min));
        }

        if self.data.max_upload_mb == 0 {
            errors.push("data.max_upload_mb must be > 0".to_string());
        }
        if self.data.dataset_path.as_os_str().is_empty() {
            errors.push("data.dataset_path must not be empty".to_string());
        }
        if self.model.artifact_path.as_os_str().is_empty() {
            errors.push("model.artifact_path must not be empty".to_string());
        }
        if self.llm.timeout_secs == 0 {
            errors.push("llm.timeout_secs must be > 0".to_string());
        }
        if self.llm.endpoint.trim().is_empty() {
            errors.push("llm.endpoint must not be empty".to_string());
        }
        if self.llm.model.trim().is_empty() {
            errors.push("llm.model must not be empty".to_string());
        }
        if self.charts.histogram_bins == 0 {
            errors.push("charts.histogram_bins must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_range(min: f64, max: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass
        if !min.is_finite() || !max.is_finite() {
            errors.push(format!(
                "{name}: bounds must be finite (got min={min}, max={max})"
            ));
            return;
        }
        if min >= max {
            errors.push(format!("{name}: min ({min:.3}) must be < max ({max:.3})"));
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Base dataset CSV loaded at startup
    pub dataset_path: PathBuf,
    /// Largest accepted CSV upload in megabytes
    pub max_upload_mb: u64,
    /// Rows included in the dataset preview
    pub preview_rows: usize,
    /// Rows in a generated random dataset (0 = same as the base dataset)
    pub random_rows: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(defaults::DATASET_PATH),
            max_upload_mb: defaults::MAX_UPLOAD_MB,
            preview_rows: defaults::PREVIEW_ROWS,
            random_rows: 0,
        }
    }
}

impl DataConfig {
    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Serialized classifier (JSON)
    pub artifact_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(defaults::MODEL_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub endpoint: String,
    /// Chat model name
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Bound on a single completion call
    pub timeout_secs: u64,
    /// Lifetime of cached dataset analyses
    pub cache_ttl_secs: u64,
    /// Maximum cached dataset analyses
    pub cache_max_entries: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::LLM_ENDPOINT.to_string(),
            model: defaults::LLM_MODEL.to_string(),
            api_key_env: defaults::LLM_API_KEY_ENV.to_string(),
            timeout_secs: defaults::LLM_TIMEOUT_SECS,
            cache_ttl_secs: defaults::INSIGHT_CACHE_TTL_SECS,
            cache_max_entries: defaults::INSIGHT_CACHE_MAX_ENTRIES,
        }
    }
}

/// Declarative bounds applied to every earthquake record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Richter scale lower bound
    pub magnitude_min: f64,
    /// Richter scale upper bound
    pub magnitude_max: f64,
    /// Minimum depth (km)
    pub depth_min: f64,
    pub latitude_min: f64,
    pub latitude_max: f64,
    pub longitude_min: f64,
    pub longitude_max: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            magnitude_min: 0.0,
            magnitude_max: 10.0,
            depth_min: 0.0,
            latitude_min: -90.0,
            latitude_max: 90.0,
            longitude_min: -180.0,
            longitude_max: 180.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub map_zoom: u8,
    pub map_style: String,
    pub histogram_bins: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            map_zoom: defaults::MAP_ZOOM,
            map_style: defaults::MAP_STYLE.to_string(),
            histogram_bins: defaults::HISTOGRAM_BINS,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}
