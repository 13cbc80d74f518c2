//! Insight service: one bounded attempt, never an error that stops a page.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::prompts::{self, AnalysisKind};
use super::summary::{DataSummary, QualitySummary, RiskSummary};
use super::{ChatRequest, LlmBackend, LlmError, OpenAiBackend};
use crate::config::LlmConfig;
use crate::dataset::Table;
use crate::types::{EarthquakeRecord, PredictedRow, SeverityPrediction};

/// Narrative text returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightText {
    pub text: String,
    /// Served from the analysis cache
    pub cached: bool,
}

/// Why no insight is available. Always safe to show to a user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsightUnavailable {
    #[error("AI insights are disabled (no API key configured)")]
    Disabled,

    #[error("The AI provider did not answer within {0} s")]
    Timeout(u64),

    #[error("The AI provider returned an error: {0}")]
    Provider(String),

    #[error("The AI provider returned an unusable response: {0}")]
    MalformedResponse(String),
}

impl InsightUnavailable {
    /// Stable machine-readable tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Timeout(_) => "timeout",
            Self::Provider(_) => "provider",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

// ============================================================================
// Analysis Cache
// ============================================================================

struct CacheEntry {
    text: String,
    inserted: Instant,
}

/// Dataset analyses keyed by (kind, table content hash).
struct AnalysisCache {
    entries: HashMap<(AnalysisKind, String), CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl AnalysisCache {
    fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries,
        }
    }

    fn get(&mut self, key: &(AnalysisKind, String)) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => return Some(entry.text.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn insert(&mut self, key: (AnalysisKind, String), text: String) {
        if self.max_entries == 0 {
            return;
        }
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.inserted.elapsed() < ttl);
        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.inserted)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    self.entries.remove(&k);
                }
                None => break,
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                text,
                inserted: Instant::now(),
            },
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// Service
// ============================================================================

pub struct InsightService {
    backend: Option<Arc<dyn LlmBackend>>,
    timeout: Duration,
    cache: Mutex<AnalysisCache>,
}

impl std::fmt::Debug for InsightService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightService")
            .field("backend", &self.backend_name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl InsightService {
    /// Service over an explicit backend.
    pub fn new(backend: Arc<dyn LlmBackend>, config: &LlmConfig) -> Self {
        Self {
            backend: Some(backend),
            timeout: Duration::from_secs(config.timeout_secs),
            cache: Mutex::new(AnalysisCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_max_entries,
            )),
        }
    }

    /// Service that answers every call with [`InsightUnavailable::Disabled`].
    pub fn disabled() -> Self {
        let config = LlmConfig::default();
        Self {
            backend: None,
            timeout: Duration::from_secs(config.timeout_secs),
            cache: Mutex::new(AnalysisCache::new(Duration::ZERO, 0)),
        }
    }

    /// Build from config, reading the API key from the configured
    /// environment variable. A missing key or client failure yields a
    /// disabled service.
    pub fn from_config(config: &LlmConfig) -> Self {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                warn!(
                    env = %config.api_key_env,
                    "No LLM API key set, AI insights disabled"
                );
                return Self::disabled();
            }
        };

        match OpenAiBackend::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        ) {
            Ok(backend) => {
                info!(
                    endpoint = %config.endpoint,
                    model = %config.model,
                    timeout_secs = config.timeout_secs,
                    "💬 AI insights enabled"
                );
                Self::new(Arc::new(backend), config)
            }
            Err(e) => {
                warn!(error = %e, "Failed to build LLM client, AI insights disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|b| b.backend_name())
    }

    /// Number of cached dataset analyses.
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Narrative for one classified record.
    pub async fn generate_insight(
        &self,
        record: &EarthquakeRecord,
        prediction: &SeverityPrediction,
    ) -> Result<InsightText, InsightUnavailable> {
        let request = prompts::record_prompt(record, prediction);
        let text = self.complete(&request, "record").await?;
        Ok(InsightText { text, cached: false })
    }

    /// Dataset-level analysis. Results are cached per table content.
    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        table: &Table,
        predictions: &[PredictedRow],
    ) -> Result<InsightText, InsightUnavailable> {
        if !self.is_available() {
            return Err(InsightUnavailable::Disabled);
        }

        let key = (kind, table.content_hash());
        let cached = self.cache.lock().await.get(&key);
        if let Some(text) = cached {
            debug!(kind = %kind, "Analysis served from cache");
            return Ok(InsightText { text, cached: true });
        }

        let request = match kind {
            AnalysisKind::Insights => prompts::insights_prompt(&DataSummary::from_predictions(predictions)),
            AnalysisKind::Risk => prompts::risk_prompt(&RiskSummary::from_predictions(predictions)),
            AnalysisKind::Quality => prompts::quality_prompt(&QualitySummary::from_table(table)),
        };
        let text = self.complete(&request, kind.as_str()).await?;

        self.cache.lock().await.insert(key, text.clone());
        Ok(InsightText { text, cached: false })
    }

    /// Single best-effort call bounded by the configured timeout.
    async fn complete(&self, request: &ChatRequest, purpose: &str) -> Result<String, InsightUnavailable> {
        let backend = self.backend.as_ref().ok_or(InsightUnavailable::Disabled)?;

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, backend.complete(request)).await;

        let result = match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(LlmError::Timeout)) | Err(_) => Err(InsightUnavailable::Timeout(self.timeout.as_secs())),
            Ok(Err(LlmError::MalformedResponse(msg))) => Err(InsightUnavailable::MalformedResponse(msg)),
            Ok(Err(e @ (LlmError::Api { .. } | LlmError::Transport(_)))) => {
                Err(InsightUnavailable::Provider(e.to_string()))
            }
        };

        match &result {
            Ok(text) => debug!(
                purpose,
                backend = backend.backend_name(),
                chars = text.len(),
                latency_ms = started.elapsed().as_millis() as u64,
                "LLM completion succeeded"
            ),
            Err(e) => warn!(
                purpose,
                backend = backend.backend_name(),
                reason = e.reason(),
                error = %e,
                "LLM insight unavailable"
            ),
        }
        result
    }
}
