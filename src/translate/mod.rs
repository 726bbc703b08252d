//! Translation pipeline: cache-fronted, single-attempt remote lookup.
//! All failures degrade to "no translation"; nothing propagates to the caller.

pub mod cache;
pub mod mymemory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::metrics::{metric_names, LookupIds, MetricsRegistry};
use cache::TranslationCache;

/// One remote lookup.
#[derive(Debug, Clone, Serialize)]
pub struct LookupRequest {
    pub word: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Remote lookup backend (adapter for different translation endpoints).
#[async_trait]
pub trait LookupBackend: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> Result<String, LookupError>;
}

#[derive(Debug)]
pub enum LookupError {
    Network(String),
    Status(u16),
    Api(String),
    Malformed(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Network(msg) => write!(f, "network error: {msg}"),
            LookupError::Status(code) => write!(f, "unexpected HTTP status {code}"),
            LookupError::Api(msg) => write!(f, "lookup API error: {msg}"),
            LookupError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Cache-fronted translation client. One attempt per word, no retry.
pub struct TranslationService {
    backend: Arc<dyn LookupBackend>,
    cache: Arc<TranslationCache>,
    metrics: Arc<MetricsRegistry>,
    source_lang: String,
}

impl TranslationService {
    pub fn new(
        backend: Arc<dyn LookupBackend>,
        cache: Arc<TranslationCache>,
        metrics: Arc<MetricsRegistry>,
        source_lang: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            metrics,
            source_lang: source_lang.into(),
        }
    }

    /// Translate `word` into `target_lang`. Returns None when no usable
    /// translation exists: remote failure, empty payload, or a translation
    /// that merely echoes the input back (a common failure mode of free
    /// translation APIs for unrecognized input). Echoes are not cached.
    pub async fn translate(
        &self,
        ids: &LookupIds,
        word: &str,
        target_lang: &str,
    ) -> Option<String> {
        if let Some(hit) = self.cache.get(word, target_lang) {
            debug!(
                request_id = %ids.request_id,
                word,
                target_lang,
                "lookup_cache_hit"
            );
            return Some(hit);
        }

        let request = LookupRequest {
            word: word.to_string(),
            source_lang: self.source_lang.clone(),
            target_lang: target_lang.to_string(),
        };

        let span = self.metrics.span(metric_names::LOOKUP_DONE);
        let outcome = self.backend.lookup(&request).await;
        span.finish();

        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    request_id = %ids.request_id,
                    word,
                    target_lang,
                    error = %e,
                    "lookup_failed"
                );
                return None;
            }
        };

        let translated = text.trim();
        if translated.is_empty() {
            debug!(request_id = %ids.request_id, word, "lookup_empty");
            return None;
        }
        if translated.to_lowercase() == word.to_lowercase() {
            // The endpoint echoed the word back; treat as "no translation"
            // and keep it out of the cache.
            debug!(request_id = %ids.request_id, word, "lookup_echo_suppressed");
            return None;
        }

        self.cache
            .insert(word, target_lang, translated.to_string());
        Some(translated.to_string())
    }
}
