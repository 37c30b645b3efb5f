//! AI review generation pipeline.
//!
//! Two generators sit behind the [`ReviewGenerator`] trait: the real
//! Gemini adapter and a local mock. [`ReviewPipeline`] selects between
//! them per request (config flag first, then a live availability probe)
//! and falls back to the mock whenever the real adapter returns an error,
//! so a review request never fails just because the upstream API did.

mod gemini;
mod mock;

pub use gemini::{GeminiGenerator, GenerationProfile};
pub use mock::{CodeMetrics, Complexity, MockGenerator};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::config::{Config, AI_REQUEST_TIMEOUT, LARGE_CODE_THRESHOLD, MAX_CODE_LENGTH};
use crate::domain::{Language, ReviewStyle};
use crate::errors::{AppError, AppResult};

/// Failures a generator can report.
///
/// The pipeline inspects the variant and falls back to the mock on any
/// of them; the HTTP mapping only applies when no generator could run.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("request timed out")]
    Timeout,

    #[error("content blocked: {0}")]
    Blocked(String),

    #[error("quota or rate limit exceeded")]
    RateLimited,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("unexpected API response: {0}")]
    Malformed(String),
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Timeout => AppError::Timeout,
            AiError::Blocked(_) => AppError::ContentBlocked,
            AiError::RateLimited => AppError::RateLimited,
            AiError::Unavailable(s) => AppError::Unavailable(s),
            AiError::Api(msg) | AiError::Malformed(msg) => AppError::internal(msg),
        }
    }
}

/// Metadata describing how a review was produced
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetadata {
    /// Language of the reviewed code
    pub language: Language,
    /// Style the review was actually generated with
    pub review_style: ReviewStyle,
    /// Model that produced the text
    pub model: String,
    /// True when the mock generator produced the text
    pub is_mock: bool,
    /// True when the real adapter failed and the mock stood in
    pub fallback: bool,
    /// True when a detailed request was downgraded to concise
    pub downgraded: bool,
    /// Shallow code metrics (mock generator only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CodeMetrics>,
}

/// A generated review plus its provenance
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeneratedReview {
    pub review: String,
    pub metadata: ReviewMetadata,
}

/// A review generator: the real Gemini adapter or the local mock.
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    /// Generate a review for the given code
    async fn generate(
        &self,
        code: &str,
        language: Language,
        style: ReviewStyle,
    ) -> Result<GeneratedReview, AiError>;

    /// Probe whether this generator can currently serve requests
    async fn is_available(&self) -> bool;

    /// Model identifier reported in metadata and health checks
    fn model_name(&self) -> &str;

    /// Whether this generator is the mock
    fn is_mock(&self) -> bool;
}

/// AI service health report
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiHealth {
    pub service: &'static str,
    #[serde(rename = "type")]
    pub service_type: &'static str,
    pub model: String,
    pub status: &'static str,
    pub is_mock: bool,
    pub force_mock: bool,
}

/// Cached availability probe result
struct ProbeCache {
    ttl: Duration,
    last: RwLock<Option<(Instant, bool)>>,
}

/// Orchestrates generator selection, style downgrade and mock fallback.
pub struct ReviewPipeline {
    real: Option<Arc<dyn ReviewGenerator>>,
    mock: Arc<MockGenerator>,
    force_mock: bool,
    probe_cache: Option<ProbeCache>,
}

impl ReviewPipeline {
    /// Build the pipeline from configuration.
    ///
    /// Without an API key the real adapter is never constructed and every
    /// request is served by the mock.
    pub fn from_config(config: &Config) -> Self {
        let real: Option<Arc<dyn ReviewGenerator>> = config
            .gemini_api_key
            .as_ref()
            .map(|key| Arc::new(GeminiGenerator::new(key.clone())) as Arc<dyn ReviewGenerator>);

        if config.force_mock_ai {
            tracing::info!("USE_MOCK_AI set, mock generator selected for all requests");
        }

        let probe_cache = (config.ai_probe_cache_seconds > 0).then(|| ProbeCache {
            ttl: Duration::from_secs(config.ai_probe_cache_seconds),
            last: RwLock::new(None),
        });

        Self {
            real,
            mock: Arc::new(MockGenerator::new()),
            force_mock: config.force_mock_ai,
            probe_cache,
        }
    }

    /// Build a pipeline with explicit generators (tests).
    pub fn with_generators(
        real: Option<Arc<dyn ReviewGenerator>>,
        mock: Arc<MockGenerator>,
        force_mock: bool,
    ) -> Self {
        Self {
            real,
            mock,
            force_mock,
            probe_cache: None,
        }
    }

    /// Probe the real adapter, consulting the cache when configured.
    async fn real_available(&self, real: &dyn ReviewGenerator) -> bool {
        let Some(cache) = &self.probe_cache else {
            return real.is_available().await;
        };

        if let Some((at, available)) = *cache.last.read().await {
            if at.elapsed() < cache.ttl {
                return available;
            }
        }

        let available = real.is_available().await;
        *cache.last.write().await = Some((Instant::now(), available));
        available
    }

    /// Select the generator for one request.
    ///
    /// Force-mock wins unconditionally; otherwise the probe decides.
    /// A failed probe selects the mock instead of failing the request.
    async fn select(&self) -> Arc<dyn ReviewGenerator> {
        if self.force_mock {
            return self.mock.clone();
        }

        match &self.real {
            Some(real) if self.real_available(real.as_ref()).await => real.clone(),
            Some(_) => {
                tracing::warn!("Real AI service unavailable, falling back to mock generator");
                self.mock.clone()
            }
            None => self.mock.clone(),
        }
    }

    /// Generate a review, applying input bounds, the large-input style
    /// downgrade, and the mock fallback policy.
    pub async fn generate_review(
        &self,
        code: &str,
        language: Language,
        style: ReviewStyle,
    ) -> AppResult<GeneratedReview> {
        if code.trim().is_empty() {
            return Err(AppError::validation("Code is required for review"));
        }
        if code.len() > MAX_CODE_LENGTH {
            return Err(AppError::validation(format!(
                "Code must be between 1 and {} characters",
                MAX_CODE_LENGTH
            )));
        }

        // Large detailed requests are silently downgraded to bound the
        // upstream call; the downgrade is surfaced in metadata.
        let mut downgraded = false;
        let effective_style = if style == ReviewStyle::Detailed && code.len() > LARGE_CODE_THRESHOLD
        {
            tracing::info!(
                code_len = code.len(),
                "Large code sample, downgrading review style to concise"
            );
            downgraded = true;
            ReviewStyle::Concise
        } else {
            style
        };

        let generator = self.select().await;

        let mut result = if generator.is_mock() {
            // The mock cannot fail
            generator.generate(code, language, effective_style).await?
        } else {
            // Race the real call against the overall timeout. The loser
            // keeps running on the upstream side; only its result is
            // discarded here.
            let attempt =
                tokio::time::timeout(AI_REQUEST_TIMEOUT, generator.generate(code, language, effective_style))
                    .await
                    .unwrap_or(Err(AiError::Timeout));

            match attempt {
                Ok(review) => review,
                Err(e) => {
                    tracing::warn!(error = %e, "Real AI generator failed, falling back to mock");
                    let mut fallback = self.mock.generate(code, language, effective_style).await?;
                    fallback.metadata.fallback = true;
                    fallback
                }
            }
        };

        result.metadata.downgraded = downgraded;
        Ok(result)
    }

    /// Health report for the currently-selected generator.
    pub async fn health(&self) -> AiHealth {
        let generator = self.select().await;
        let available = generator.is_available().await;

        AiHealth {
            service: "AI Service",
            service_type: if generator.is_mock() {
                "Mock AI Service"
            } else {
                "Google Gemini API"
            },
            model: generator.model_name().to_string(),
            status: if available { "operational" } else { "unavailable" },
            is_mock: generator.is_mock(),
            force_mock: self.force_mock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GEMINI_MODEL;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mock_pipeline(force_mock: bool) -> ReviewPipeline {
        ReviewPipeline::with_generators(
            None,
            Arc::new(MockGenerator::with_delay(Duration::ZERO)),
            force_mock,
        )
    }

    /// Stand-in for the real adapter: probes as available, always errors.
    struct FailingGenerator {
        error: fn() -> AiError,
        calls: AtomicUsize,
    }

    impl FailingGenerator {
        fn new(error: fn() -> AiError) -> Self {
            Self {
                error,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReviewGenerator for FailingGenerator {
        async fn generate(
            &self,
            _code: &str,
            _language: Language,
            _style: ReviewStyle,
        ) -> Result<GeneratedReview, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.error)())
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            GEMINI_MODEL
        }

        fn is_mock(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_real_failure_falls_back_to_mock() {
        for error in [
            (|| AiError::Timeout) as fn() -> AiError,
            || AiError::Blocked("safety".into()),
            || AiError::RateLimited,
            || AiError::Api("boom".into()),
            || AiError::Malformed("no candidates".into()),
        ] {
            let pipeline = ReviewPipeline::with_generators(
                Some(Arc::new(FailingGenerator::new(error))),
                Arc::new(MockGenerator::with_delay(Duration::ZERO)),
                false,
            );

            let result = pipeline
                .generate_review("fn main() {}", Language::Rust, ReviewStyle::Detailed)
                .await
                .unwrap();

            assert!(result.metadata.fallback);
            assert!(result.metadata.is_mock);
            assert!(!result.review.is_empty());
        }
    }

    #[tokio::test]
    async fn test_force_mock_never_calls_real_generator() {
        let real = Arc::new(FailingGenerator::new(|| AiError::Timeout));
        let pipeline = ReviewPipeline::with_generators(
            Some(real.clone()),
            Arc::new(MockGenerator::with_delay(Duration::ZERO)),
            true,
        );

        let result = pipeline
            .generate_review("fn main() {}", Language::Rust, ReviewStyle::Detailed)
            .await
            .unwrap();

        assert!(result.metadata.is_mock);
        assert!(!result.metadata.fallback);
        assert_eq!(real.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_force_mock_selects_mock() {
        let pipeline = mock_pipeline(true);
        let result = pipeline
            .generate_review("fn main() {}", Language::Rust, ReviewStyle::Detailed)
            .await
            .unwrap();

        assert!(result.metadata.is_mock);
        assert!(!result.metadata.fallback);
        assert!(!result.review.is_empty());
    }

    #[tokio::test]
    async fn test_no_api_key_selects_mock() {
        let pipeline = mock_pipeline(false);
        let result = pipeline
            .generate_review("print('hi')", Language::Python, ReviewStyle::Concise)
            .await
            .unwrap();

        assert!(result.metadata.is_mock);
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let pipeline = mock_pipeline(true);
        let result = pipeline
            .generate_review("   ", Language::Javascript, ReviewStyle::Detailed)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_oversized_code_rejected_before_generation() {
        let pipeline = mock_pipeline(true);
        let code = "x".repeat(MAX_CODE_LENGTH + 1);
        let result = pipeline
            .generate_review(&code, Language::Javascript, ReviewStyle::Detailed)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_large_detailed_request_downgrades_to_concise() {
        let pipeline = mock_pipeline(true);
        let code = "let x = 1;\n".repeat(600);
        assert!(code.len() > LARGE_CODE_THRESHOLD);

        let result = pipeline
            .generate_review(&code, Language::Javascript, ReviewStyle::Detailed)
            .await
            .unwrap();

        assert!(result.metadata.downgraded);
        assert_eq!(result.metadata.review_style, ReviewStyle::Concise);
    }

    #[tokio::test]
    async fn test_concise_request_never_marked_downgraded() {
        let pipeline = mock_pipeline(true);
        let code = "let x = 1;\n".repeat(600);

        let result = pipeline
            .generate_review(&code, Language::Javascript, ReviewStyle::Concise)
            .await
            .unwrap();

        assert!(!result.metadata.downgraded);
        assert_eq!(result.metadata.review_style, ReviewStyle::Concise);
    }

    #[tokio::test]
    async fn test_health_reports_mock() {
        let pipeline = mock_pipeline(true);
        let health = pipeline.health().await;

        assert!(health.is_mock);
        assert!(health.force_mock);
        assert_eq!(health.status, "operational");
        assert_eq!(health.model, "mock");
    }

    #[test]
    fn test_ai_error_status_mapping() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let cases = [
            (AiError::Timeout, StatusCode::REQUEST_TIMEOUT),
            (
                AiError::Blocked("safety".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                AiError::Unavailable("Gemini".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
