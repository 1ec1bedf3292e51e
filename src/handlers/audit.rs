//! # Transcript Audit Handlers
//!
//! Score a hypothesis transcript against a reference with WER.
//!
//! ## Endpoints:
//! - `POST /api/v1/audit/text` - both transcripts supplied as text
//! - `POST /api/v1/audit/audio` - hypothesis produced by transcribing an audio URL
//!
//! Scoring runs on the blocking thread pool. The table is quadratic in input
//! length, so inputs above `audit.max_words` or `audit.max_alignment_cells`
//! are rejected first.

use crate::config::AuditConfig;
use crate::error::{AppError, AppResult};
use crate::provider::TranscribeOptions;
use crate::state::AppState;
use crate::wer::{self, InputLimits, WerError, WerReport};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Request body for `POST /api/v1/audit/text`.
///
/// Missing fields deserialize as empty strings and are rejected as invalid input.
#[derive(Debug, Deserialize)]
pub struct AuditTextRequest {
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub hypothesis: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditAudioRequest {
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub hypothesis_url: String,
}

#[derive(Debug, Serialize)]
pub struct AuditTextResponse {
    pub reference: String,
    pub hypothesis: String,
    pub reference_word_count: usize,
    pub hypothesis_word_count: usize,
    pub wer: f64,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

#[derive(Debug, Serialize)]
pub struct AuditAudioResponse {
    pub reference: String,
    pub hypothesis_url: String,
    pub hypothesis_transcript: String,
    pub reference_word_count: usize,
    pub hypothesis_word_count: usize,
    pub wer: f64,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

/// Validate, bound and score one pair. Emptiness is checked before size so an
/// empty side is always reported as invalid input.
fn score_transcripts(reference: &str, hypothesis: &str, limits: &InputLimits) -> Result<WerReport, WerError> {
    if reference.is_empty() || hypothesis.is_empty() {
        return Err(WerError::InvalidInput);
    }
    wer::check_input_size(reference, hypothesis, limits)?;
    wer::compute_word_error_rate(reference, hypothesis)
}

/// Run [`score_transcripts`] off the async workers and hand the inputs back.
async fn score_blocking(
    reference: String,
    hypothesis: String,
    audit: &AuditConfig,
) -> AppResult<(String, String, WerReport)> {
    let limits = audit.limits();
    let (reference, hypothesis, result) = web::block(move || {
        let result = score_transcripts(&reference, &hypothesis, &limits);
        (reference, hypothesis, result)
    })
    .await?;

    match result {
        Ok(report) => Ok((reference, hypothesis, report)),
        Err(e) => {
            warn!(error = %e, "Transcript audit rejected");
            Err(e.into())
        }
    }
}

/// Calculate WER between a reference and a hypothesis text.
///
/// ## Endpoint: `POST /api/v1/audit/text`
///
/// ## Request Body:
/// ```json
/// { "reference": "The cat sat on the mat", "hypothesis": "A cat sat on mat" }
/// ```
///
/// ## Response:
/// ```json
/// {
///   "reference": "The cat sat on the mat",
///   "hypothesis": "A cat sat on mat",
///   "reference_word_count": 6,
///   "hypothesis_word_count": 5,
///   "wer": 0.3333333333333333,
///   "substitutions": 1,
///   "deletions": 1,
///   "insertions": 0
/// }
/// ```
pub async fn audit_text(
    state: web::Data<AppState>,
    request: web::Json<AuditTextRequest>,
) -> AppResult<HttpResponse> {
    let AuditTextRequest { reference, hypothesis } = request.into_inner();
    let audit = state.get_config().audit;

    let result = score_blocking(reference, hypothesis, &audit).await;
    state.record_audit(result.is_ok());
    let (reference, hypothesis, report) = result?;

    info!(
        wer = report.wer,
        substitutions = report.substitutions,
        deletions = report.deletions,
        insertions = report.insertions,
        "Text audit scored"
    );

    Ok(HttpResponse::Ok().json(AuditTextResponse {
        reference,
        hypothesis,
        reference_word_count: report.reference_word_count,
        hypothesis_word_count: report.hypothesis_word_count,
        wer: report.wer,
        substitutions: report.substitutions,
        deletions: report.deletions,
        insertions: report.insertions,
    }))
}

/// Transcribe `hypothesis_url` with the configured provider and score the
/// transcript against `reference`.
///
/// ## Endpoint: `POST /api/v1/audit/audio`
///
/// ## Request Body:
/// ```json
/// { "reference": "hello world", "hypothesis_url": "https://example.com/a.wav" }
/// ```
///
/// The reference is checked before the provider is called, so an empty
/// reference never costs a transcription.
pub async fn audit_audio(
    state: web::Data<AppState>,
    request: web::Json<AuditAudioRequest>,
) -> AppResult<HttpResponse> {
    let AuditAudioRequest { reference, hypothesis_url } = request.into_inner();

    let result = transcribe_and_score(&state, reference, &hypothesis_url).await;
    state.record_audit(result.is_ok());
    let (reference, transcript, report) = result?;

    info!(
        url = %hypothesis_url,
        wer = report.wer,
        reference_words = report.reference_word_count,
        hypothesis_words = report.hypothesis_word_count,
        "Audio audit scored"
    );

    Ok(HttpResponse::Ok().json(AuditAudioResponse {
        reference,
        hypothesis_url,
        hypothesis_transcript: transcript,
        reference_word_count: report.reference_word_count,
        hypothesis_word_count: report.hypothesis_word_count,
        wer: report.wer,
        substitutions: report.substitutions,
        deletions: report.deletions,
        insertions: report.insertions,
    }))
}

async fn transcribe_and_score(
    state: &AppState,
    reference: String,
    hypothesis_url: &str,
) -> AppResult<(String, String, WerReport)> {
    if reference.is_empty() {
        return Err(WerError::InvalidInput.into());
    }
    if hypothesis_url.trim().is_empty() {
        return Err(AppError::ValidationError("hypothesis_url is required".to_string()));
    }

    let provider = state.provider.as_ref().ok_or_else(|| {
        AppError::ConfigError("No transcription provider configured. Set DEEPGRAM_API_KEY".to_string())
    })?;

    let config = state.get_config();
    let options = TranscribeOptions::new(config.provider.model, config.provider.language);

    let transcript = provider.transcribe(hypothesis_url, &options).await.map_err(|e| {
        warn!(provider = provider.name(), url = %hypothesis_url, error = %e, "Transcription failed");
        AppError::from(e)
    })?;
    debug!(
        provider = provider.name(),
        url = %transcript.url,
        model = %transcript.model,
        language = %transcript.language,
        confidence = transcript.confidence,
        "Hypothesis transcript received"
    );

    score_blocking(reference, transcript.transcript, &config.audit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::handlers::configure_routes;
    use crate::provider::{ProviderError, ProviderTranscript, TranscriptionProvider};
    use crate::store::InMemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::test::{self as actix_test, TestRequest};
    use actix_web::App;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Returns a fixed transcript, or fails when `transcript` is `None`.
    struct StubProvider {
        transcript: Option<&'static str>,
    }

    #[async_trait]
    impl TranscriptionProvider for StubProvider {
        async fn transcribe(
            &self,
            audio_url: &str,
            options: &TranscribeOptions,
        ) -> Result<ProviderTranscript, ProviderError> {
            match self.transcript {
                Some(text) => Ok(ProviderTranscript {
                    transcript: text.to_string(),
                    confidence: 0.9,
                    model: options.model.clone(),
                    language: options.language.clone(),
                    url: audio_url.to_string(),
                }),
                None => Err(ProviderError::Status {
                    status: 500,
                    body: "boom".to_string(),
                }),
            }
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn state_with(provider: Option<Arc<dyn TranscriptionProvider>>) -> AppState {
        AppState::new(AppConfig::default(), provider, Arc::new(InMemoryStore::new()))
    }

    async fn post(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;
        let req = TestRequest::post().uri(uri).set_json(body).to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = actix_test::read_body_json(resp).await;
        (status, body)
    }

    #[test]
    fn test_score_transcripts_checks_emptiness_before_size() {
        let limits = InputLimits { max_words: 10, max_cells: 1_000 };
        let long = "word ".repeat(50);
        assert_eq!(score_transcripts(&long, "", &limits), Err(WerError::InvalidInput));
        assert!(matches!(
            score_transcripts(&long, "word", &limits),
            Err(WerError::AlignmentOverflow { words: 51, limit: 10 })
        ));
    }

    #[test]
    fn test_score_transcripts_rejects_oversized_table() {
        let limits = InputLimits { max_words: 1_000, max_cells: 100 };
        let side = "word ".repeat(10);
        assert!(matches!(
            score_transcripts(&side, &side, &limits),
            Err(WerError::AlignmentTooLarge { cells: 121, limit: 100 })
        ));
    }

    #[actix_web::test]
    async fn test_audit_text_scores_pair() {
        let (status, body) = post(
            state_with(None),
            "/api/v1/audit/text",
            json!({"reference": "The cat sat on the mat", "hypothesis": "A cat sat on mat"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reference"], "The cat sat on the mat");
        assert_eq!(body["reference_word_count"], 6);
        assert_eq!(body["hypothesis_word_count"], 5);
        assert_eq!(body["substitutions"], 1);
        assert_eq!(body["deletions"], 1);
        assert_eq!(body["insertions"], 0);
        assert!((body["wer"].as_f64().unwrap() - 2.0 / 6.0).abs() < 1e-10);
    }

    #[actix_web::test]
    async fn test_audit_text_rejects_empty_hypothesis() {
        let state = state_with(None);
        let (status, body) = post(
            state.clone(),
            "/api/v1/audit/text",
            json!({"reference": "a b c", "hypothesis": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
        assert_eq!(
            body["error"]["message"],
            "Both reference and hypothesis must be non-empty strings"
        );
        assert_eq!(state.get_metrics_snapshot().audits_failed, 1);
    }

    #[actix_web::test]
    async fn test_audit_text_missing_field_is_invalid_input() {
        let (status, body) = post(state_with(None), "/api/v1/audit/text", json!({"reference": "hi"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
    }

    #[actix_web::test]
    async fn test_audit_text_punctuation_only_reference_is_degenerate() {
        let (status, body) = post(
            state_with(None),
            "/api/v1/audit/text",
            json!({"reference": "?! ...", "hypothesis": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Reference contains no words after normalization");
    }

    #[actix_web::test]
    async fn test_audit_text_enforces_word_ceiling() {
        let state = state_with(None);
        let mut config = state.get_config();
        config.audit.max_words = 3;
        state.update_config(config).unwrap();

        let (status, body) = post(
            state,
            "/api/v1/audit/text",
            json!({"reference": "one two", "hypothesis": "one two three"}),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["type"], "payload_too_large");
    }

    #[actix_web::test]
    async fn test_audit_text_malformed_json_is_bad_request() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(None)))
                .configure(configure_routes),
        )
        .await;
        let req = TestRequest::post()
            .uri("/api/v1/audit/text")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"]["type"], "bad_request");
    }

    #[actix_web::test]
    async fn test_audit_audio_uses_provider_transcript() {
        let provider: Arc<dyn TranscriptionProvider> = Arc::new(StubProvider {
            transcript: Some("Hello there friend."),
        });
        let state = state_with(Some(provider));
        let (status, body) = post(
            state.clone(),
            "/api/v1/audit/audio",
            json!({"reference": "hello", "hypothesis_url": "https://example.com/a.wav"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hypothesis_transcript"], "Hello there friend.");
        assert_eq!(body["hypothesis_url"], "https://example.com/a.wav");
        assert_eq!(body["insertions"], 2);
        assert_eq!(body["wer"].as_f64().unwrap(), 2.0);
        assert_eq!(state.get_metrics_snapshot().audits_scored, 1);
    }

    #[actix_web::test]
    async fn test_audit_audio_empty_transcript_is_invalid_input() {
        let provider: Arc<dyn TranscriptionProvider> = Arc::new(StubProvider { transcript: Some("") });
        let (status, body) = post(
            state_with(Some(provider)),
            "/api/v1/audit/audio",
            json!({"reference": "hello", "hypothesis_url": "https://example.com/silence.wav"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
    }

    #[actix_web::test]
    async fn test_audit_audio_provider_failure_is_bad_gateway() {
        let provider: Arc<dyn TranscriptionProvider> = Arc::new(StubProvider { transcript: None });
        let (status, body) = post(
            state_with(Some(provider)),
            "/api/v1/audit/audio",
            json!({"reference": "hello", "hypothesis_url": "https://example.com/a.wav"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "upstream_error");
    }

    #[actix_web::test]
    async fn test_audit_audio_without_provider_is_config_error() {
        let (status, body) = post(
            state_with(None),
            "/api/v1/audit/audio",
            json!({"reference": "hello", "hypothesis_url": "https://example.com/a.wav"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "config_error");
    }

    #[actix_web::test]
    async fn test_audit_audio_rejects_empty_reference_before_transcribing() {
        // No provider configured: reaching the provider would yield config_error.
        let (status, body) = post(
            state_with(None),
            "/api/v1/audit/audio",
            json!({"reference": "", "hypothesis_url": "https://example.com/a.wav"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
    }
}
