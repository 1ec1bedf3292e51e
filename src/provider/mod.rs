//! # Speech-to-Text Providers
//!
//! Audio audits need a hypothesis transcript for an audio URL. The HTTP layer
//! only sees the [`TranscriptionProvider`] trait; the Deepgram REST client is
//! the production implementation.

pub mod deepgram;

pub use deepgram::DeepgramProvider;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    Decode(String),
}

/// Per-request options, taken from the live configuration.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    pub model: String,
    pub language: String,
    pub smart_format: bool,
    pub punctuate: bool,
}

impl TranscribeOptions {
    pub fn new(model: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            language: language.into(),
            smart_format: true,
            punctuate: true,
        }
    }
}

/// Transcript of one audio file as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderTranscript {
    pub transcript: String,
    pub confidence: f64,
    pub model: String,
    pub language: String,
    pub url: String,
}

#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe the audio at `audio_url`.
    async fn transcribe(
        &self,
        audio_url: &str,
        options: &TranscribeOptions,
    ) -> Result<ProviderTranscript, ProviderError>;

    /// Short name used in logs and health output.
    fn name(&self) -> &'static str;
}
