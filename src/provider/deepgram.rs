//! Deepgram pre-recorded transcription over REST.
//!
//! `POST {base_url}/v1/listen` with the audio URL in the JSON body. Only the
//! first alternative of the first channel is used; a response without
//! channels or alternatives yields an empty transcript.

use super::{ProviderError, ProviderTranscript, TranscribeOptions, TranscriptionProvider};
use crate::config::ProviderConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub struct DeepgramProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    results: Option<ListenResults>,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<Channel>,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Default, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f64,
}

impl DeepgramProvider {
    /// Build a client from configuration. Fails when no API key is set.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("Deepgram API key is required. Set DEEPGRAM_API_KEY or provider.api_key"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn listen_url(&self) -> String {
        format!("{}/v1/listen", self.base_url)
    }
}

/// Pull transcript and confidence out of a `/v1/listen` response body.
fn parse_listen_response(body: &str) -> Result<(String, f64), ProviderError> {
    let response: ListenResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    let best = response
        .results
        .unwrap_or_default()
        .channels
        .into_iter()
        .next()
        .and_then(|channel| channel.alternatives.into_iter().next())
        .unwrap_or_default();

    Ok((best.transcript, best.confidence))
}

#[async_trait]
impl TranscriptionProvider for DeepgramProvider {
    async fn transcribe(
        &self,
        audio_url: &str,
        options: &TranscribeOptions,
    ) -> Result<ProviderTranscript, ProviderError> {
        debug!(url = %audio_url, model = %options.model, "Submitting audio to Deepgram");

        let response = self
            .client
            .post(self.listen_url())
            .header("Authorization", format!("Token {}", self.api_key))
            .query(&[
                ("model", options.model.as_str()),
                ("language", options.language.as_str()),
                ("smart_format", if options.smart_format { "true" } else { "false" }),
                ("punctuate", if options.punctuate { "true" } else { "false" }),
            ])
            .json(&serde_json::json!({ "url": audio_url }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let (transcript, confidence) = parse_listen_response(&body)?;
        info!(
            url = %audio_url,
            words = transcript.split_whitespace().count(),
            confidence,
            "Deepgram transcription complete"
        );

        Ok(ProviderTranscript {
            transcript,
            confidence,
            model: options.model.clone(),
            language: options.language.clone(),
            url: audio_url.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "deepgram"
    }
}
