use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::{TtsConfig, WhisperConfig};
use crate::pipeline::{SpeechSynthesizer, SpeechToText};
use crate::storage::ArtifactStore;

/// Whisper-style `/audio/transcriptions` endpoint.
pub struct WhisperTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperTranscriber {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        config: &WhisperConfig,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let part = multipart::Part::bytes(audio.to_vec())
            .file_name("audio.webm")
            .mime_str("audio/webm")
            .context("failed to build audio part")?;
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("transcription request failed")?
            .error_for_status()
            .context("transcription request rejected")?;

        let body: TranscriptionResponse = response
            .json()
            .await
            .context("invalid transcription response")?;

        info!("Transcribed {} bytes to {} chars", audio.len(), body.text.len());
        Ok(body.text)
    }
}

/// `/audio/speech` synthesis endpoint; the synthesized clip is written
/// to the artifact store and served from `/api/audio/`.
pub struct SpeechSynth {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
    speed: f32,
    artifacts: ArtifactStore,
}

impl SpeechSynth {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        config: &TtsConfig,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            speed: config.speed,
            artifacts,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechSynth {
    async fn synthesize(&self, text: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "voice": self.voice,
            "speed": self.speed,
            "input": text,
        });

        let audio = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("synthesis request failed")?
            .error_for_status()
            .context("synthesis request rejected")?
            .bytes()
            .await
            .context("failed to read synthesized audio")?;

        let filename = self
            .artifacts
            .save_output_audio(&audio)
            .await
            .context("failed to store synthesized audio")?;

        info!("Synthesized {} chars into {}", text.len(), filename);
        Ok(format!("/api/audio/{}", filename))
    }
}
