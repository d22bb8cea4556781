//! OpenAI-compatible implementations of the pipeline stage services.

mod speech;
mod translator;

pub use speech::{SpeechSynth, WhisperTranscriber};
pub use translator::ChatTranslator;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::Config;
use crate::pipeline::TranslationPipeline;
use crate::storage::ArtifactStore;

/// Wires the three provider services into a pipeline from configuration.
pub fn build_pipeline(cfg: &Config, artifacts: ArtifactStore) -> Result<TranslationPipeline> {
    let api_key = std::env::var(&cfg.provider.api_key_env)
        .with_context(|| format!("{} is not set", cfg.provider.api_key_env))?;
    let client = reqwest::Client::new();

    let prompt_template = match std::fs::read_to_string(&cfg.paths.prompt) {
        Ok(template) => template,
        Err(_) => {
            warn!(
                "Prompt template {} not found, using the built-in one",
                cfg.paths.prompt
            );
            translator::FALLBACK_TEMPLATE.to_string()
        }
    };

    let stt = WhisperTranscriber::new(
        client.clone(),
        &cfg.provider.base_url,
        &api_key,
        &cfg.provider.whisper,
    );
    let translate = ChatTranslator::new(
        client.clone(),
        &cfg.provider.base_url,
        &api_key,
        &cfg.provider.translator,
        prompt_template,
    );
    let tts = SpeechSynth::new(
        client,
        &cfg.provider.base_url,
        &api_key,
        &cfg.provider.tts,
        artifacts,
    );

    Ok(TranslationPipeline::new(
        Arc::new(stt),
        Arc::new(translate),
        Arc::new(tts),
    ))
}
