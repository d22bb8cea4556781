use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::stages::{SpeechSynthesizer, SpeechToText, Stage, StageFailure, Translator};

/// Result of a completed submission.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationOutcome {
    pub original_text: String,
    pub translated_text: String,
    pub audio_url: String,
}

/// Sequences the three external calls for one audio submission:
/// `Received -> Transcribing -> Translating -> Synthesizing -> Done | Failed`.
///
/// Stages run strictly in order because each output is the next stage's
/// input. There are no retries and no mid-flight cancellation; any stage
/// failure aborts the submission and names the failing stage. A timeout
/// inside a service shows up here as an ordinary stage failure.
pub struct TranslationPipeline {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl TranslationPipeline {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            stt,
            translator,
            synthesizer,
        }
    }

    /// Runs one submission to completion or to its first failure. No
    /// partial results are returned.
    pub async fn submit(
        &self,
        audio: &[u8],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<TranslationOutcome, StageFailure> {
        debug!("Submission received: {} audio bytes", audio.len());

        debug!("Entering {} stage", Stage::Transcribe);
        let original_text = self
            .stt
            .transcribe(audio)
            .await
            .map_err(|source| Self::fail(Stage::Transcribe, source))?;

        debug!("Entering {} stage", Stage::Translate);
        let translated_text = self
            .translator
            .translate(&original_text, source_lang, target_lang)
            .await
            .map_err(|source| Self::fail(Stage::Translate, source))?;

        debug!("Entering {} stage", Stage::Synthesize);
        let audio_url = self
            .synthesizer
            .synthesize(&translated_text)
            .await
            .map_err(|source| Self::fail(Stage::Synthesize, source))?;

        info!(
            "Submission done: {} -> {} ({} -> {} chars)",
            source_lang,
            target_lang,
            original_text.len(),
            translated_text.len()
        );

        Ok(TranslationOutcome {
            original_text,
            translated_text,
            audio_url,
        })
    }

    fn fail(stage: Stage, source: anyhow::Error) -> StageFailure {
        warn!("Submission failed in {} stage: {}", stage, source);
        StageFailure { stage, source }
    }
}
