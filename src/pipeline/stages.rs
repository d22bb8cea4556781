use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// External speech-to-text service.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribes an audio clip to text in its spoken language.
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// External text translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str)
        -> Result<String>;
}

/// External speech synthesis service.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes speech for `text` and returns a locator for the
    /// stored audio artifact.
    async fn synthesize(&self, text: &str) -> Result<String>;
}

/// The three fixed steps of a translation submission, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Translate,
    Synthesize,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Transcribe => "transcribe",
            Stage::Translate => "translate",
            Stage::Synthesize => "synthesize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission failed at one of its stages. Nothing produced by earlier
/// stages is kept, and the transcript is never touched.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}
