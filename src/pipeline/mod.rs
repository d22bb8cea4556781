//! Translation pipeline
//!
//! Coordinates the fixed transcribe -> translate -> synthesize sequence
//! over the external speech services. The services themselves live
//! behind the stage traits; see [`crate::services`] for the
//! OpenAI-compatible implementations.

mod coordinator;
mod stages;

pub use coordinator::{TranslationOutcome, TranslationPipeline};
pub use stages::{SpeechSynthesizer, SpeechToText, Stage, StageFailure, Translator};
