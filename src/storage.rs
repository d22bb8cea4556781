use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::session::Message;

/// One mirrored transcript entry in the on-disk history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: String,
    #[serde(flatten)]
    pub message: Message,
}

/// Best-effort disk mirror for audio artifacts and translation history.
///
/// The in-memory transcript stays authoritative for a session's
/// lifetime; nothing here is a correctness dependency. Mirror failures
/// are logged and swallowed where the caller cannot do better.
#[derive(Clone)]
pub struct ArtifactStore {
    audio_input_dir: PathBuf,
    audio_output_dir: PathBuf,
    history_file: Option<PathBuf>,
}

impl ArtifactStore {
    /// Opens the store, creating the audio directories if needed.
    pub async fn open(
        audio_input_dir: impl AsRef<Path>,
        audio_output_dir: impl AsRef<Path>,
        history_file: Option<PathBuf>,
    ) -> Result<Self> {
        let audio_input_dir = audio_input_dir.as_ref().to_path_buf();
        let audio_output_dir = audio_output_dir.as_ref().to_path_buf();

        fs::create_dir_all(&audio_input_dir)
            .await
            .with_context(|| format!("failed to create {}", audio_input_dir.display()))?;
        fs::create_dir_all(&audio_output_dir)
            .await
            .with_context(|| format!("failed to create {}", audio_output_dir.display()))?;

        info!(
            "Artifact store ready: input={}, output={}",
            audio_input_dir.display(),
            audio_output_dir.display()
        );

        Ok(Self {
            audio_input_dir,
            audio_output_dir,
            history_file,
        })
    }

    /// Saves an uploaded voice clip; returns the stored filename.
    pub async fn save_input_audio(&self, bytes: &[u8]) -> Result<String> {
        let filename = format!("input_{}.webm", Self::stamp());
        fs::write(self.audio_input_dir.join(&filename), bytes)
            .await
            .context("failed to write input audio")?;
        Ok(filename)
    }

    /// Saves a synthesized clip; returns the stored filename.
    pub async fn save_output_audio(&self, bytes: &[u8]) -> Result<String> {
        let filename = format!("translated_{}.mp3", Self::stamp());
        fs::write(self.audio_output_dir.join(&filename), bytes)
            .await
            .context("failed to write output audio")?;
        Ok(filename)
    }

    /// Resolves a synthesized artifact for serving. Only plain filenames
    /// are accepted; anything that could escape the output directory is
    /// rejected.
    pub fn output_path(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.audio_output_dir.join(filename))
    }

    /// Appends a published message to the history mirror. Failures are
    /// logged, never propagated.
    pub async fn mirror_message(&self, session_id: &str, message: &Message) {
        let Some(path) = self.history_file.clone() else {
            return;
        };
        if let Err(e) = self.append_history(&path, session_id, message).await {
            warn!("History mirror write failed: {:#}", e);
        }
    }

    /// The most recent `limit` mirrored entries in chronological order,
    /// or all of them when `limit` is zero. Absent or corrupt history
    /// reads as empty.
    pub async fn history_tail(&self, limit: usize) -> Vec<HistoryEntry> {
        let Some(path) = &self.history_file else {
            return Vec::new();
        };
        let entries = Self::read_history(path).await;
        if limit == 0 || entries.len() <= limit {
            entries
        } else {
            entries[entries.len() - limit..].to_vec()
        }
    }

    async fn append_history(&self, path: &Path, session_id: &str, message: &Message) -> Result<()> {
        let mut entries = Self::read_history(path).await;
        entries.push(HistoryEntry {
            session_id: session_id.to_string(),
            message: message.clone(),
        });

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&entries)?;
        fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    async fn read_history(path: &Path) -> Vec<HistoryEntry> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn stamp() -> String {
        Utc::now().format("%Y%m%d_%H%M%S_%f").to_string()
    }
}
