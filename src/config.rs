use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub provider: ProviderConfig,
    pub paths: PathsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// OpenAI-compatible speech/translation provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub whisper: WhisperConfig,
    pub translator: TranslatorConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperConfig {
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslatorConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    pub model: String,
    pub voice: String,
    pub speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub audio_input: String,
    pub audio_output: String,
    /// Translation prompt template file; a built-in template is used
    /// when the file is missing.
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub save_history: bool,
    pub history_file: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
