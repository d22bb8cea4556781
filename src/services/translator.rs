use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::TranslatorConfig;
use crate::pipeline::Translator;

const SYSTEM_PROMPT: &str = "You are a professional translator.";

/// Used when the configured prompt template file is missing.
pub(crate) const FALLBACK_TEMPLATE: &str = "Translate the following text from {source_language} to {target_language}:\n\n{text}\n\nTranslation:";

/// Chat-completions based translator with a configurable prompt
/// template (`{source_language}`, `{target_language}`, `{text}`).
pub struct ChatTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompt_template: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatTranslator {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        config: &TranslatorConfig,
        prompt_template: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            prompt_template,
        }
    }

    fn render_prompt(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        self.prompt_template
            .replace("{source_language}", source_lang)
            .replace("{target_language}", target_lang)
            .replace("{text}", text)
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let prompt = self.render_prompt(text, source_lang, target_lang);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("translation request failed")?
            .error_for_status()
            .context("translation request rejected")?
            .json()
            .await
            .context("invalid translation response")?;

        let translation = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .context("translation response had no choices")?;

        info!(
            "Translated {} chars: {} -> {}",
            text.len(),
            source_lang,
            target_lang
        );
        Ok(translation)
    }
}
