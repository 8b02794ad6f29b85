use std::sync::Arc;

use async_trait::async_trait;
use protocol::config::{GenerationConfig, GenerationProvider};
use serde_json::Value;

use crate::config::read_api_key;
use crate::upstream::{build_http_client, require_str, send_json, UpstreamError};

/// Token and creativity budget sent with every instruction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GenerationParams {
    pub(crate) model: String,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f32,
    pub(crate) stop_sequences: Vec<String>,
}

impl GenerationParams {
    fn from_config(config: &GenerationConfig) -> Self {
        Self {
            model: config.model().to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stop_sequences: config.stop_sequences.clone(),
        }
    }
}

#[async_trait]
pub(crate) trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the raw generated text for a fully built instruction.
    async fn generate(&self, instruction: &str) -> Result<String, UpstreamError>;
}

/// Generates and trims. Blank output counts as a failure.
pub(crate) async fn complete(
    generator: &dyn TextGenerator,
    instruction: &str,
) -> Result<String, UpstreamError> {
    let text = generator.generate(instruction).await?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(UpstreamError::Empty);
    }
    Ok(trimmed.to_string())
}

/// Stand-in used when no API key is available.
#[derive(Debug, Default)]
pub(crate) struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn generate(&self, _instruction: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured("text generation"))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CohereGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    params: GenerationParams,
}

#[async_trait]
impl TextGenerator for CohereGenerator {
    fn name(&self) -> &'static str {
        "cohere"
    }

    async fn generate(&self, instruction: &str) -> Result<String, UpstreamError> {
        let payload = serde_json::json!({
            "model": self.params.model,
            "prompt": instruction,
            "max_tokens": self.params.max_tokens,
            "temperature": self.params.temperature,
            "stop_sequences": self.params.stop_sequences,
        });
        let body = send_json("cohere", || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&payload)
        })
        .await?;
        parse_cohere_text(&body)
    }
}

fn parse_cohere_text(body: &Value) -> Result<String, UpstreamError> {
    // older deployments answer through the chat endpoint shape
    require_str(body, "/generations/0/text")
        .or_else(|_| require_str(body, "/text"))
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub(crate) struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    params: GenerationParams,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn generate(&self, instruction: &str) -> Result<String, UpstreamError> {
        let payload = serde_json::json!({
            "model": self.params.model,
            "messages": [
                {
                    "role": "user",
                    "content": instruction
                }
            ],
            "max_tokens": self.params.max_tokens,
            "temperature": self.params.temperature,
            "stop": self.params.stop_sequences,
        });
        let body = send_json("openai", || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&payload)
        })
        .await?;
        require_str(&body, "/choices/0/message/content").map(str::to_string)
    }
}

pub(crate) fn build_generator(config: &GenerationConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let api_key_env = config.api_key_env();
    let Some(api_key) = read_api_key(api_key_env) else {
        tracing::warn!(
            event = "generation.disabled",
            api_key_env = %api_key_env,
            "text generation key missing; replies will use fallbacks"
        );
        return Ok(Arc::new(DisabledGenerator));
    };

    let client = build_http_client(config.timeout_secs)?;
    let endpoint = config.endpoint().to_string();
    let params = GenerationParams::from_config(config);
    tracing::info!(
        provider = ?config.provider,
        model = %params.model,
        endpoint = %endpoint,
        "text generation configured"
    );
    let generator: Arc<dyn TextGenerator> = match config.provider {
        GenerationProvider::Cohere => Arc::new(CohereGenerator {
            client,
            endpoint,
            api_key,
            params,
        }),
        GenerationProvider::Openai => Arc::new(OpenAiGenerator {
            client,
            endpoint,
            api_key,
            params,
        }),
    };
    Ok(generator)
}
