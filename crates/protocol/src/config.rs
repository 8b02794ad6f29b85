use serde::Deserialize;

use crate::Mode;

pub const DEFAULT_COHERE_ENDPOINT: &str = "https://api.cohere.ai/v1/generate";
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus";
pub const DEFAULT_COHERE_API_KEY_ENV: &str = "COHERE_API_KEY";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_VIRUSTOTAL_BASE_URL: &str = "https://www.virustotal.com/api/v3";
pub const DEFAULT_VIRUSTOTAL_API_KEY_ENV: &str = "VIRUSTOTAL_API_KEY";

const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_POLL_ATTEMPTS: u32 = 4;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub threat_intel: ThreatIntelConfig,
    #[serde(default)]
    pub personas: PersonaOverrides,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationProvider {
    #[default]
    Cohere,
    Openai,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub provider: GenerationProvider,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GenerationConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(match self.provider {
            GenerationProvider::Cohere => DEFAULT_COHERE_ENDPOINT,
            GenerationProvider::Openai => DEFAULT_OPENAI_ENDPOINT,
        })
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider {
            GenerationProvider::Cohere => DEFAULT_COHERE_MODEL,
            GenerationProvider::Openai => DEFAULT_OPENAI_MODEL,
        })
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(match self.provider {
            GenerationProvider::Cohere => DEFAULT_COHERE_API_KEY_ENV,
            GenerationProvider::Openai => DEFAULT_OPENAI_API_KEY_ENV,
        })
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            endpoint: None,
            model: None,
            api_key_env: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            stop_sequences: default_stop_sequences(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreatIntelConfig {
    #[serde(default = "default_virustotal_base_url")]
    pub base_url: String,
    #[serde(default = "default_virustotal_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ThreatIntelConfig {
    fn default() -> Self {
        Self {
            base_url: default_virustotal_base_url(),
            api_key_env: default_virustotal_api_key_env(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaOverrides {
    pub chat: Option<String>,
    pub scan: Option<String>,
    pub edu: Option<String>,
    pub cyber: Option<String>,
}

impl PersonaOverrides {
    pub fn get(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::Chat => self.chat.as_deref(),
            Mode::Scan => self.scan.as_deref(),
            Mode::Edu => self.edu.as_deref(),
            Mode::Cyber => self.cyber.as_deref(),
        }
    }
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_stop_sequences() -> Vec<String> {
    vec!["User:".to_string(), "AI:".to_string()]
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_attempts() -> u32 {
    DEFAULT_POLL_ATTEMPTS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_virustotal_base_url() -> String {
    DEFAULT_VIRUSTOTAL_BASE_URL.to_string()
}

fn default_virustotal_api_key_env() -> String {
    DEFAULT_VIRUSTOTAL_API_KEY_ENV.to_string()
}
