use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub mod config;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Chat,
    Scan,
    Edu,
    Cyber,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Chat, Mode::Scan, Mode::Edu, Mode::Cyber];

    /// Strict lookup. Callers decide how to treat unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "chat" => Some(Mode::Chat),
            "scan" => Some(Mode::Scan),
            "edu" => Some(Mode::Edu),
            "cyber" => Some(Mode::Cyber),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Scan => "scan",
            Mode::Edu => "edu",
            Mode::Cyber => "cyber",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Pidgin,
}

impl Language {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "pidgin" | "pcm" => Some(Language::Pidgin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Pidgin => "pidgin",
        }
    }
}

/// Body of `POST /api/chat` and its aliases. Mode and language stay raw so the
/// router can default unknown labels instead of rejecting the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    #[serde(default, alias = "prompt")]
    pub message: String,
    #[serde(default = "default_mode_label", deserialize_with = "lenient_mode_label")]
    pub mode: String,
    #[serde(
        default = "default_lang_label",
        alias = "language",
        deserialize_with = "lenient_lang_label"
    )]
    pub lang: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Other(IgnoredAny),
}

/// `null`, numbers and other non-string labels decode as absent.
fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawLabel::deserialize(deserializer)? {
        RawLabel::Text(label) => Some(label),
        RawLabel::Other(_) => None,
    })
}

fn lenient_mode_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_label(deserializer)?.unwrap_or_else(default_mode_label))
}

fn lenient_lang_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_label(deserializer)?.unwrap_or_else(default_lang_label))
}

fn default_mode_label() -> String {
    Mode::Chat.as_str().to_string()
}

fn default_lang_label() -> String {
    Language::English.as_str().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlashcardTopic {
    Edu,
    #[default]
    Cyber,
}

impl FlashcardTopic {
    /// Anything other than `edu` gets cybersecurity cards.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "edu" => FlashcardTopic::Edu,
            _ => FlashcardTopic::Cyber,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashcardsQuery {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, alias = "language")]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
}
