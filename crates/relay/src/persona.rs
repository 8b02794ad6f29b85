use protocol::config::PersonaOverrides;
use protocol::{Language, Mode};

const CHAT_PERSONA: &str = "Be helpful, clear, casual and creative.";
const SCAN_PERSONA: &str =
    "Act like a cybersecurity analyst. Give security verdicts for suspicious links.";
const EDU_PERSONA: &str = "Be a smart academic assistant. Answer clearly.";
const CYBER_PERSONA: &str = "Give cybersecurity tips in a friendly manner.";

const PIDGIN_DIRECTIVE: &str = "Use only Nigerian Pidgin.";
const ENGLISH_DIRECTIVE: &str = "Use formal English.";

pub(crate) fn default_persona(mode: Mode) -> &'static str {
    match mode {
        Mode::Chat => CHAT_PERSONA,
        Mode::Scan => SCAN_PERSONA,
        Mode::Edu => EDU_PERSONA,
        Mode::Cyber => CYBER_PERSONA,
    }
}

pub(crate) fn language_directive(language: Language) -> &'static str {
    match language {
        Language::Pidgin => PIDGIN_DIRECTIVE,
        Language::English => ENGLISH_DIRECTIVE,
    }
}

/// Mode to persona mapping, fixed at startup.
#[derive(Debug, Clone)]
pub(crate) struct PersonaTable {
    chat: String,
    scan: String,
    edu: String,
    cyber: String,
}

impl PersonaTable {
    pub(crate) fn from_overrides(overrides: &PersonaOverrides) -> Self {
        let pick = |mode: Mode| {
            overrides
                .get(mode)
                .map(str::trim)
                .unwrap_or(default_persona(mode))
                .to_string()
        };
        Self {
            chat: pick(Mode::Chat),
            scan: pick(Mode::Scan),
            edu: pick(Mode::Edu),
            cyber: pick(Mode::Cyber),
        }
    }

    pub(crate) fn persona(&self, mode: Mode) -> &str {
        match mode {
            Mode::Chat => &self.chat,
            Mode::Scan => &self.scan,
            Mode::Edu => &self.edu,
            Mode::Cyber => &self.cyber,
        }
    }

    pub(crate) fn instruction(&self, mode: Mode, language: Language, message: &str) -> String {
        format!(
            "{}\n{}\nUser: {}\nAI:",
            self.persona(mode),
            language_directive(language),
            message.trim()
        )
    }
}

impl Default for PersonaTable {
    fn default() -> Self {
        Self::from_overrides(&PersonaOverrides::default())
    }
}
