use std::sync::Arc;

use protocol::{Language, Mode};

use crate::canned::{offline_reply, APOLOGY};
use crate::generation::{complete, TextGenerator};
use crate::persona::PersonaTable;
use crate::scan::ScanDispatcher;

/// Maps (message, mode, language) to a reply. Unknown modes and languages
/// are defaulted, never rejected.
pub(crate) struct ModeRouter {
    generator: Arc<dyn TextGenerator>,
    personas: Arc<PersonaTable>,
    scanner: ScanDispatcher,
}

impl ModeRouter {
    pub(crate) fn new(
        generator: Arc<dyn TextGenerator>,
        personas: Arc<PersonaTable>,
        scanner: ScanDispatcher,
    ) -> Self {
        Self {
            generator,
            personas,
            scanner,
        }
    }

    pub(crate) async fn route(&self, message: &str, mode: &str, language: &str) -> String {
        let mode = resolve_mode(mode);
        let language = resolve_language(language);
        match mode {
            Mode::Scan => self.scanner.scan(message, language).await,
            Mode::Chat | Mode::Edu | Mode::Cyber => self.converse(mode, language, message).await,
        }
    }

    async fn converse(&self, mode: Mode, language: Language, message: &str) -> String {
        let instruction = self.personas.instruction(mode, language, message);
        match complete(self.generator.as_ref(), &instruction).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    event = "chat.generation_failed",
                    generator = self.generator.name(),
                    mode = %mode,
                    kind = err.kind(),
                    error = %err,
                    "generation failed, serving fallback"
                );
                offline_reply(mode, message).unwrap_or_else(|| APOLOGY.to_string())
            }
        }
    }
}

fn resolve_mode(label: &str) -> Mode {
    Mode::from_label(label).unwrap_or_else(|| {
        tracing::debug!(event = "chat.mode_defaulted", mode = %label, "unknown mode, using chat");
        Mode::Chat
    })
}

fn resolve_language(label: &str) -> Language {
    Language::from_label(label).unwrap_or_else(|| {
        tracing::debug!(
            event = "chat.language_defaulted",
            language = %label,
            "unknown language, using english"
        );
        Language::English
    })
}
