use protocol::{FlashcardTopic, Language};

use crate::canned;
use crate::generation::{complete, TextGenerator};
use crate::persona::language_directive;

const FLASHCARD_COUNT: usize = 3;

fn flashcard_prompt(topic: FlashcardTopic) -> &'static str {
    match topic {
        FlashcardTopic::Edu => {
            "Give 3 short study tips for Nigerian students preparing for exams. One tip per line, no extra text."
        }
        FlashcardTopic::Cyber => {
            "Give 3 short cybersecurity tips for everyday phone and internet users. One tip per line, no extra text."
        }
    }
}

/// Generated tips, or the canned set when generation fails or yields too few
/// lines.
pub(crate) async fn flashcards(
    generator: &dyn TextGenerator,
    topic: FlashcardTopic,
    language: Language,
) -> Vec<String> {
    let instruction = format!(
        "{}\n{}",
        flashcard_prompt(topic),
        language_directive(language)
    );
    match complete(generator, &instruction).await {
        Ok(text) => {
            let cards = split_cards(&text);
            if cards.len() == FLASHCARD_COUNT {
                return cards;
            }
            tracing::warn!(
                event = "flashcards.short_reply",
                lines = cards.len(),
                "generated flashcards incomplete, serving canned set"
            );
        }
        Err(err) => {
            tracing::warn!(
                event = "flashcards.generation_failed",
                kind = err.kind(),
                error = %err,
                "flashcard generation failed, serving canned set"
            );
        }
    }
    canned::flashcards(topic)
}

fn split_cards(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .take(FLASHCARD_COUNT)
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•', '–']).trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix(['.', ')', ':']) {
            return stripped.trim();
        }
    }
    line.trim()
}
