//! Static replies served when the generator is unavailable.

use protocol::{FlashcardTopic, Mode};

pub(crate) const APOLOGY: &str =
    "Sorry, I couldn't process that right now. Please try again in a moment.";
pub(crate) const SCAN_UNAVAILABLE: &str = "Could not analyze the link. Please try again.";
pub(crate) const EMPTY_MESSAGE: &str = "Please type a message so I can help.";
pub(crate) const MALFORMED_REQUEST: &str =
    "I couldn't read that request. Send JSON like {\"message\": \"...\", \"mode\": \"chat\"}.";

const EDU_POINTER: &str =
    "Academic Assistant: For past questions visit https://myschool.ng or https://pass.ng";

const CYBER_TIPS: [&str; 4] = [
    "Use 2FA on all your accounts.",
    "Never reuse passwords.",
    "Watch out for phishing emails.",
    "Regularly update software & apps.",
];

const EDU_FLASHCARDS: [&str; 3] = [
    "Study in short focused sessions with breaks in between.",
    "Practice with past questions before every exam.",
    "Teach a topic to a friend to check that you understand it.",
];

/// Offline reply for a mode whose generator call failed. Chat and scan have
/// no canned content.
pub(crate) fn offline_reply(mode: Mode, message: &str) -> Option<String> {
    match mode {
        Mode::Edu => Some(EDU_POINTER.to_string()),
        Mode::Cyber => Some(pick_tip(message).to_string()),
        Mode::Chat | Mode::Scan => None,
    }
}

// same message, same tip
fn pick_tip(message: &str) -> &'static str {
    let index = message
        .bytes()
        .fold(0usize, |acc, byte| acc.wrapping_add(usize::from(byte)))
        % CYBER_TIPS.len();
    CYBER_TIPS[index]
}

pub(crate) fn flashcards(topic: FlashcardTopic) -> Vec<String> {
    let cards: &[&str] = match topic {
        FlashcardTopic::Edu => &EDU_FLASHCARDS,
        FlashcardTopic::Cyber => &CYBER_TIPS[..3],
    };
    cards.iter().map(|card| card.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyber_tip_is_deterministic() {
        let first = offline_reply(Mode::Cyber, "how do I stay safe?");
        let second = offline_reply(Mode::Cyber, "how do I stay safe?");
        assert_eq!(first, second);
        assert!(CYBER_TIPS.contains(&first.unwrap().as_str()));
    }

    #[test]
    fn chat_has_no_offline_reply() {
        assert_eq!(offline_reply(Mode::Chat, "hi"), None);
        assert_eq!(offline_reply(Mode::Scan, "hi"), None);
        assert!(offline_reply(Mode::Edu, "hi").unwrap().contains("myschool.ng"));
    }

    #[test]
    fn canned_flashcards_have_three_entries() {
        assert_eq!(flashcards(FlashcardTopic::Edu).len(), 3);
        assert_eq!(flashcards(FlashcardTopic::Cyber).len(), 3);
    }
}
