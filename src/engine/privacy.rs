// ── Keepsake Engine: Privacy Filter ────────────────────────────────────────
// Caregiver-input sanitization: an ordered list of independent pattern and
// replace rules run over submitted memory text before it is stored. Pure —
// out of the retrieval critical path entirely.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyVerdict {
    pub clean_text: String,
    /// True when at least one rule fired.
    pub triggered: bool,
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+").expect("email pattern")
});

static CREDIT_CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").expect("card pattern")
});

static PASSWORD_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)password\s+is\s+\w+").expect("password phrase pattern"));

static PASSWORD_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)password").expect("password word pattern"));

pub fn check_privacy(text: &str) -> PrivacyVerdict {
    let mut clean = text.to_string();
    let mut triggered = false;

    if EMAIL.is_match(&clean) {
        clean = EMAIL.replace_all(&clean, "[EMAIL REDACTED]").into_owned();
        triggered = true;
    }

    if CREDIT_CARD.is_match(&clean) {
        clean = CREDIT_CARD.replace_all(&clean, "[CARD REDACTED]").into_owned();
        triggered = true;
    }

    if clean.to_lowercase().contains("password") {
        // Phrase replacement goes through a placeholder so the blanket
        // fallback below cannot re-match the marker's own "PASSWORD".
        const PLACEHOLDER: &str = "\u{1}PWD\u{1}";
        clean = PASSWORD_PHRASE.replace_all(&clean, PLACEHOLDER).into_owned();
        // Blanket fallback when the sentence structure doesn't match.
        if clean.to_lowercase().contains("password") {
            clean = PASSWORD_WORD
                .replace_all(&clean, "[SENSITIVE INFO]")
                .into_owned();
        }
        clean = clean.replace(PLACEHOLDER, "[PASSWORD REDACTED]");
        triggered = true;
    }

    // Common demo PIN — first occurrence only.
    if clean.contains("1234") {
        clean = clean.replacen("1234", "[PIN REDACTED]", 1);
        triggered = true;
    }

    PrivacyVerdict {
        clean_text: clean,
        triggered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes_through() {
        let verdict = check_privacy("Grandpa loved fishing at the lake.");
        assert_eq!(verdict.clean_text, "Grandpa loved fishing at the lake.");
        assert!(!verdict.triggered);
    }

    #[test]
    fn emails_are_redacted() {
        let verdict = check_privacy("Reach me at john.doe@example.com please");
        assert_eq!(verdict.clean_text, "Reach me at [EMAIL REDACTED] please");
        assert!(verdict.triggered);
    }

    #[test]
    fn card_numbers_are_redacted() {
        for input in [
            "card 1234-5678-9012-3456 ok",
            "card 1234 5678 9012 3456 ok",
            "card 1234567890123456 ok",
        ] {
            let verdict = check_privacy(input);
            assert_eq!(verdict.clean_text, "card [CARD REDACTED] ok", "input: {input}");
            assert!(verdict.triggered);
        }
    }

    #[test]
    fn password_phrase_is_redacted() {
        let verdict = check_privacy("My password is hunter2");
        assert_eq!(verdict.clean_text, "My [PASSWORD REDACTED]");
        assert!(verdict.triggered);
    }

    #[test]
    fn lone_password_mention_gets_blanket_redaction() {
        let verdict = check_privacy("never tell anyone your Password");
        assert_eq!(verdict.clean_text, "never tell anyone your [SENSITIVE INFO]");
        assert!(verdict.triggered);
    }

    #[test]
    fn pin_is_redacted_once() {
        let verdict = check_privacy("the code 1234 not 1234 again");
        assert_eq!(verdict.clean_text, "the code [PIN REDACTED] not 1234 again");
        assert!(verdict.triggered);
    }

    #[test]
    fn rules_compose_in_order() {
        let verdict = check_privacy("email a@b.co and password is abc");
        assert_eq!(
            verdict.clean_text,
            "email [EMAIL REDACTED] and [PASSWORD REDACTED]"
        );
        assert!(verdict.triggered);
    }
}
