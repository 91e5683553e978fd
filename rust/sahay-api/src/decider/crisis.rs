//! Crisis keyword scan and the fixed crisis replies.

/// Substrings that flag a message as a possible crisis.
///
/// Matching is case-insensitive and substring-based with no word
/// boundaries, so the scan errs toward flagging.
const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "harm myself",
    "self-harm",
    "cut myself",
    "hurting myself",
    "don't want to live",
    "better off dead",
    "no reason to live",
    "how to die",
    "end it all",
    "take my own life",
    "giving up",
    "can't go on",
    "don't know what to do anymore",
    "no way out",
    "overwhelmed",
    "i can't take it anymore",
    "i feel trapped",
    "i want to disappear",
    "i'm done with everything",
    "i can't do this anymore",
    "i feel hopeless",
    "i feel helpless",
    "i want to give up",
    "i'm at my limit",
    "i can't handle this",
    "i want it to stop",
    "i wish i was dead",
    "i wish i could just disappear",
];

/// Canned replies used whenever either crisis signal fires.
pub const CRISIS_RESPONSES: &[&str] = &[
    "I'm concerned about what you're sharing. If you're in immediate danger, please contact emergency services (112 in India) or a crisis helpline like the Snehi Suicide Prevention Helpline (91-22-2772 6771/6773). Would it help to talk more about what you're experiencing?",
    "It sounds like you're going through a really difficult time. Your safety is important - please consider reaching out to a crisis counselor by calling the Snehi Suicide Prevention Helpline (91-22-2772 6771/6773) or the iCALL helpline (9152987821). Would you like to tell me more about what's happening?",
    "I'm really concerned about you right now. Please consider talking to a mental health professional as soon as possible. The Snehi Suicide Prevention Helpline (91-22-2772 6771/6773), iCALL (9152987821), and the Kiran Mental Health Rehabilitation Helpline (1800-599-0019) are available. Can we continue talking about what's bringing up these feelings?",
];

/// Explanation attached to the fixed crisis mood.
pub const CRISIS_EXPLANATION: &str =
    "The message contains concerning language that may indicate a crisis.";

/// True when any crisis keyword appears in `text`.
///
/// `text` must already be lowercased; the keyword table is stored
/// lowercase.
pub fn contains_crisis_keyword(text: &str) -> bool {
    CRISIS_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_keyword_as_substring() {
        assert!(contains_crisis_keyword("i want to kill myself"));
        assert!(contains_crisis_keyword("been reading about suicide prevention"));
        // No word boundaries: a keyword inside a longer phrase still trips.
        assert!(contains_crisis_keyword("i'm giving up chocolate for a month"));
    }

    #[test]
    fn ignores_benign_text() {
        assert!(!contains_crisis_keyword("i had a great day at the park"));
        assert!(!contains_crisis_keyword(""));
    }

    #[test]
    fn caller_is_expected_to_lowercase() {
        let message = "I WANT TO KILL MYSELF";
        assert!(contains_crisis_keyword(&message.to_lowercase()));
    }
}
