//! Ordered regex pattern table for offline replies.
//!
//! When the LLM service is unavailable the pipeline answers from this
//! table instead. Match order is part of the contract: entries are
//! scanned top to bottom and the first unanchored match wins. The
//! default entry is never scanned, only used when nothing matches.

use anyhow::Context;
use regex::Regex;

use crate::domain::Mood;

/// Replies used when no pattern matches.
const DEFAULT_REPLIES: &[&str] = &[
    "I'm listening. Can you tell me more?",
    "I'm here to support you. Would you like to share more about what's on your mind?",
    "Thank you for sharing. How does that make you feel?",
    "I see. What else would you like to talk about today?",
    "I appreciate you opening up. Is there anything specific you'd like to discuss?",
];

/// One pattern entry; candidate replies share a mood and intensity.
#[derive(Debug)]
pub struct PatternEntry {
    regex: Regex,
    /// Candidate replies, one picked uniformly at random.
    pub replies: &'static [&'static str],
    /// Mood associated with this pattern.
    pub mood: Mood,
    /// Intensity associated with this pattern, 1-10.
    pub intensity: u8,
}

/// Ordered pattern table plus the default entry.
#[derive(Debug)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
    /// Replies for the default entry.
    pub default_replies: &'static [&'static str],
    /// Mood of the default entry.
    pub default_mood: Mood,
    /// Intensity of the default entry.
    pub default_intensity: u8,
}

impl PatternTable {
    /// Build the built-in table: common conversational patterns first,
    /// then emotional-state patterns.
    pub fn builtin() -> anyhow::Result<Self> {
        let specs: &[(&str, &'static [&'static str], Mood, u8)] = &[
            (
                r"\b(hi|hello|hey|greetings)\b",
                &[
                    "Hello! How are you feeling today?",
                    "Hi there! I'm here to chat with you. How are you doing?",
                    "Hey! It's nice to hear from you. How's your day going?",
                ],
                Mood::Neutral,
                5,
            ),
            (
                r"\b(good|great|fine|okay|happy|excellent)\b",
                &[
                    "I'm glad to hear you're doing well! Is there anything specific you'd like to talk about?",
                    "That's wonderful! What's been going well for you lately?",
                    "Great to hear that! What's made your day positive so far?",
                ],
                Mood::Positive,
                7,
            ),
            (
                r"\b(sad|down|depressed|unhappy|upset|blue)\b",
                &[
                    "I'm sorry to hear you're feeling down. Would you like to talk about what's troubling you?",
                    "It can be tough to feel that way. What's been on your mind lately?",
                    "I'm here to listen if you want to share more about what's making you feel this way.",
                ],
                Mood::Depressed,
                6,
            ),
            (
                r"\b(angry|mad|frustrated|annoyed)\b",
                &[
                    "I understand feeling frustrated. What's causing these feelings?",
                    "It sounds like you're dealing with some strong emotions. Would you like to talk about what happened?",
                    "Being angry is a natural response sometimes. What's been frustrating you?",
                ],
                Mood::Angry,
                6,
            ),
            (
                r"\b(anxious|worried|nervous|stressed|fear|scary)\b",
                &[
                    "Anxiety can be really challenging. What's making you feel anxious right now?",
                    "I understand that worry can be overwhelming. What's on your mind?",
                    "Feeling stressed is common. Can you share what's causing this feeling?",
                ],
                Mood::Anxious,
                6,
            ),
            (
                r"\b(tired|exhausted|sleepy|fatigued)\b",
                &[
                    "Being tired can really affect how we feel. Have you been able to get enough rest?",
                    "Fatigue can be difficult to deal with. What's your sleep been like lately?",
                    "Taking care of your energy levels is important. What might help you recharge?",
                ],
                Mood::Negative,
                4,
            ),
            (
                r"\b(thank you|thanks)\b",
                &[
                    "You're welcome! I'm here to support you.",
                    "Glad I could help! Is there anything else you'd like to discuss?",
                    "Of course! I'm here whenever you need to talk.",
                ],
                Mood::Positive,
                6,
            ),
            (
                r"\b(bye|goodbye|see you|talk later)\b",
                &[
                    "Take care of yourself! Feel free to come back anytime.",
                    "Goodbye for now. I'll be here when you want to chat again.",
                    "Take care! Remember to be kind to yourself.",
                ],
                Mood::Neutral,
                5,
            ),
            (
                r"\b(love|loved|loving)\b",
                &[
                    "Love is such a powerful emotion. Can you tell me more about these feelings?",
                    "It sounds like this is meaningful to you. What about it stands out?",
                    "Those feelings can be really important. How does it affect you?",
                ],
                Mood::Positive,
                8,
            ),
            (
                r"\b(hopeless|helpless|worthless)\b",
                &[
                    "I'm really sorry you're feeling this way. These feelings can be overwhelming but they're not permanent. What's contributing to this feeling?",
                    "That's a really difficult feeling to experience. Would you like to talk more about what's going on?",
                    "Those feelings are really challenging. Please know you're not alone in this. What's been happening recently?",
                ],
                Mood::Depressed,
                8,
            ),
            (
                r"\b(lonely|alone|isolated)\b",
                &[
                    "Feeling lonely can be really difficult. Would you like to talk about what's making you feel isolated?",
                    "I'm sorry you're feeling alone. Social connection is so important. What's been happening with your relationships lately?",
                    "That sounds really hard. Loneliness affects many people. What might help you feel more connected?",
                ],
                Mood::Depressed,
                7,
            ),
            (
                r"\b(confused|unsure|uncertain|don't know)\b",
                &[
                    "It's okay to feel uncertain sometimes. What specifically are you feeling confused about?",
                    "Confusion and uncertainty can be uncomfortable. What would help bring some clarity?",
                    "Taking time to process complex situations is important. What's making you feel uncertain?",
                ],
                Mood::Confused,
                5,
            ),
            (
                r"\b(excited|thrilled|eager)\b",
                &[
                    "That sounds wonderful! What's making you feel excited?",
                    "It's great to hear you're feeling enthusiastic! What are you looking forward to?",
                    "Excitement is such a positive energy! Tell me more about what's got you feeling this way.",
                ],
                Mood::Happy,
                8,
            ),
        ];

        let mut entries = Vec::with_capacity(specs.len());
        for &(pattern, replies, mood, intensity) in specs {
            entries.push(PatternEntry {
                regex: Regex::new(pattern)
                    .with_context(|| format!("invalid builtin pattern: {pattern}"))?,
                replies,
                mood,
                intensity,
            });
        }

        Ok(Self {
            entries,
            default_replies: DEFAULT_REPLIES,
            default_mood: Mood::Neutral,
            default_intensity: 5,
        })
    }

    /// First entry whose regex matches anywhere in `text`.
    ///
    /// `text` must already be lowercased; the patterns are lowercase.
    pub fn find(&self, text: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|entry| entry.regex.is_match(text))
    }

    /// Number of scanned entries (the default entry not included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no scanned entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
