//! Core domain models.
//!
//! This module contains the data types flowing through the decision
//! pipeline: mood labels, mood analyses, decision results, and the
//! per-session history records.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Mood labels the service recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Generally positive tone.
    Positive,
    /// Generally negative tone.
    Negative,
    /// No clear emotional signal.
    Neutral,
    /// Worry, stress, fear.
    Anxious,
    /// Sadness, hopelessness.
    Depressed,
    /// Anger, frustration.
    Angry,
    /// Uncertainty, confusion.
    Confused,
    /// Joy, excitement.
    Happy,
}

impl Mood {
    /// The wire-format label for this mood.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Anxious => "anxious",
            Self::Depressed => "depressed",
            Self::Angry => "angry",
            Self::Confused => "confused",
            Self::Happy => "happy",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured mood judgment for a single message.
///
/// Invariant: `intensity` is always in `1..=10`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodAnalysis {
    /// Classified mood label.
    pub mood: Mood,
    /// Intensity of the mood, 1 (faint) to 10 (overwhelming).
    pub intensity: u8,
    /// Free-text rationale for the classification.
    pub explanation: String,
}

impl MoodAnalysis {
    /// The neutral/5 analysis used when no better judgment is available.
    pub fn neutral_default(explanation: impl Into<String>) -> Self {
        Self {
            mood: Mood::Neutral,
            intensity: 5,
            explanation: explanation.into(),
        }
    }

    /// Parse a mood classifier reply.
    ///
    /// Returns `None` unless the text is a JSON object with a known mood
    /// label and a numeric intensity. Out-of-range intensities are clamped
    /// into `1..=10` rather than rejected.
    pub fn parse(text: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Raw {
            mood: Mood,
            intensity: i64,
            #[serde(default)]
            explanation: String,
        }

        let raw: Raw = serde_json::from_str(text.trim()).ok()?;
        Some(Self {
            mood: raw.mood,
            intensity: raw.intensity.clamp(1, 10) as u8,
            explanation: raw.explanation,
        })
    }
}

/// Outcome of deciding a response for one message.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseResult {
    /// Reply text to show the user.
    pub reply: String,
    /// Mood judgment for the user's message.
    pub mood_analysis: MoodAnalysis,
    /// Whether the message tripped crisis detection.
    pub is_crisis: bool,
}

/// Author of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The service's replies.
    Assistant,
}

/// One entry in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Who authored the entry.
    pub role: Role,
    /// Entry text.
    pub content: String,
}

/// One entry in a session's mood history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodRecord {
    /// RFC 3339 timestamp of when the message was analyzed.
    pub timestamp: String,
    /// The message that was analyzed.
    pub message: String,
    /// Classified mood.
    pub mood: Mood,
    /// Mood intensity, 1-10.
    pub intensity: u8,
}

impl MoodRecord {
    /// Record `analysis` for `message` at the current time.
    pub fn now(message: &str, analysis: &MoodAnalysis) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            message: message.to_string(),
            mood: analysis.mood,
            intensity: analysis.intensity,
        }
    }
}
