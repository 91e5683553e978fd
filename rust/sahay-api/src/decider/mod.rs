//! Response decision pipeline.
//!
//! One call per user message, strictly ordered: local crisis keyword
//! scan, remote crisis classification, remote reply generation, remote
//! mood classification. The ordered pattern table answers instead when
//! the remote service fails. The pipeline is a pure function of the
//! message, the static tables, and the remote responses; it keeps no
//! state across calls.

pub mod crisis;
pub mod patterns;

use std::sync::Arc;

use rand::Rng;

use crate::domain::{Mood, MoodAnalysis, ResponseResult};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use patterns::PatternTable;

/// Persona instruction for reply generation.
const REPLY_SYSTEM_PROMPT: &str = "You are a supportive and empathetic mental health chatbot. Your responses should be helpful, understanding, and focused on providing emotional support. Keep responses concise and natural.";

/// Instruction for the yes/no crisis classifier.
const CRISIS_SYSTEM_PROMPT: &str = "You are a mental health assistant. If the following message indicates a crisis or risk of self-harm or suicide, respond with 'true'. Otherwise, respond with 'false'.";

/// Instruction for the structured mood classifier.
const MOOD_SYSTEM_PROMPT: &str = "Analyze the emotional tone of the following message and respond with a JSON object containing 'mood' (one of: positive, negative, neutral, anxious, depressed, angry), 'intensity' (1-10), and 'explanation'.";

const REPLY_TEMPERATURE: f32 = 0.7;
const REPLY_MAX_TOKENS: u32 = 150;
const MOOD_TEMPERATURE: f32 = 0.3;
const MOOD_MAX_TOKENS: u32 = 100;
const CRISIS_TEMPERATURE: f32 = 0.0;
const CRISIS_MAX_TOKENS: u32 = 5;

/// Uniform index selection, injectable so tests can pin the choice.
pub trait Picker: Send + Sync {
    /// An index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Production picker backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct UniformPicker;

impl Picker for UniformPicker {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// The response decider.
pub struct ResponseDecider {
    client: Arc<dyn LlmClient>,
    patterns: PatternTable,
    picker: Box<dyn Picker>,
}

impl std::fmt::Debug for ResponseDecider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseDecider")
            .field("patterns", &self.patterns.len())
            .finish_non_exhaustive()
    }
}

impl ResponseDecider {
    /// Create a decider over `client` with the given pattern table and
    /// reply picker.
    pub fn new(
        client: Arc<dyn LlmClient>,
        patterns: PatternTable,
        picker: Box<dyn Picker>,
    ) -> Self {
        Self {
            client,
            patterns,
            picker,
        }
    }

    /// Decide the reply, mood and crisis flag for one message.
    ///
    /// Never fails: every remote failure degrades to the pattern table
    /// and every parse failure degrades to a default mood.
    pub async fn decide(&self, message: &str) -> ResponseResult {
        let lowered = message.to_lowercase();

        // Obvious keywords never wait on the network.
        if crisis::contains_crisis_keyword(&lowered) || self.classify_crisis(message).await {
            return self.crisis_result();
        }

        match self.remote_response(message).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "LLM call failed, answering from pattern table");
                self.pattern_result(&lowered)
            }
        }
    }

    /// Remote yes/no crisis check.
    ///
    /// A failure or any answer other than "true" counts as "no" for this
    /// signal only; the local keyword scan has already run regardless of
    /// remote availability.
    async fn classify_crisis(&self, message: &str) -> bool {
        let req = CompletionRequest {
            messages: vec![
                Message::system(CRISIS_SYSTEM_PROMPT),
                Message::user(message),
            ],
            temperature: CRISIS_TEMPERATURE,
            max_tokens: CRISIS_MAX_TOKENS,
        };

        match self.client.complete(req).await {
            Ok(text) => text.trim().eq_ignore_ascii_case("true"),
            Err(e) => {
                tracing::error!(error = %e, "crisis classification failed");
                false
            }
        }
    }

    /// Fixed crisis reply with the fixed depressed/8 mood.
    fn crisis_result(&self) -> ResponseResult {
        let reply = crisis::CRISIS_RESPONSES[self.picker.pick(crisis::CRISIS_RESPONSES.len())];

        ResponseResult {
            reply: reply.to_string(),
            mood_analysis: MoodAnalysis {
                mood: Mood::Depressed,
                intensity: 8,
                explanation: crisis::CRISIS_EXPLANATION.to_string(),
            },
            is_crisis: true,
        }
    }

    /// Reply generation followed by mood classification.
    ///
    /// A transport failure in either call aborts the remote branch for
    /// the whole message; a mood reply that merely fails to parse keeps
    /// the generated reply and substitutes the neutral default.
    async fn remote_response(&self, message: &str) -> Result<ResponseResult, LlmError> {
        let reply = self
            .client
            .complete(CompletionRequest {
                messages: vec![
                    Message::system(REPLY_SYSTEM_PROMPT),
                    Message::user(message),
                ],
                temperature: REPLY_TEMPERATURE,
                max_tokens: REPLY_MAX_TOKENS,
            })
            .await?;

        let mood_text = self
            .client
            .complete(CompletionRequest {
                messages: vec![
                    Message::system(MOOD_SYSTEM_PROMPT),
                    Message::user(message),
                ],
                temperature: MOOD_TEMPERATURE,
                max_tokens: MOOD_MAX_TOKENS,
            })
            .await?;

        let mood_analysis = MoodAnalysis::parse(&mood_text).unwrap_or_else(|| {
            tracing::warn!("mood classifier returned unparseable output");
            MoodAnalysis::neutral_default("Unable to parse mood analysis from the model response.")
        });

        Ok(ResponseResult {
            reply,
            mood_analysis,
            is_crisis: false,
        })
    }

    /// Offline answer: first matching pattern entry, else the default.
    fn pattern_result(&self, lowered: &str) -> ResponseResult {
        match self.patterns.find(lowered) {
            Some(entry) => ResponseResult {
                reply: entry.replies[self.picker.pick(entry.replies.len())].to_string(),
                mood_analysis: MoodAnalysis {
                    mood: entry.mood,
                    intensity: entry.intensity,
                    explanation: format!(
                        "Message contains words suggesting a {} mood.",
                        entry.mood
                    ),
                },
                is_crisis: false,
            },
            None => ResponseResult {
                reply: self.patterns.default_replies
                    [self.picker.pick(self.patterns.default_replies.len())]
                .to_string(),
                mood_analysis: MoodAnalysis {
                    mood: self.patterns.default_mood,
                    intensity: self.patterns.default_intensity,
                    explanation: "Unable to determine specific mood from the message.".to_string(),
                },
                is_crisis: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    /// Scripted LLM client: pops queued results in call order, errors
    /// once the script runs out.
    struct ScriptedLlm {
        script: Mutex<VecDeque<Result<String, ()>>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(script: Vec<Result<&str, ()>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|r| r.map(String::from))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Self::new(Vec::new())
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _req: CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(())) | None => Err(LlmError::Malformed("scripted failure".to_string())),
            }
        }
    }

    /// Always picks the first candidate.
    struct FirstPicker;

    impl Picker for FirstPicker {
        fn pick(&self, _len: usize) -> usize {
            0
        }
    }

    fn decider(client: Arc<ScriptedLlm>) -> ResponseDecider {
        ResponseDecider::new(
            client,
            PatternTable::builtin().unwrap(),
            Box::new(FirstPicker),
        )
    }

    #[tokio::test]
    async fn keyword_crisis_short_circuits_remote_calls() {
        let client = ScriptedLlm::failing();
        let d = decider(client.clone());

        let result = d.decide("I want to kill myself").await;

        assert!(result.is_crisis);
        assert_eq!(result.mood_analysis.mood, Mood::Depressed);
        assert_eq!(result.mood_analysis.intensity, 8);
        assert_eq!(result.reply, crisis::CRISIS_RESPONSES[0]);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_classifier_can_flag_crisis() {
        let client = ScriptedLlm::new(vec![Ok("true")]);
        let d = decider(client.clone());

        let result = d.decide("everything is getting very dark lately").await;

        assert!(result.is_crisis);
        assert_eq!(result.mood_analysis.intensity, 8);
        // Only the classifier ran; no reply or mood generation.
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn classifier_failure_means_not_crisis() {
        let client = ScriptedLlm::new(vec![
            Err(()),
            Ok("That sounds like a lot to carry."),
            Ok(r#"{"mood": "negative", "intensity": 6, "explanation": "strained tone"}"#),
        ]);
        let d = decider(client.clone());

        let result = d.decide("work has been rough").await;

        assert!(!result.is_crisis);
        assert_eq!(result.reply, "That sounds like a lot to carry.");
        assert_eq!(result.mood_analysis.mood, Mood::Negative);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn unparseable_mood_keeps_reply_with_neutral_default() {
        let client = ScriptedLlm::new(vec![
            Ok("false"),
            Ok("I'm here for you."),
            Ok("the user seems mildly annoyed"),
        ]);
        let d = decider(client);

        let result = d.decide("my neighbor keeps parking in my spot").await;

        assert!(!result.is_crisis);
        assert_eq!(result.reply, "I'm here for you.");
        assert_eq!(result.mood_analysis.mood, Mood::Neutral);
        assert_eq!(result.mood_analysis.intensity, 5);
    }

    #[tokio::test]
    async fn out_of_range_intensity_is_clamped() {
        let client = ScriptedLlm::new(vec![
            Ok("false"),
            Ok("Tell me more."),
            Ok(r#"{"mood": "angry", "intensity": 99, "explanation": "very heated"}"#),
        ]);
        let d = decider(client);

        let result = d.decide("the referee robbed us tonight").await;

        assert_eq!(result.mood_analysis.intensity, 10);
    }

    #[tokio::test]
    async fn reply_failure_falls_back_to_patterns() {
        let client = ScriptedLlm::new(vec![Ok("false"), Err(())]);
        let d = decider(client);

        let result = d.decide("I feel so sad today").await;

        assert!(!result.is_crisis);
        assert_eq!(result.mood_analysis.mood, Mood::Depressed);
        assert_eq!(result.mood_analysis.intensity, 6);
        let table = PatternTable::builtin().unwrap();
        let entry = table.find("i feel so sad today").unwrap();
        assert!(entry.replies.iter().any(|r| *r == result.reply));
    }

    #[tokio::test]
    async fn mood_failure_discards_generated_reply() {
        let client = ScriptedLlm::new(vec![
            Ok("false"),
            Ok("A reply that should not survive."),
            Err(()),
        ]);
        let d = decider(client);

        let result = d.decide("I feel so sad today").await;

        assert_ne!(result.reply, "A reply that should not survive.");
        assert_eq!(result.mood_analysis.mood, Mood::Depressed);
        assert_eq!(result.mood_analysis.intensity, 6);
    }

    #[tokio::test]
    async fn no_pattern_match_uses_default_entry() {
        let client = ScriptedLlm::failing();
        let d = decider(client);

        let result = d.decide("asdkjfhalskdjf").await;

        assert!(!result.is_crisis);
        assert_eq!(result.mood_analysis.mood, Mood::Neutral);
        assert_eq!(result.mood_analysis.intensity, 5);
        let table = PatternTable::builtin().unwrap();
        assert!(table.default_replies.iter().any(|r| *r == result.reply));
    }

    #[tokio::test]
    async fn fallback_mood_is_deterministic_per_message() {
        let first = decider(ScriptedLlm::failing())
            .decide("I feel so sad today")
            .await;
        let second = decider(ScriptedLlm::failing())
            .decide("I feel so sad today")
            .await;

        assert_eq!(first.mood_analysis.mood, second.mood_analysis.mood);
        assert_eq!(first.mood_analysis.intensity, second.mood_analysis.intensity);
    }
}
