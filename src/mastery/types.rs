//! Mastery estimation types: graded interactions, per-learner state, feature
//! vectors, and the aggregate assessment DTOs.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts `true`/`false` as well as the 0/1 numerics older clients send.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrNumber {
        Bool(bool),
        Number(f64),
    }
    Ok(match Option::<BoolOrNumber>::deserialize(deserializer)? {
        Some(BoolOrNumber::Bool(b)) => b,
        Some(BoolOrNumber::Number(n)) => n != 0.0,
        None => false,
    })
}

fn default_attempt_count() -> u32 {
    1
}

/// One graded attempt at a problem. Immutable once recorded; missing fields
/// deserialize to their neutral defaults rather than failing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    /// Seconds spent on the attempt.
    #[serde(default)]
    pub time_taken: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub correct: bool,
    #[serde(default = "default_attempt_count")]
    pub attempt_count: u32,
    #[serde(default)]
    pub hint_count: u32,
    /// Whether the learner reached the bottom-out hint (the full answer).
    #[serde(default, deserialize_with = "lenient_bool")]
    pub bottom_hint: bool,
    /// Whether scaffolding was shown during the attempt.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub scaffold: bool,
}

impl Default for InteractionRecord {
    fn default() -> Self {
        Self {
            time_taken: 0.0,
            correct: false,
            attempt_count: 1,
            hint_count: 0,
            bottom_hint: false,
            scaffold: false,
        }
    }
}

impl InteractionRecord {
    pub fn correct_value(&self) -> f64 {
        if self.correct {
            1.0
        } else {
            0.0
        }
    }
}

/// Self-declared learning style preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Procedural,
    Mixed,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Procedural => "procedural",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "visual" => Self::Visual,
            "procedural" => Self::Procedural,
            _ => Self::Mixed,
        }
    }
}

/// Per-learner analytics state. Mostly sparse today: the mastery map and
/// recent accuracy fill in as quizzes are scored, the rest are placeholders
/// the policy layer may consult later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerState {
    /// Topic → mastery probability in [0, 1].
    #[serde(default)]
    pub mastery: HashMap<String, f64>,
    #[serde(default)]
    pub recent_accuracy: Option<f64>,
    #[serde(default)]
    pub avg_response_time: Option<f64>,
    #[serde(default)]
    pub preferred_style: Option<LearningStyle>,
    #[serde(default)]
    pub struggle_topics: Vec<String>,
}

/// Ordered feature name/value pairs. Order is the engine's canonical layout;
/// the predictor re-projects by name against the trained artifact's schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    names: Vec<&'static str>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: &'static str, value: f64) {
        self.names.push(name);
        self.values.push(value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// One answered quiz question as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    #[serde(default)]
    pub question_id: Option<i64>,
    #[serde(default = "default_question_time")]
    pub time_taken: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub correct: bool,
    #[serde(default = "default_attempt_count")]
    pub attempt_count: u32,
    #[serde(default)]
    pub hint_count: u32,
}

fn default_question_time() -> f64 {
    30.0
}

/// Per-question mastery estimate in a quiz report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMastery {
    pub question_id: Option<i64>,
    pub mastery_score: f64,
}

/// Scored quiz submission: per-question estimates plus the topic aggregate
/// on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMasteryReport {
    pub topic: String,
    pub subtopic: String,
    pub question_mastery: Vec<QuestionMastery>,
    pub overall_mastery: f64,
}

/// One past quiz as the dashboard reports it for level assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOutcome {
    /// Percentage score, 0-100.
    #[serde(default = "default_quiz_score")]
    pub score: f64,
    /// Whole-quiz duration in seconds.
    #[serde(default = "default_quiz_time", alias = "timeTaken")]
    pub time_taken: f64,
    #[serde(default = "default_quiz_questions", rename = "totalQuestions")]
    pub total_questions: u32,
}

fn default_quiz_score() -> f64 {
    50.0
}

fn default_quiz_time() -> f64 {
    300.0
}

fn default_quiz_questions() -> u32 {
    5
}

/// Coarse proficiency bands reported to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearnerLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl LearnerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Band for an average mastery probability.
    pub fn from_average(avg: f64) -> Self {
        if avg < 0.4 {
            Self::Beginner
        } else if avg < 0.7 {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }
}

/// Aggregate proficiency assessment. `confidence` is a fixed per-mode
/// constant, not a statistically derived interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAssessment {
    pub user_id: String,
    pub level: LearnerLevel,
    pub confidence: f64,
    /// Average mastery on a 0-100 scale.
    pub avg_mastery: f64,
    /// Model-mode average in [0, 1]; absent in heuristic mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_score: Option<f64>,
    pub recommendation: String,
    pub weak_topics: Vec<String>,
    pub strong_topics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_defaults_fill_missing_fields() {
        let record: InteractionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.time_taken, 0.0);
        assert!(!record.correct);
        assert_eq!(record.attempt_count, 1);
        assert_eq!(record.hint_count, 0);
        assert!(!record.bottom_hint);
        assert!(!record.scaffold);
    }

    #[test]
    fn test_interaction_accepts_numeric_flags() {
        let record: InteractionRecord =
            serde_json::from_str(r#"{"correct":1,"bottomHint":0,"scaffold":1}"#).unwrap();
        assert!(record.correct);
        assert!(!record.bottom_hint);
        assert!(record.scaffold);
    }

    #[test]
    fn test_interaction_accepts_boolean_flags() {
        let record: InteractionRecord =
            serde_json::from_str(r#"{"correct":true,"scaffold":false}"#).unwrap();
        assert!(record.correct);
        assert!(!record.scaffold);
    }

    #[test]
    fn test_feature_vector_lookup() {
        let mut features = FeatureVector::with_capacity(2);
        features.push("correct", 1.0);
        features.push("hintCount", 3.0);
        assert_eq!(features.get("correct"), Some(1.0));
        assert_eq!(features.get("hintCount"), Some(3.0));
        assert_eq!(features.get("missing"), None);
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn test_quiz_outcome_defaults() {
        let quiz: QuizOutcome = serde_json::from_str("{}").unwrap();
        assert_eq!(quiz.score, 50.0);
        assert_eq!(quiz.time_taken, 300.0);
        assert_eq!(quiz.total_questions, 5);
    }

    #[test]
    fn test_quiz_outcome_accepts_camel_case_time() {
        let quiz: QuizOutcome =
            serde_json::from_str(r#"{"score":80,"timeTaken":120,"totalQuestions":4}"#).unwrap();
        assert_eq!(quiz.time_taken, 120.0);
        assert_eq!(quiz.total_questions, 4);
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(LearnerLevel::from_average(0.0), LearnerLevel::Beginner);
        assert_eq!(LearnerLevel::from_average(0.39), LearnerLevel::Beginner);
        assert_eq!(LearnerLevel::from_average(0.4), LearnerLevel::Intermediate);
        assert_eq!(LearnerLevel::from_average(0.69), LearnerLevel::Intermediate);
        assert_eq!(LearnerLevel::from_average(0.7), LearnerLevel::Advanced);
        assert_eq!(LearnerLevel::from_average(1.0), LearnerLevel::Advanced);
    }

    #[test]
    fn test_learner_state_round_trip() {
        let mut state = LearnerState::default();
        state.mastery.insert("Limits".to_string(), 0.45);
        state.recent_accuracy = Some(0.6);
        state.preferred_style = Some(LearningStyle::Visual);
        let json = serde_json::to_value(&state).unwrap();
        let restored: LearnerState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.mastery.get("Limits"), Some(&0.45));
        assert_eq!(restored.preferred_style, Some(LearningStyle::Visual));
    }
}
