//! Mastery scoring orchestration.
//!
//! Composes the feature engine, the predictor, and the learner store into the
//! scoring path: features come from history *before* the attempt being
//! scored, the attempt is appended only after its score exists, and both
//! happen under one per-step lock so concurrent submissions for a learner
//! cannot interleave.

use std::collections::HashMap;

use crate::mastery::features::FeatureEngine;
use crate::mastery::predictor::MasteryPredictor;
use crate::mastery::store::LearnerStore;
use crate::mastery::types::{
    InteractionRecord, LearnerLevel, LearnerState, LevelAssessment, QuestionMastery,
    QuestionResult, QuizMasteryReport, QuizOutcome,
};

/// Fixed per-mode confidence reported by level assessment. These are design
/// constants, not derived from prediction variance.
const MODEL_CONFIDENCE: f64 = 0.85;
const HEURISTIC_CONFIDENCE: f64 = 0.70;

/// Quizzes considered by a level assessment, most recent first.
const ASSESS_QUIZ_WINDOW: usize = 10;

/// A quiz score above this fraction counts as a correct outcome when a past
/// quiz is replayed through the predictor.
const QUIZ_CORRECT_THRESHOLD: f64 = 0.7;

const WEAK_TOPIC_CUTOFF: f64 = 70.0;
const STRONG_TOPIC_CUTOFF: f64 = 80.0;

pub struct MasteryEngine {
    features: FeatureEngine,
    predictor: MasteryPredictor,
    store: LearnerStore,
}

impl MasteryEngine {
    pub fn new(predictor: MasteryPredictor) -> Self {
        Self {
            features: FeatureEngine::new(),
            predictor,
            store: LearnerStore::new(),
        }
    }

    pub fn predictor(&self) -> &MasteryPredictor {
        &self.predictor
    }

    pub fn learner_state(&self, learner_id: &str) -> LearnerState {
        self.store.state_snapshot(learner_id)
    }

    pub fn history_len(&self, learner_id: &str) -> usize {
        self.store.history_len(learner_id)
    }

    pub fn learner_count(&self) -> usize {
        self.store.learner_count()
    }

    /// Scores one attempt and records it. The whole read-features, predict,
    /// append sequence runs as a single step under the learner's lock.
    pub fn score_interaction(&self, learner_id: &str, interaction: &InteractionRecord) -> f64 {
        self.store.with_record_mut(learner_id, |record| {
            let features = self.features.compute(&record.history, interaction);
            let score = self.predictor.predict(&features);
            record.push_interaction(interaction.clone());
            score
        })
    }

    /// Scores a whole quiz submission question by question, then folds the
    /// aggregate back into the learner's topic mastery.
    pub fn submit_quiz(
        &self,
        learner_id: &str,
        topic: &str,
        subtopic: &str,
        questions: &[QuestionResult],
    ) -> QuizMasteryReport {
        let mut question_mastery = Vec::with_capacity(questions.len());
        for question in questions {
            let interaction = InteractionRecord {
                time_taken: question.time_taken,
                correct: question.correct,
                attempt_count: question.attempt_count,
                hint_count: question.hint_count,
                bottom_hint: false,
                scaffold: false,
            };
            let score = self.score_interaction(learner_id, &interaction);
            question_mastery.push(QuestionMastery {
                question_id: question.question_id,
                mastery_score: score,
            });
        }

        let avg_mastery = if question_mastery.is_empty() {
            0.5
        } else {
            question_mastery.iter().map(|q| q.mastery_score).sum::<f64>()
                / question_mastery.len() as f64
        };

        if !questions.is_empty() {
            let accuracy =
                questions.iter().filter(|q| q.correct).count() as f64 / questions.len() as f64;
            self.store.with_record_mut(learner_id, |record| {
                record.state.mastery.insert(topic.to_string(), avg_mastery);
                record.state.recent_accuracy = Some(accuracy);
            });
        }

        QuizMasteryReport {
            topic: topic.to_string(),
            subtopic: subtopic.to_string(),
            question_mastery,
            overall_mastery: avg_mastery * 100.0,
        }
    }

    /// Overall proficiency band from recent quizzes and the dashboard's
    /// topic-mastery map (0-100 per topic).
    ///
    /// Model mode replays the recent quizzes through the predictor; heuristic
    /// mode has no per-quiz signal worth replaying and falls back to the
    /// topic-mastery average.
    pub fn assess_level(
        &self,
        learner_id: &str,
        quiz_history: &[QuizOutcome],
        topic_mastery: &HashMap<String, f64>,
    ) -> LevelAssessment {
        // Empty-map fallback differs by mode: the model stays neutral at
        // 0.5, the heuristic reports 0 and lands in Beginner.
        let map_average = |when_empty: f64| {
            if topic_mastery.is_empty() {
                when_empty
            } else {
                let sum: f64 = topic_mastery.values().sum();
                (sum / topic_mastery.len() as f64) / 100.0
            }
        };

        let (avg, ml_score, confidence) = if self.predictor.is_model() {
            let recent = quiz_history
                .iter()
                .rev()
                .take(ASSESS_QUIZ_WINDOW)
                .rev()
                .collect::<Vec<_>>();
            let scores: Vec<f64> = recent
                .iter()
                .map(|quiz| {
                    let questions = quiz.total_questions.max(1) as f64;
                    let fraction = quiz.score / 100.0;
                    let interaction = InteractionRecord {
                        time_taken: quiz.time_taken / questions,
                        correct: fraction > QUIZ_CORRECT_THRESHOLD,
                        attempt_count: 1,
                        hint_count: 0,
                        bottom_hint: false,
                        scaffold: false,
                    };
                    self.score_interaction(learner_id, &interaction)
                })
                .collect();
            let avg = if scores.is_empty() {
                map_average(0.5)
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };
            (avg, Some(avg), MODEL_CONFIDENCE)
        } else {
            (map_average(0.0), None, HEURISTIC_CONFIDENCE)
        };

        let level = LearnerLevel::from_average(avg);
        let recommendation = if self.predictor.is_model() {
            match level {
                LearnerLevel::Beginner => {
                    "Focus on foundational concepts. Start with Guided Study to strengthen weak areas."
                        .to_string()
                }
                LearnerLevel::Intermediate => {
                    "You're making good progress! Continue with Guided Study and challenge yourself with quizzes."
                        .to_string()
                }
                LearnerLevel::Advanced => {
                    "Excellent work! Explore advanced topics in Learner Hub and help others."
                        .to_string()
                }
            }
        } else {
            format!(
                "Based on your average mastery of {:.1}%, you're at {} level.",
                avg * 100.0,
                level.as_str()
            )
        };

        let mut weak_topics: Vec<String> = topic_mastery
            .iter()
            .filter(|(_, score)| **score < WEAK_TOPIC_CUTOFF)
            .map(|(topic, _)| topic.clone())
            .collect();
        let mut strong_topics: Vec<String> = topic_mastery
            .iter()
            .filter(|(_, score)| **score >= STRONG_TOPIC_CUTOFF)
            .map(|(topic, _)| topic.clone())
            .collect();
        weak_topics.sort();
        strong_topics.sort();

        LevelAssessment {
            user_id: learner_id.to_string(),
            level,
            confidence,
            avg_mastery: avg * 100.0,
            ml_score,
            recommendation,
            weak_topics,
            strong_topics,
        }
    }
}
