//! Feature derivation for mastery prediction.
//!
//! Every prediction consumes one feature vector: the current attempt's raw
//! fields, windowed aggregates over the learner's prior history, and three
//! engineered ratios. Names match the columns the regressor was trained on.
//!
//! History passed in never includes the attempt being scored; appending it
//! afterwards is the caller's job, so re-scoring the same attempt is
//! repeatable.

use std::collections::VecDeque;

use crate::mastery::types::{FeatureVector, InteractionRecord};

pub const TIME_TAKEN: &str = "timeTaken";
pub const CORRECT: &str = "correct";
pub const ATTEMPT_COUNT: &str = "attemptCount";
pub const HINT_COUNT: &str = "hintCount";
pub const BOTTOM_HINT: &str = "bottomHint";
pub const SCAFFOLD: &str = "scaffold";
pub const HELP_RATE_LAST_5: &str = "frPast5HelpRequest";
pub const WRONG_COUNT_LAST_8: &str = "frPast8WrongCount";
pub const OVERALL_WRONG_FRACTION: &str = "totalFrPercentPastWrong";
pub const AVG_CORRECT: &str = "AveCorrect";
pub const AVG_KNOWLEDGE: &str = "AveKnow";
pub const AVG_SCAFFOLD_TIME: &str = "frTimeTakenOnScaffolding";
pub const EFFICIENCY: &str = "efficiency";
pub const STRUGGLE_SCORE: &str = "struggle_score";
pub const TIME_PER_ATTEMPT: &str = "time_per_attempt";

/// Cold-start values used when a learner has no recorded history yet.
/// Deliberately neutral-pessimistic: a fresh learner looks like an average
/// student, not a perfect one.
const DEFAULT_HELP_RATE: f64 = 0.3;
const DEFAULT_WRONG_COUNT: f64 = 2.0;
const DEFAULT_WRONG_FRACTION: f64 = 0.3;
const DEFAULT_AVG_CORRECT: f64 = 0.5;
const DEFAULT_AVG_KNOWLEDGE: f64 = 0.5;

const RECENT_WINDOW: usize = 5;
const WRONG_WINDOW: usize = 8;

/// Derives the full feature vector for one attempt. Pure: reads history,
/// mutates nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngine;

impl FeatureEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(
        &self,
        history: &VecDeque<InteractionRecord>,
        current: &InteractionRecord,
    ) -> FeatureVector {
        let mut features = FeatureVector::with_capacity(15);

        let attempts = current.attempt_count as f64;
        let hints = current.hint_count as f64;

        features.push(TIME_TAKEN, current.time_taken);
        features.push(CORRECT, current.correct_value());
        features.push(ATTEMPT_COUNT, attempts);
        features.push(HINT_COUNT, hints);
        features.push(BOTTOM_HINT, if current.bottom_hint { 1.0 } else { 0.0 });
        features.push(SCAFFOLD, if current.scaffold { 1.0 } else { 0.0 });

        if history.is_empty() {
            features.push(HELP_RATE_LAST_5, DEFAULT_HELP_RATE);
            features.push(WRONG_COUNT_LAST_8, DEFAULT_WRONG_COUNT);
            features.push(OVERALL_WRONG_FRACTION, DEFAULT_WRONG_FRACTION);
            features.push(AVG_CORRECT, DEFAULT_AVG_CORRECT);
            features.push(AVG_KNOWLEDGE, DEFAULT_AVG_KNOWLEDGE);
            features.push(AVG_SCAFFOLD_TIME, 0.0);
        } else {
            let recent_5: Vec<&InteractionRecord> =
                history.iter().rev().take(RECENT_WINDOW).collect();
            let recent_8_wrong = history
                .iter()
                .rev()
                .take(WRONG_WINDOW)
                .filter(|r| !r.correct)
                .count();

            let help_rate = recent_5.iter().filter(|r| r.hint_count > 0).count() as f64
                / recent_5.len() as f64;
            let total_wrong = history.iter().filter(|r| !r.correct).count() as f64;
            let avg_correct =
                history.iter().map(|r| r.correct_value()).sum::<f64>() / history.len() as f64;
            let avg_knowledge =
                recent_5.iter().map(|r| r.correct_value()).sum::<f64>() / recent_5.len() as f64;

            let scaffold_times: Vec<f64> = history
                .iter()
                .filter(|r| r.scaffold)
                .map(|r| r.time_taken)
                .collect();
            let avg_scaffold_time = if scaffold_times.is_empty() {
                0.0
            } else {
                scaffold_times.iter().sum::<f64>() / scaffold_times.len() as f64
            };

            features.push(HELP_RATE_LAST_5, help_rate);
            features.push(WRONG_COUNT_LAST_8, recent_8_wrong as f64);
            features.push(OVERALL_WRONG_FRACTION, total_wrong / history.len() as f64);
            features.push(AVG_CORRECT, avg_correct);
            features.push(AVG_KNOWLEDGE, avg_knowledge);
            features.push(AVG_SCAFFOLD_TIME, avg_scaffold_time);
        }

        // The +1 denominators dampen first attempts and keep the division
        // defined for a zero attempt count on malformed input.
        features.push(EFFICIENCY, current.correct_value() / (attempts + 1.0));
        features.push(STRUGGLE_SCORE, attempts * 0.5 + hints * 0.5);
        features.push(TIME_PER_ATTEMPT, current.time_taken / (attempts + 1.0));

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(correct: bool, hints: u32) -> InteractionRecord {
        InteractionRecord {
            time_taken: 20.0,
            correct,
            attempt_count: 1,
            hint_count: hints,
            bottom_hint: false,
            scaffold: false,
        }
    }

    fn scaffold_record(time_taken: f64) -> InteractionRecord {
        InteractionRecord {
            time_taken,
            scaffold: true,
            ..InteractionRecord::default()
        }
    }

    fn default_current() -> InteractionRecord {
        InteractionRecord {
            time_taken: 30.0,
            correct: true,
            attempt_count: 2,
            hint_count: 1,
            bottom_hint: false,
            scaffold: false,
        }
    }

    #[test]
    fn test_cold_start_defaults() {
        let engine = FeatureEngine::new();
        let features = engine.compute(&VecDeque::new(), &default_current());
        assert_eq!(features.get(HELP_RATE_LAST_5), Some(0.3));
        assert_eq!(features.get(WRONG_COUNT_LAST_8), Some(2.0));
        assert_eq!(features.get(OVERALL_WRONG_FRACTION), Some(0.3));
        assert_eq!(features.get(AVG_CORRECT), Some(0.5));
        assert_eq!(features.get(AVG_KNOWLEDGE), Some(0.5));
        assert_eq!(features.get(AVG_SCAFFOLD_TIME), Some(0.0));
    }

    #[test]
    fn test_base_features_copy_current_fields() {
        let engine = FeatureEngine::new();
        let features = engine.compute(&VecDeque::new(), &default_current());
        assert_eq!(features.get(TIME_TAKEN), Some(30.0));
        assert_eq!(features.get(CORRECT), Some(1.0));
        assert_eq!(features.get(ATTEMPT_COUNT), Some(2.0));
        assert_eq!(features.get(HINT_COUNT), Some(1.0));
        assert_eq!(features.get(BOTTOM_HINT), Some(0.0));
        assert_eq!(features.get(SCAFFOLD), Some(0.0));
    }

    #[test]
    fn test_engineered_features_from_formulas() {
        // correct=1, attemptCount=2, hintCount=1, timeTaken=30
        let engine = FeatureEngine::new();
        let features = engine.compute(&VecDeque::new(), &default_current());
        let efficiency = features.get(EFFICIENCY).unwrap();
        assert!((efficiency - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(features.get(STRUGGLE_SCORE), Some(1.5));
        assert_eq!(features.get(TIME_PER_ATTEMPT), Some(10.0));
    }

    #[test]
    fn test_help_rate_over_last_five() {
        let engine = FeatureEngine::new();
        // 7 records: the last 5 are [hints, none, hints, none, none]
        let history: VecDeque<InteractionRecord> = vec![
            record(true, 9),
            record(true, 9),
            record(true, 2),
            record(true, 0),
            record(true, 1),
            record(true, 0),
            record(true, 0),
        ]
        .into();
        let features = engine.compute(&history, &default_current());
        assert_eq!(features.get(HELP_RATE_LAST_5), Some(2.0 / 5.0));
    }

    #[test]
    fn test_wrong_count_over_last_eight() {
        let engine = FeatureEngine::new();
        // 10 records, wrong ones at positions the 8-window should see: 3 of
        // the last 8 are wrong, the 2 oldest wrong ones fall outside.
        let mut records = vec![record(false, 0), record(false, 0)];
        records.extend(vec![record(true, 0); 5]);
        records.push(record(false, 0));
        records.push(record(false, 0));
        records.push(record(false, 0));
        let history: VecDeque<InteractionRecord> = records.into();
        let features = engine.compute(&history, &default_current());
        assert_eq!(features.get(WRONG_COUNT_LAST_8), Some(3.0));
    }

    #[test]
    fn test_overall_fractions() {
        let engine = FeatureEngine::new();
        let history: VecDeque<InteractionRecord> = vec![
            record(true, 0),
            record(false, 0),
            record(true, 0),
            record(false, 0),
        ]
        .into();
        let features = engine.compute(&history, &default_current());
        assert_eq!(features.get(OVERALL_WRONG_FRACTION), Some(0.5));
        assert_eq!(features.get(AVG_CORRECT), Some(0.5));
    }

    #[test]
    fn test_knowledge_proxy_uses_recent_window_only() {
        let engine = FeatureEngine::new();
        // Old records all wrong, last 5 all correct.
        let mut records = vec![record(false, 0); 5];
        records.extend(vec![record(true, 0); 5]);
        let history: VecDeque<InteractionRecord> = records.into();
        let features = engine.compute(&history, &default_current());
        assert_eq!(features.get(AVG_KNOWLEDGE), Some(1.0));
        assert_eq!(features.get(AVG_CORRECT), Some(0.5));
    }

    #[test]
    fn test_scaffold_time_averages_scaffold_records_only() {
        let engine = FeatureEngine::new();
        let history: VecDeque<InteractionRecord> = vec![
            scaffold_record(40.0),
            record(true, 0),
            scaffold_record(20.0),
        ]
        .into();
        let features = engine.compute(&history, &default_current());
        assert_eq!(features.get(AVG_SCAFFOLD_TIME), Some(30.0));
    }

    #[test]
    fn test_no_scaffold_records_yields_zero() {
        let engine = FeatureEngine::new();
        let history: VecDeque<InteractionRecord> = vec![record(true, 0); 3].into();
        let features = engine.compute(&history, &default_current());
        assert_eq!(features.get(AVG_SCAFFOLD_TIME), Some(0.0));
    }

    #[test]
    fn test_history_is_not_mutated() {
        let engine = FeatureEngine::new();
        let history: VecDeque<InteractionRecord> = vec![record(true, 0); 3].into();
        let before = history.clone();
        let _ = engine.compute(&history, &default_current());
        assert_eq!(history, before);
    }

    #[test]
    fn test_vector_has_all_fifteen_features_in_order() {
        let engine = FeatureEngine::new();
        let features = engine.compute(&VecDeque::new(), &default_current());
        assert_eq!(features.len(), 15);
        assert_eq!(
            features.names(),
            &[
                TIME_TAKEN,
                CORRECT,
                ATTEMPT_COUNT,
                HINT_COUNT,
                BOTTOM_HINT,
                SCAFFOLD,
                HELP_RATE_LAST_5,
                WRONG_COUNT_LAST_8,
                OVERALL_WRONG_FRACTION,
                AVG_CORRECT,
                AVG_KNOWLEDGE,
                AVG_SCAFFOLD_TIME,
                EFFICIENCY,
                STRUGGLE_SCORE,
                TIME_PER_ATTEMPT,
            ]
        );
    }
}
