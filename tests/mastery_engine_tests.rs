//! Integration tests for the mastery engine: interaction scoring, history
//! bounds, quiz aggregation, and level assessment in both predictor modes.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use classmate_backend::mastery::model::MasteryModel;
use classmate_backend::mastery::types::{
    InteractionRecord, LearnerLevel, QuestionResult, QuizOutcome,
};
use classmate_backend::mastery::{MasteryEngine, MasteryPredictor};

fn heuristic_engine() -> MasteryEngine {
    MasteryEngine::new(MasteryPredictor::Heuristic)
}

fn model_engine() -> MasteryEngine {
    MasteryEngine::new(MasteryPredictor::Model(MasteryModel {
        feature_names: vec![
            "correct".to_string(),
            "AveCorrect".to_string(),
            "hintCount".to_string(),
        ],
        weights: vec![0.3, 0.4, -0.05],
        intercept: 0.2,
    }))
}

fn correct_attempt(time_taken: f64) -> InteractionRecord {
    InteractionRecord {
        time_taken,
        correct: true,
        attempt_count: 1,
        hint_count: 0,
        bottom_hint: false,
        scaffold: false,
    }
}

fn struggling_attempt(time_taken: f64) -> InteractionRecord {
    InteractionRecord {
        time_taken,
        correct: false,
        attempt_count: 3,
        hint_count: 2,
        bottom_hint: true,
        scaffold: true,
    }
}

fn answered_question(id: i64, correct: bool) -> QuestionResult {
    QuestionResult {
        question_id: Some(id),
        time_taken: 25.0,
        correct,
        attempt_count: 1,
        hint_count: 0,
    }
}

fn quiz_outcome(score: f64) -> QuizOutcome {
    QuizOutcome {
        score,
        time_taken: 300.0,
        total_questions: 5,
    }
}

#[test]
fn scores_stay_in_unit_interval_across_modes() {
    for engine in [heuristic_engine(), model_engine()] {
        for interaction in [
            correct_attempt(5.0),
            correct_attempt(600.0),
            struggling_attempt(45.0),
            InteractionRecord::default(),
        ] {
            let score = engine.score_interaction("u1", &interaction);
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }
}

#[test]
fn learners_are_scored_independently() {
    let engine = heuristic_engine();
    let a = engine.score_interaction("alice", &correct_attempt(30.0));
    let b = engine.score_interaction("bob", &correct_attempt(30.0));
    assert_eq!(a, b);
    assert_eq!(engine.learner_count(), 2);
}

#[test]
fn history_is_bounded() {
    let engine = heuristic_engine();
    for _ in 0..25 {
        engine.score_interaction("u1", &correct_attempt(20.0));
    }
    assert_eq!(engine.history_len("u1"), 20);
}

#[test]
fn repeated_success_raises_model_scores() {
    let engine = model_engine();
    let first = engine.score_interaction("u1", &correct_attempt(20.0));
    let mut last = first;
    for _ in 0..6 {
        last = engine.score_interaction("u1", &correct_attempt(20.0));
    }
    assert!(last >= first);
}

#[test]
fn quiz_submission_updates_learner_state() {
    let engine = heuristic_engine();
    let report = engine.submit_quiz(
        "u1",
        "Limits",
        "Limit Laws",
        &[answered_question(1, true), answered_question(2, false)],
    );

    assert_eq!(report.question_mastery.len(), 2);
    assert!((0.0..=100.0).contains(&report.overall_mastery));

    let state = engine.learner_state("u1");
    assert!(state.mastery.contains_key("Limits"));
    assert_eq!(state.recent_accuracy, Some(0.5));
    assert_eq!(engine.history_len("u1"), 2);
}

#[test]
fn empty_quiz_reports_neutral_mastery() {
    let engine = heuristic_engine();
    let report = engine.submit_quiz("u1", "Limits", "Continuity", &[]);
    assert_eq!(report.overall_mastery, 50.0);
    assert!(engine.learner_state("u1").mastery.is_empty());
}

#[test]
fn heuristic_assessment_averages_topic_map() {
    let engine = heuristic_engine();

    let low: HashMap<String, f64> =
        HashMap::from([("Limits".to_string(), 20.0), ("Derivatives".to_string(), 30.0)]);
    let assessment = engine.assess_level("u1", &[], &low);
    assert_eq!(assessment.level, LearnerLevel::Beginner);
    assert_eq!(assessment.confidence, 0.70);
    assert!(assessment.ml_score.is_none());

    let high: HashMap<String, f64> =
        HashMap::from([("Limits".to_string(), 90.0), ("Derivatives".to_string(), 95.0)]);
    let assessment = engine.assess_level("u1", &[], &high);
    assert_eq!(assessment.level, LearnerLevel::Advanced);
}

#[test]
fn heuristic_assessment_empty_map_is_beginner() {
    let engine = heuristic_engine();
    let assessment = engine.assess_level("u1", &[], &HashMap::new());
    assert_eq!(assessment.level, LearnerLevel::Beginner);
    assert_eq!(assessment.avg_mastery, 0.0);
    assert!(assessment.ml_score.is_none());
}

#[test]
fn model_assessment_replays_recent_quizzes() {
    let engine = model_engine();
    let history = vec![quiz_outcome(90.0), quiz_outcome(85.0), quiz_outcome(95.0)];
    let topics: HashMap<String, f64> = HashMap::from([("Limits".to_string(), 88.0)]);

    let assessment = engine.assess_level("u1", &history, &topics);

    assert_eq!(assessment.confidence, 0.85);
    let ml_score = assessment.ml_score.unwrap();
    assert!((0.0..=1.0).contains(&ml_score));
    assert_eq!(assessment.avg_mastery, ml_score * 100.0);
}

#[test]
fn assessment_partitions_weak_and_strong_topics() {
    let engine = heuristic_engine();
    let topics: HashMap<String, f64> = HashMap::from([
        ("Series".to_string(), 65.0),
        ("Limits".to_string(), 92.0),
        ("Applications".to_string(), 40.0),
        ("Derivatives".to_string(), 81.0),
        ("Integration".to_string(), 75.0),
    ]);

    let assessment = engine.assess_level("u1", &[], &topics);

    assert_eq!(assessment.weak_topics, vec!["Applications", "Series"]);
    assert_eq!(assessment.strong_topics, vec!["Derivatives", "Limits"]);
}

#[test]
fn predictor_falls_back_when_artifact_missing() {
    let predictor = MasteryPredictor::from_artifact(Some(Path::new("/nonexistent/model.json")));
    assert!(!predictor.is_model());
    assert_eq!(predictor.mode(), "heuristic");
}

#[test]
fn predictor_loads_artifact_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"feature_names": ["correct", "AveKnow"], "weights": [0.5, 0.3], "intercept": 0.1}}"#
    )
    .unwrap();

    let predictor = MasteryPredictor::from_artifact(Some(file.path()));
    assert!(predictor.is_model());
    assert_eq!(predictor.mode(), "model");
}
