//! Per-learner state store.
//!
//! Owns every learner's analytics state and bounded interaction history.
//! Learners are created lazily on first write; reads of unknown learners get
//! a default snapshot without allocating an entry, so probe traffic cannot
//! grow the map.
//!
//! Concurrency: one write lock spans a whole feature-compute/predict/append
//! step, which keeps concurrent submissions for the same learner from
//! interleaving mid-update. Critical sections are pure CPU work, never held
//! across awaits.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use crate::mastery::types::{InteractionRecord, LearnerState};

/// Interactions retained per learner. Oldest drop first; windowed features
/// only ever look this far back.
pub const MAX_HISTORY: usize = 20;

/// One learner's state plus rolling history, newest at the back.
#[derive(Debug, Clone, Default)]
pub struct LearnerRecord {
    pub state: LearnerState,
    pub history: VecDeque<InteractionRecord>,
}

impl LearnerRecord {
    pub fn push_interaction(&mut self, interaction: InteractionRecord) {
        self.history.push_back(interaction);
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }
}

#[derive(Debug, Default)]
pub struct LearnerStore {
    learners: RwLock<HashMap<String, LearnerRecord>>,
}

impl LearnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state copy; unknown learners read as default without being
    /// inserted.
    pub fn state_snapshot(&self, learner_id: &str) -> LearnerState {
        self.learners
            .read()
            .get(learner_id)
            .map(|record| record.state.clone())
            .unwrap_or_default()
    }

    pub fn history_len(&self, learner_id: &str) -> usize {
        self.learners
            .read()
            .get(learner_id)
            .map(|record| record.history.len())
            .unwrap_or(0)
    }

    pub fn history_snapshot(&self, learner_id: &str) -> Vec<InteractionRecord> {
        self.learners
            .read()
            .get(learner_id)
            .map(|record| record.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn learner_count(&self) -> usize {
        self.learners.read().len()
    }

    /// Runs `f` under the store's write lock with the learner's record,
    /// creating it on first use. All mutation funnels through here so a
    /// compute-score-append sequence is one atomic step.
    pub fn with_record_mut<T>(&self, learner_id: &str, f: impl FnOnce(&mut LearnerRecord) -> T) -> T {
        let mut learners = self.learners.write();
        let record = learners.entry(learner_id.to_string()).or_default();
        f(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_interaction(n: u32) -> InteractionRecord {
        InteractionRecord {
            time_taken: n as f64,
            correct: n % 2 == 0,
            attempt_count: 1,
            hint_count: 0,
            bottom_hint: false,
            scaffold: false,
        }
    }

    #[test]
    fn test_snapshot_of_unknown_learner_is_default_and_not_inserted() {
        let store = LearnerStore::new();
        let state = store.state_snapshot("ghost");
        assert!(state.mastery.is_empty());
        assert_eq!(store.learner_count(), 0);
    }

    #[test]
    fn test_write_creates_learner_lazily() {
        let store = LearnerStore::new();
        store.with_record_mut("u1", |record| {
            record.push_interaction(numbered_interaction(1));
        });
        assert_eq!(store.learner_count(), 1);
        assert_eq!(store.history_len("u1"), 1);
    }

    #[test]
    fn test_history_caps_at_twenty_fifo() {
        let store = LearnerStore::new();
        for n in 0..25 {
            store.with_record_mut("u1", |record| {
                record.push_interaction(numbered_interaction(n));
            });
        }
        assert_eq!(store.history_len("u1"), MAX_HISTORY);
        let history = store.history_snapshot("u1");
        // Oldest five were evicted; the rest stay in chronological order.
        assert_eq!(history.first().unwrap().time_taken, 5.0);
        assert_eq!(history.last().unwrap().time_taken, 24.0);
        for pair in history.windows(2) {
            assert!(pair[0].time_taken < pair[1].time_taken);
        }
    }

    #[test]
    fn test_learners_are_isolated() {
        let store = LearnerStore::new();
        store.with_record_mut("u1", |record| {
            record.push_interaction(numbered_interaction(1));
            record.state.mastery.insert("Limits".to_string(), 0.9);
        });
        store.with_record_mut("u2", |record| {
            record.push_interaction(numbered_interaction(2));
        });
        assert_eq!(store.history_len("u1"), 1);
        assert_eq!(store.history_len("u2"), 1);
        assert!(store.state_snapshot("u2").mastery.is_empty());
        assert_eq!(store.state_snapshot("u1").mastery.get("Limits"), Some(&0.9));
    }

    #[test]
    fn test_concurrent_appends_do_not_lose_interactions() {
        use std::sync::Arc;

        let store = Arc::new(LearnerStore::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for n in 0..10 {
                    store.with_record_mut("shared", |record| {
                        record.push_interaction(numbered_interaction(t * 10 + n));
                    });
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // 40 appends through one lock: capped length, nothing truncated
        // mid-update.
        assert_eq!(store.history_len("shared"), MAX_HISTORY);
    }
}
