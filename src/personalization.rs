//! Single entry point the lesson UI talks to.
//!
//! Every submit call reads one record, hands it to one engine and writes the
//! result back with a single `set`. Queries never write. Records that fail to
//! load are replaced by fresh defaults instead of surfacing an error.

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::database::Store;
use crate::engines::{
    AttemptOutcome, CompletionOutcome, CompletionStatus, DifficultyRegulator, DueReview,
    ReviewScheduler, ReviewStats, StreakSummary, StreakTracker,
};
use crate::error::{EngineError, Result};
use crate::export::json::Snapshot;
use crate::models::{self, DifficultyState, Quality, Record, ReviewBook, ReviewItem, StreakState};
use tracing::warn;

pub struct Personalization<S, C> {
    store: S,
    clock: C,
    config: EngineConfig,
}

impl<S: Store, C: Clock> Personalization<S, C> {
    pub fn new(store: S, clock: C, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Grades a vocabulary item (quality 0-5) and reschedules it.
    pub fn submit_review_result(&mut self, item_id: &str, quality: u8) -> Result<ReviewItem> {
        let quality = Quality::new(quality)?;
        if item_id.trim().is_empty() {
            return Err(EngineError::InvalidInput("item id must not be empty".into()));
        }

        let mut book: ReviewBook = self.load()?;
        let item = ReviewScheduler::new(&self.config.scheduler).review_item(
            &mut book,
            item_id,
            quality,
            self.clock.now(),
        );
        self.persist(&book)?;
        Ok(item)
    }

    /// Marks today's practice as done. Repeated calls on the same day only report `Already`.
    pub fn submit_practice_completion(&mut self) -> Result<CompletionOutcome> {
        let mut state: StreakState = self.load()?;
        let outcome =
            StreakTracker::new(&self.config.streak).complete_today(&mut state, self.clock.now());
        if outcome.status != CompletionStatus::Already {
            self.persist(&state)?;
        }
        Ok(outcome)
    }

    pub fn submit_quiz_answer(&mut self, correct: bool) -> Result<AttemptOutcome> {
        let mut state: DifficultyState = self.load()?;
        let outcome =
            DifficultyRegulator::new(&self.config.difficulty).record_attempt(&mut state, correct);
        self.persist(&state)?;
        Ok(outcome)
    }

    /// Catalog items due now, in catalog order.
    pub fn query_due_reviews<T: AsRef<str>>(&self, catalog: &[T]) -> Vec<DueReview> {
        let book: ReviewBook = self.load_or_fresh();
        ReviewScheduler::new(&self.config.scheduler).due_items(&book, catalog, self.clock.now())
    }

    pub fn query_review_stats(&self) -> ReviewStats {
        let book: ReviewBook = self.load_or_fresh();
        ReviewScheduler::new(&self.config.scheduler).stats(&book, self.clock.now())
    }

    pub fn query_streak(&self) -> StreakSummary {
        let state: StreakState = self.load_or_fresh();
        StreakTracker::new(&self.config.streak).summary(&state, self.clock.now())
    }

    pub fn query_difficulty(&self) -> u8 {
        let state: DifficultyState = self.load_or_fresh();
        DifficultyRegulator::new(&self.config.difficulty).difficulty(&state)
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            review_state: self.load_or_fresh(),
            streak_state: self.load_or_fresh(),
            difficulty_state: self.load_or_fresh(),
        }
    }

    /// Replaces all three records. Each record is validated before anything is written.
    ///
    /// The records are written with three separate `set` calls. If a later write
    /// fails, the records already written stay in the store next to the older ones.
    pub fn restore_snapshot(&mut self, snapshot: Snapshot) -> Result<()> {
        let snapshot = snapshot.validated(&self.config)?;
        self.persist(&snapshot.review_state)?;
        self.persist(&snapshot.streak_state)?;
        self.persist(&snapshot.difficulty_state)?;
        Ok(())
    }

    /// Reads a record, replacing malformed content with a fresh one.
    /// Store failures are returned so a write never clobbers unread data.
    fn load<R: Record>(&self) -> Result<R> {
        let Some(raw) = self.store.get(R::KEY)? else {
            return Ok(R::fresh(&self.config));
        };
        match models::decode::<R>(&raw, &self.config) {
            Ok(record) => Ok(record),
            Err(err) => {
                warn!(key = R::KEY, error = %err, "discarding malformed state");
                Ok(R::fresh(&self.config))
            }
        }
    }

    fn load_or_fresh<R: Record>(&self) -> R {
        self.load().unwrap_or_else(|err| {
            warn!(key = R::KEY, error = %err, "store read failed; using defaults");
            R::fresh(&self.config)
        })
    }

    fn persist<R: Record>(&mut self, record: &R) -> Result<()> {
        let raw = models::encode(record)?;
        self.store.set(R::KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::database::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 20, 0, 0).unwrap()
    }

    fn engine(clock: &FixedClock) -> Personalization<MemoryStore, &FixedClock> {
        Personalization::new(MemoryStore::new(), clock, EngineConfig::default()).unwrap()
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl Store for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(EngineError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn test_review_is_persisted() {
        let clock = FixedClock::new(start());
        let mut engine = engine(&clock);

        engine.submit_review_result("hablar", 5).unwrap();
        let raw = engine.store().get("review_state").unwrap().unwrap();
        assert!(raw.contains("\"hablar\""));
        assert_eq!(engine.query_review_stats().total, 1);
    }

    #[test]
    fn test_invalid_quality_is_rejected_without_write() {
        let clock = FixedClock::new(start());
        let mut engine = engine(&clock);

        let err = engine.submit_review_result("hablar", 6).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert!(engine.store().get("review_state").unwrap().is_none());

        assert!(engine.submit_review_result("  ", 3).is_err());
    }

    #[test]
    fn test_due_reviews_follow_clock() {
        let clock = FixedClock::new(start());
        let mut engine = engine(&clock);
        engine.submit_review_result("uno", 4).unwrap();

        assert!(engine.query_due_reviews(&["uno"]).is_empty());
        clock.advance_days(1);
        assert_eq!(engine.query_due_reviews(&["uno"]).len(), 1);
    }

    #[test]
    fn test_completion_twice_writes_once() {
        let clock = FixedClock::new(start());
        let mut engine = engine(&clock);

        let first = engine.submit_practice_completion().unwrap();
        assert_eq!(first.status, CompletionStatus::Started);
        let stored = engine.store().get("streak_state").unwrap();

        let second = engine.submit_practice_completion().unwrap();
        assert_eq!(second.status, CompletionStatus::Already);
        assert_eq!(engine.store().get("streak_state").unwrap(), stored);
        assert_eq!(engine.query_streak().total_days, 1);
    }

    #[test]
    fn test_malformed_state_falls_back_to_defaults() {
        let clock = FixedClock::new(start());
        let mut store = MemoryStore::new();
        store.set("difficulty_state", r#"{"attempts":"nope"}"#).unwrap();
        store.set("streak_state", "[1,2,3]").unwrap();
        let mut engine = Personalization::new(store, &clock, EngineConfig::default()).unwrap();

        assert_eq!(engine.query_difficulty(), 2);
        assert_eq!(engine.query_streak().current_streak, 0);

        let outcome = engine.submit_quiz_answer(false).unwrap();
        assert_eq!(outcome.difficulty_level, 1);
        let outcome = engine.submit_practice_completion().unwrap();
        assert_eq!(outcome.status, CompletionStatus::Started);
    }

    #[test]
    fn test_smaller_limits_keep_progress() {
        let clock = FixedClock::new(start());
        let mut engine = engine(&clock);
        for _ in 0..10 {
            engine.submit_practice_completion().unwrap();
            clock.advance_days(1);
        }
        for _ in 0..20 {
            engine.submit_quiz_answer(true).unwrap();
        }
        assert_eq!(engine.query_difficulty(), 3);

        let mut config = EngineConfig::default();
        config.streak.monthly_freeze_quota = 1;
        config.difficulty.window = 10;
        let mut engine = Personalization::new(engine.into_store(), &clock, config).unwrap();

        let summary = engine.query_streak();
        assert_eq!(summary.current_streak, 10);
        assert_eq!(summary.total_days, 10);
        assert_eq!(summary.freezes_available, 1);
        assert_eq!(engine.query_difficulty(), 3);

        let outcome = engine.submit_practice_completion().unwrap();
        assert_eq!(outcome.status, CompletionStatus::Continued);
        assert_eq!(outcome.state.current_streak, 11);

        let attempt = engine.submit_quiz_answer(true).unwrap();
        assert_eq!(attempt.difficulty_level, 3);
        assert_eq!(attempt.success_rate, 1.0);
    }

    #[test]
    fn test_failed_write_leaves_previous_snapshot() {
        let clock = FixedClock::new(start());
        let mut inner = MemoryStore::new();
        inner
            .set("difficulty_state", r#"{"attempts":[true],"difficultyLevel":3}"#)
            .unwrap();
        let mut engine =
            Personalization::new(ReadOnlyStore(inner), &clock, EngineConfig::default()).unwrap();

        assert!(engine.submit_quiz_answer(false).is_err());
        assert_eq!(engine.query_difficulty(), 3);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let clock = FixedClock::new(start());
        let mut config = EngineConfig::default();
        config.difficulty.window = 0;
        assert!(Personalization::new(MemoryStore::new(), &clock, config).is_err());
    }

    #[test]
    fn test_snapshot_restore() {
        let clock = FixedClock::new(start());
        let mut source = engine(&clock);
        source.submit_review_result("casa", 5).unwrap();
        source.submit_practice_completion().unwrap();
        source.submit_quiz_answer(true).unwrap();
        let snapshot = source.export_snapshot();

        let mut target = engine(&clock);
        target.restore_snapshot(snapshot.clone()).unwrap();
        assert_eq!(target.export_snapshot(), snapshot);
        assert_eq!(target.query_difficulty(), 3);
    }
}
