use crate::config::EngineConfig;
use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rolling window of graded answers plus the current difficulty level.
/// Persisted as `difficulty_state`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyState {
    pub attempts: VecDeque<bool>,
    pub difficulty_level: u8,
}

impl DifficultyState {
    pub fn new(initial_level: u8) -> Self {
        Self {
            attempts: VecDeque::new(),
            difficulty_level: initial_level,
        }
    }

    /// Share of correct answers in the window, 0.0 when empty.
    pub fn success_rate(&self) -> f64 {
        if self.attempts.is_empty() {
            return 0.0;
        }
        let correct = self.attempts.iter().filter(|&&ok| ok).count();
        correct as f64 / self.attempts.len() as f64
    }
}

impl Record for DifficultyState {
    const KEY: &'static str = "difficulty_state";

    fn fresh(config: &EngineConfig) -> Self {
        Self::new(config.difficulty.initial_level)
    }

    /// Oldest answers are evicted when the window has shrunk.
    fn after_load(&mut self, config: &EngineConfig) {
        let window = config.difficulty.window;
        while self.attempts.len() > window {
            self.attempts.pop_front();
        }
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), String> {
        let d = &config.difficulty;
        if !(d.min_level..=d.max_level).contains(&self.difficulty_level) {
            return Err(format!(
                "difficulty level {} outside {}..={}",
                self.difficulty_level, d.min_level, d.max_level
            ));
        }
        if self.attempts.len() > d.window {
            return Err(format!(
                "{} attempts exceed window of {}",
                self.attempts.len(),
                d.window
            ));
        }
        Ok(())
    }
}
