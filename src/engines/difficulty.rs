//! Adaptive difficulty with a hysteresis band between the lower and raise thresholds.

use crate::config::DifficultyConfig;
use crate::error::{EngineError, Result};
use crate::models::DifficultyState;
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub success_rate: f64,
    pub difficulty_level: u8,
}

pub struct DifficultyRegulator<'a> {
    config: &'a DifficultyConfig,
}

impl<'a> DifficultyRegulator<'a> {
    pub fn new(config: &'a DifficultyConfig) -> Self {
        Self { config }
    }

    pub fn record_attempt(&self, state: &mut DifficultyState, correct: bool) -> AttemptOutcome {
        state.attempts.push_back(correct);
        while state.attempts.len() > self.config.window {
            state.attempts.pop_front();
        }

        let success_rate = state.success_rate();
        let level = state.difficulty_level;
        if success_rate > self.config.raise_above && level < self.config.max_level {
            state.difficulty_level += 1;
        } else if success_rate < self.config.lower_below && level > self.config.min_level {
            state.difficulty_level -= 1;
        }

        if state.difficulty_level != level {
            debug!(from = level, to = state.difficulty_level, success_rate, "difficulty changed");
        }

        AttemptOutcome {
            success_rate,
            difficulty_level: state.difficulty_level,
        }
    }

    pub fn difficulty(&self, state: &DifficultyState) -> u8 {
        state.difficulty_level
    }
}

/// Parses a textual quiz answer flag.
pub fn parse_answer(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(EngineError::InvalidInput(format!(
            "answer must be true or false, got '{other}'"
        ))),
    }
}
