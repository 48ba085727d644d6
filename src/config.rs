//! Tunables for the three engines.
//!
//! Defaults reproduce the stock app behaviour; `from_env` lets a host override
//! the handful of knobs that differ between deployments.

use crate::error::{EngineError, Result};
use crate::models::milestone::{Milestone, default_milestones};
use chrono::{FixedOffset, Offset, Utc};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub first_interval_days: u32,
    pub second_interval_days: u32,
    /// Repetitions at which an item counts as mastered.
    pub mastery_repetitions: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval_days: 1,
            second_interval_days: 3,
            mastery_repetitions: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreakConfig {
    pub monthly_freeze_quota: u32,
    /// Largest gap in days that freezes may bridge.
    pub max_saveable_gap_days: i64,
    pub history_cap: usize,
    pub monthly_goal: u32,
    /// Offset from UTC that defines where a calendar day starts.
    pub utc_offset_minutes: i32,
    pub milestones: Vec<Milestone>,
}

impl StreakConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            monthly_freeze_quota: 2,
            max_saveable_gap_days: 3,
            history_cap: 365,
            monthly_goal: 20,
            utc_offset_minutes: 0,
            milestones: default_milestones(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DifficultyConfig {
    pub window: usize,
    pub min_level: u8,
    pub max_level: u8,
    pub initial_level: u8,
    pub raise_above: f64,
    pub lower_below: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            window: 20,
            min_level: 1,
            max_level: 3,
            initial_level: 2,
            raise_above: 0.85,
            lower_below: 0.60,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub streak: StreakConfig,
    pub difficulty: DifficultyConfig,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse::<T>().ok())
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(quota) = env_parse::<u32>("FLUIDEZ_FREEZE_QUOTA") {
            config.streak.monthly_freeze_quota = quota;
        }
        if let Some(offset) = env_parse::<i32>("FLUIDEZ_UTC_OFFSET_MINUTES") {
            config.streak.utc_offset_minutes = offset;
        }
        if let Some(goal) = env_parse::<u32>("FLUIDEZ_MONTHLY_GOAL") {
            config.streak.monthly_goal = goal;
        }
        if let Some(window) = env_parse::<usize>("FLUIDEZ_DIFFICULTY_WINDOW") {
            config.difficulty.window = window;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.difficulty;
        if d.window == 0 {
            return Err(EngineError::InvalidInput(
                "difficulty window must be at least 1".into(),
            ));
        }
        if d.min_level > d.max_level {
            return Err(EngineError::InvalidInput(format!(
                "difficulty range {}..={} is empty",
                d.min_level, d.max_level
            )));
        }
        if !(d.min_level..=d.max_level).contains(&d.initial_level) {
            return Err(EngineError::InvalidInput(format!(
                "initial difficulty {} outside {}..={}",
                d.initial_level, d.min_level, d.max_level
            )));
        }
        if d.raise_above <= d.lower_below {
            return Err(EngineError::InvalidInput(
                "raise threshold must be above lower threshold".into(),
            ));
        }

        let s = &self.scheduler;
        if s.minimum_ease <= 0.0 || s.initial_ease < s.minimum_ease {
            return Err(EngineError::InvalidInput(format!(
                "initial ease {} below minimum {}",
                s.initial_ease, s.minimum_ease
            )));
        }

        let st = &self.streak;
        if st.history_cap == 0 {
            return Err(EngineError::InvalidInput(
                "streak history cap must be at least 1".into(),
            ));
        }
        if FixedOffset::east_opt(st.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(EngineError::InvalidInput(format!(
                "utc offset {} minutes out of range",
                st.utc_offset_minutes
            )));
        }
        if st.milestones.windows(2).any(|w| w[0].days >= w[1].days) {
            return Err(EngineError::InvalidInput(
                "milestones must be strictly ascending".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.streak.monthly_freeze_quota, 2);
        assert_eq!(config.difficulty.window, 20);
        assert_eq!(config.streak.milestones.len(), 8);
    }

    #[test]
    fn test_rejects_inverted_difficulty_range() {
        let mut config = EngineConfig::default();
        config.difficulty.min_level = 4;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_collapsed_hysteresis_band() {
        let mut config = EngineConfig::default();
        config.difficulty.raise_above = 0.5;
        assert!(config.validate().is_err());
    }
}
