//! Daily practice ledger persisted as `streak_state`.
use crate::config::EngineConfig;
use crate::models::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_days: u32,
    pub last_completed_date: Option<NaiveDate>,
    pub freezes_available: u32,
    pub freezes_used: u32,
    /// Completed calendar days, oldest first.
    pub history: Vec<NaiveDate>,
    pub milestones_achieved: Vec<u32>,
}

impl StreakState {
    pub fn new(freeze_quota: u32) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            total_days: 0,
            last_completed_date: None,
            freezes_available: freeze_quota,
            freezes_used: 0,
            history: Vec::new(),
            milestones_achieved: Vec::new(),
        }
    }

    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.history.contains(&day)
    }
}

impl Record for StreakState {
    const KEY: &'static str = "streak_state";

    fn fresh(config: &EngineConfig) -> Self {
        Self::new(config.streak.monthly_freeze_quota)
    }

    fn after_load(&mut self, config: &EngineConfig) {
        let st = &config.streak;
        self.freezes_available = self.freezes_available.min(st.monthly_freeze_quota);
        if self.history.len() > st.history_cap {
            let excess = self.history.len() - st.history_cap;
            self.history.drain(..excess);
        }
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), String> {
        if self.longest_streak < self.current_streak {
            return Err(format!(
                "longest streak {} below current streak {}",
                self.longest_streak, self.current_streak
            ));
        }
        if self.history.len() > config.streak.history_cap {
            return Err(format!("history holds {} days", self.history.len()));
        }
        if self.current_streak > 0 && self.last_completed_date.is_none() {
            return Err("streak without a last completed date".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape() {
        let mut state = StreakState::new(2);
        state.current_streak = 1;
        state.longest_streak = 1;
        state.last_completed_date = NaiveDate::from_ymd_opt(2025, 4, 2);
        state.history.push(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastCompletedDate"], "2025-04-02");
        assert_eq!(json["history"][0], "2025-04-02");
        assert_eq!(json["freezesAvailable"], 2);
        assert!(json["milestonesAchieved"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_validate_rejects_longest_below_current() {
        let mut state = StreakState::new(2);
        state.current_streak = 4;
        state.longest_streak = 2;
        state.last_completed_date = NaiveDate::from_ymd_opt(2025, 4, 2);
        assert!(state.validate(&EngineConfig::default()).is_err());
    }

    #[test]
    fn test_load_clamps_freezes_and_history() {
        let mut config = EngineConfig::default();
        config.streak.monthly_freeze_quota = 1;
        config.streak.history_cap = 2;

        let mut state = StreakState::new(9);
        let first = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        state.history = first.iter_days().take(3).collect();
        state.after_load(&config);

        assert_eq!(state.freezes_available, 1);
        assert_eq!(state.history, first.iter_days().skip(1).take(2).collect::<Vec<_>>());
        assert!(state.validate(&config).is_ok());
    }
}
