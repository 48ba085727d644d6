pub mod difficulty_state;
pub mod milestone;
pub mod review_item;
pub mod sm2;
pub mod streak_state;

pub use difficulty_state::DifficultyState;
pub use milestone::{Milestone, MilestoneEvent};
pub use review_item::{ReviewBook, ReviewItem};
pub use sm2::Quality;
pub use streak_state::StreakState;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A JSON document stored whole under a fixed key.
pub trait Record: Serialize + DeserializeOwned + Sized {
    const KEY: &'static str;

    /// State used before the first write and after a failed load.
    fn fresh(config: &EngineConfig) -> Self;

    /// Fills in fields that are not part of the stored document and trims
    /// values that only exceed limits of the current `config`.
    fn after_load(&mut self, _config: &EngineConfig) {}

    /// Checks invariants that the JSON schema alone cannot express.
    fn validate(&self, config: &EngineConfig) -> std::result::Result<(), String>;
}

/// Parses and validates a stored document.
pub fn decode<R: Record>(raw: &str, config: &EngineConfig) -> Result<R> {
    let mut record: R =
        serde_json::from_str(raw).map_err(|err| EngineError::malformed(R::KEY, err.to_string()))?;
    record.after_load(config);
    record
        .validate(config)
        .map_err(|reason| EngineError::malformed(R::KEY, reason))?;
    Ok(record)
}

pub fn encode<R: Record>(record: &R) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reports_malformed_json() {
        let err = decode::<StreakState>("{ not json", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedState { ref key, .. } if key == "streak_state"));
    }

    #[test]
    fn test_decode_trims_to_smaller_limits() {
        let mut config = EngineConfig::default();
        config.streak.monthly_freeze_quota = 1;
        let raw = r#"{"currentStreak":4,"longestStreak":4,"totalDays":4,
            "lastCompletedDate":"2025-03-04","freezesAvailable":2,"freezesUsed":0,
            "history":["2025-03-01","2025-03-02","2025-03-03","2025-03-04"],
            "milestonesAchieved":[3]}"#;
        let state = decode::<StreakState>(raw, &config).unwrap();
        assert_eq!(state.current_streak, 4);
        assert_eq!(state.freezes_available, 1);
    }

    #[test]
    fn test_decode_reports_invariant_violation() {
        let raw = r#"{"attempts":[],"difficultyLevel":9}"#;
        let err = decode::<DifficultyState>(raw, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedState { .. }));
    }
}
