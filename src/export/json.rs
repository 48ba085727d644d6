//! JSON snapshot of all personalization records.
//! Used for backups and for moving progress between devices.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{DifficultyState, Record, ReviewBook, StreakState};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub review_state: ReviewBook,
    pub streak_state: StreakState,
    pub difficulty_state: DifficultyState,
}

impl Snapshot {
    /// Restores derived fields, trims to `config` limits and checks every record.
    pub fn validated(mut self, config: &EngineConfig) -> Result<Self> {
        self.review_state.after_load(config);
        self.streak_state.after_load(config);
        self.difficulty_state.after_load(config);
        self.review_state
            .validate(config)
            .map_err(|reason| EngineError::malformed(ReviewBook::KEY, reason))?;
        self.streak_state
            .validate(config)
            .map_err(|reason| EngineError::malformed(StreakState::KEY, reason))?;
        self.difficulty_state
            .validate(config)
            .map_err(|reason| EngineError::malformed(DifficultyState::KEY, reason))?;
        Ok(self)
    }
}

/// Writes the snapshot as pretty-printed JSON.
pub fn export_snapshot_to_path(snapshot: &Snapshot, path: impl AsRef<Path>) -> Result<()> {
    let json_string = serde_json::to_string_pretty(snapshot)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Reads a snapshot file. Fails if the file is missing or is not a snapshot.
pub fn import_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let snapshot: Snapshot = serde_json::from_str(&contents)
        .map_err(|err| EngineError::malformed("snapshot", err.to_string()))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewItem;
    use std::fs;

    fn create_test_snapshot() -> Snapshot {
        let mut review_state = ReviewBook::default();
        let mut item = ReviewItem::new("gracias", 2.5);
        item.repetitions = 1;
        item.interval = 1;
        review_state.insert(item);

        Snapshot {
            review_state,
            streak_state: StreakState::new(2),
            difficulty_state: DifficultyState::new(2),
        }
    }

    #[test]
    fn test_export_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let original = create_test_snapshot();

        export_snapshot_to_path(&original, &path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"review_state\""));
        assert!(raw.contains("\"easeFactor\""));

        let imported = import_snapshot(&path)
            .unwrap()
            .validated(&EngineConfig::default())
            .unwrap();
        assert_eq!(imported, original);
        assert_eq!(imported.review_state.get("gracias").unwrap().id, "gracias");
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_snapshot("nonexistent_snapshot_xyz123.json");
        assert!(matches!(result, Err(EngineError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let result = import_snapshot(&path);
        assert!(matches!(result, Err(EngineError::MalformedState { .. })));
    }

    #[test]
    fn test_validation_rejects_out_of_range_level() {
        let mut snapshot = create_test_snapshot();
        snapshot.difficulty_state.difficulty_level = 7;
        assert!(snapshot.validated(&EngineConfig::default()).is_err());
    }
}
