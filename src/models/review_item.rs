use crate::config::EngineConfig;
use crate::models::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spaced-repetition state of one vocabulary item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    /// Key of the item in the persisted map; not stored inside the value.
    #[serde(skip)]
    pub id: String,
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub next_review_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl ReviewItem {
    pub fn new(id: &str, initial_ease: f64) -> Self {
        Self {
            id: id.to_string(),
            ease_factor: initial_ease,
            interval: 0,
            repetitions: 0,
            next_review_at: None,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_none_or(|at| at <= now)
    }

    /// Whole days past the scheduled review, never negative.
    pub fn overdue_days(&self, now: DateTime<Utc>) -> i64 {
        self.next_review_at
            .map(|at| (now - at).num_days().max(0))
            .unwrap_or(0)
    }
}

/// All review items, keyed by item id. Persisted as `review_state`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewBook {
    pub items: BTreeMap<String, ReviewItem>,
}

impl ReviewBook {
    pub fn get(&self, id: &str) -> Option<&ReviewItem> {
        self.items.get(id)
    }

    pub fn insert(&mut self, item: ReviewItem) {
        self.items.insert(item.id.clone(), item);
    }

}

impl Record for ReviewBook {
    const KEY: &'static str = "review_state";

    fn fresh(_config: &EngineConfig) -> Self {
        Self::default()
    }

    fn after_load(&mut self, _config: &EngineConfig) {
        for (id, item) in self.items.iter_mut() {
            item.id = id.clone();
        }
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), String> {
        let min_ease = config.scheduler.minimum_ease;
        for (id, item) in &self.items {
            if !item.ease_factor.is_finite() || item.ease_factor < min_ease {
                return Err(format!(
                    "item '{id}' has ease factor {} below {min_ease}",
                    item.ease_factor
                ));
            }
            if item.repetitions > 0 && item.interval < 1 {
                return Err(format!("item '{id}' has repetitions but no interval"));
            }
            if let (Some(next), Some(last)) = (item.next_review_at, item.last_reviewed_at) {
                if next < last {
                    return Err(format!("item '{id}' is scheduled before its last review"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_new_item_is_due() {
        let item = ReviewItem::new("hola", 2.5);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(item.is_due(now));
        assert_eq!(item.overdue_days(now), 0);
    }

    #[test]
    fn test_due_and_overdue() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        let mut item = ReviewItem::new("hola", 2.5);
        item.next_review_at = Some(now - Duration::days(3));
        assert!(item.is_due(now));
        assert_eq!(item.overdue_days(now), 3);

        item.next_review_at = Some(now + Duration::days(1));
        assert!(!item.is_due(now));
        assert_eq!(item.overdue_days(now), 0);
    }

    #[test]
    fn test_ids_restored_from_keys() {
        let json = r#"{"gato":{"easeFactor":2.5,"interval":1,"repetitions":1,
            "nextReviewAt":"2025-01-02T00:00:00Z","lastReviewedAt":"2025-01-01T00:00:00Z"}}"#;
        let mut book: ReviewBook = serde_json::from_str(json).unwrap();
        book.after_load(&EngineConfig::default());
        assert_eq!(book.get("gato").unwrap().id, "gato");
        assert!(book.validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_low_ease() {
        let mut book = ReviewBook::default();
        let mut item = ReviewItem::new("perro", 2.5);
        item.ease_factor = 1.0;
        book.insert(item);
        assert!(book.validate(&EngineConfig::default()).is_err());
    }
}
