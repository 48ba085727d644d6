//! SM-2 (SuperMemo 2) spaced repetition update rule.
//!
//! Each review is graded 0-5:
//! - Grades 0-2: repetitions reset to 0 and the item comes back tomorrow
//! - Grades 3-5: interval grows 1 day → 3 days → previous interval × EF
//! - EF is adjusted after every review and never drops below the configured floor (1.3)

use super::ReviewItem;
use crate::config::SchedulerConfig;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Duration, Utc};

/// Longest interval the scheduler hands out, roughly a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Recall quality, 0 = complete blackout, 5 = perfect response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if value > 5 {
            return Err(EngineError::InvalidInput(format!(
                "quality must be within 0..=5, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= 3
    }
}

/// New ease factor after a review of the given quality.
pub fn next_ease_factor(ease_factor: f64, quality: Quality, minimum_ease: f64) -> f64 {
    let miss = 5.0 - f64::from(quality.value());
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(minimum_ease)
}

/// Applies one review to `item` and returns its next state.
pub fn calculate_next_review(
    item: &ReviewItem,
    quality: Quality,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> ReviewItem {
    let (interval, repetitions) = if quality.is_success() {
        let interval = match item.repetitions {
            0 => config.first_interval_days,
            1 => config.second_interval_days,
            // Grown with the ease factor the item had going into this review
            _ => {
                let grown = (f64::from(item.interval) * item.ease_factor).round();
                grown.min(f64::from(MAX_INTERVAL_DAYS)) as u32
            }
        };
        (interval.max(1), item.repetitions + 1)
    } else {
        (1, 0)
    };

    let ease_factor = next_ease_factor(item.ease_factor, quality, config.minimum_ease);

    ReviewItem {
        id: item.id.clone(),
        ease_factor,
        interval,
        repetitions,
        next_review_at: Some(now + Duration::days(i64::from(interval))),
        last_reviewed_at: Some(now),
    }
}
