//! Item review scheduling on top of the SM-2 rule.

use crate::config::SchedulerConfig;
use crate::models::sm2::calculate_next_review;
use crate::models::{Quality, ReviewBook, ReviewItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReviewStats {
    pub total: usize,
    pub due: usize,
    pub mastered: usize,
}

/// A catalog entry that should be reviewed now.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReview {
    pub item: ReviewItem,
    pub overdue_days: i64,
    /// True when the item has never been reviewed.
    pub is_new: bool,
}

pub struct ReviewScheduler<'a> {
    config: &'a SchedulerConfig,
}

impl<'a> ReviewScheduler<'a> {
    pub fn new(config: &'a SchedulerConfig) -> Self {
        Self { config }
    }

    /// Grades one item, creating it with default state on first review.
    pub fn review_item(
        &self,
        book: &mut ReviewBook,
        item_id: &str,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> ReviewItem {
        let current = book
            .get(item_id)
            .cloned()
            .unwrap_or_else(|| ReviewItem::new(item_id, self.config.initial_ease));

        if current.last_reviewed_at.is_some_and(|last| now < last) {
            warn!(item_id, "clock is behind the last review; scheduling from now");
        }

        let next = calculate_next_review(&current, quality, now, self.config);
        debug!(
            item_id,
            quality = quality.value(),
            interval = next.interval,
            repetitions = next.repetitions,
            ease_factor = next.ease_factor,
            "item reviewed"
        );

        book.insert(next.clone());
        next
    }

    /// Catalog items that are new or whose review date has passed, in catalog order.
    /// Repeated ids are reported once, at their first position.
    pub fn due_items<S: AsRef<str>>(
        &self,
        book: &ReviewBook,
        catalog: &[S],
        now: DateTime<Utc>,
    ) -> Vec<DueReview> {
        let mut seen = HashSet::new();
        catalog
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| seen.insert(*id))
            .filter_map(|id| match book.get(id) {
                None => Some(DueReview {
                    item: ReviewItem::new(id, self.config.initial_ease),
                    overdue_days: 0,
                    is_new: true,
                }),
                Some(item) if item.is_due(now) => Some(DueReview {
                    item: item.clone(),
                    overdue_days: item.overdue_days(now),
                    is_new: false,
                }),
                Some(_) => None,
            })
            .collect()
    }

    pub fn stats(&self, book: &ReviewBook, now: DateTime<Utc>) -> ReviewStats {
        let items = book.items.values();
        ReviewStats {
            total: book.items.len(),
            due: items.clone().filter(|item| item.is_due(now)).count(),
            mastered: items
                .filter(|item| item.repetitions >= self.config.mastery_repetitions)
                .count(),
        }
    }
}
