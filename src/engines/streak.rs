//! Daily streak continuity: idempotent completion, freeze days and milestones.
//!
//! A missed day never drives the streak to zero. Small gaps are bridged with
//! freeze days when enough are left; anything else restarts the count at 1.

use crate::config::StreakConfig;
use crate::models::milestone::{milestone_progress, next_milestone};
use crate::models::{Milestone, MilestoneEvent, StreakState};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Already,
    Started,
    Continued,
    Saved,
    Restarted,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub state: StreakState,
    pub status: CompletionStatus,
    pub freezes_consumed: u32,
    pub milestone: Option<MilestoneEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlameLevel {
    Cold,
    Warm,
    Hot,
    Blazing,
    Legendary,
}

impl FlameLevel {
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            0 => Self::Cold,
            1..=6 => Self::Warm,
            7..=20 => Self::Hot,
            21..=99 => Self::Blazing,
            _ => Self::Legendary,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_days: u32,
    pub freezes_available: u32,
    pub freezes_used: u32,
    pub practiced_today: bool,
    pub flame: FlameLevel,
    pub next_milestone: Option<Milestone>,
    pub days_to_next_milestone: Option<u32>,
    pub milestone_progress: f64,
    pub practice_days_this_month: usize,
    pub monthly_goal: u32,
    pub milestones_achieved: Vec<u32>,
}

pub struct StreakTracker<'a> {
    config: &'a StreakConfig,
}

impl<'a> StreakTracker<'a> {
    pub fn new(config: &'a StreakConfig) -> Self {
        Self { config }
    }

    /// Calendar day `now` falls on, in the configured offset.
    pub fn calendar_day(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.config.offset()).date_naive()
    }

    /// Records today's practice. A second call on the same day changes nothing.
    pub fn complete_today(&self, state: &mut StreakState, now: DateTime<Utc>) -> CompletionOutcome {
        let today = self.calendar_day(now);

        if state.completed_on(today) {
            return Self::unchanged(state);
        }

        let days_since = state.last_completed_date.map(|last| {
            let delta = (today - last).num_days();
            if delta < 0 {
                warn!(%today, %last, "clock is behind the last completion; treating as same day");
            }
            delta.max(0)
        });

        if days_since == Some(0) {
            return Self::unchanged(state);
        }

        let mut freezes_consumed = 0;
        let status = match days_since {
            _ if state.current_streak == 0 => {
                state.current_streak = 1;
                CompletionStatus::Started
            }
            None | Some(1) => {
                state.current_streak += 1;
                CompletionStatus::Continued
            }
            Some(gap) if gap <= self.config.max_saveable_gap_days && self.can_bridge(state, gap) => {
                let needed = (gap - 1) as u32;
                freezes_consumed = needed.min(state.freezes_available);
                state.freezes_available = state.freezes_available.saturating_sub(needed);
                state.freezes_used += freezes_consumed;
                state.current_streak += 1;
                CompletionStatus::Saved
            }
            Some(gap) => {
                info!(gap, previous = state.current_streak, "streak restarted");
                state.current_streak = 1;
                CompletionStatus::Restarted
            }
        };

        state.total_days += 1;
        state.longest_streak = state.longest_streak.max(state.current_streak);
        state.last_completed_date = Some(today);
        state.history.push(today);
        if state.history.len() > self.config.history_cap {
            let excess = state.history.len() - self.config.history_cap;
            state.history.drain(..excess);
        }

        if today.day() == 1 && state.freezes_available < self.config.monthly_freeze_quota {
            state.freezes_available = self.config.monthly_freeze_quota;
        }

        let milestone = self.check_milestone(state);

        debug!(
            ?status,
            current = state.current_streak,
            longest = state.longest_streak,
            freezes = state.freezes_available,
            "practice completed"
        );

        CompletionOutcome {
            state: state.clone(),
            status,
            freezes_consumed,
            milestone,
        }
    }

    pub fn summary(&self, state: &StreakState, now: DateTime<Utc>) -> StreakSummary {
        let today = self.calendar_day(now);
        let milestones = &self.config.milestones;
        let next = next_milestone(milestones, state.current_streak).cloned();
        let practice_days_this_month = state
            .history
            .iter()
            .filter(|day| day.year() == today.year() && day.month() == today.month())
            .count();

        StreakSummary {
            current_streak: state.current_streak,
            longest_streak: state.longest_streak,
            total_days: state.total_days,
            freezes_available: state.freezes_available,
            freezes_used: state.freezes_used,
            practiced_today: state.completed_on(today),
            flame: FlameLevel::for_streak(state.current_streak),
            days_to_next_milestone: next.as_ref().map(|m| m.days - state.current_streak),
            next_milestone: next,
            milestone_progress: milestone_progress(milestones, state.current_streak),
            practice_days_this_month,
            monthly_goal: self.config.monthly_goal,
            milestones_achieved: state.milestones_achieved.clone(),
        }
    }

    fn can_bridge(&self, state: &StreakState, gap: i64) -> bool {
        i64::from(state.freezes_available) >= gap - 1
    }

    fn check_milestone(&self, state: &mut StreakState) -> Option<MilestoneEvent> {
        let milestone = self
            .config
            .milestones
            .iter()
            .find(|m| m.days == state.current_streak)?;
        if state.milestones_achieved.contains(&milestone.days) {
            return None;
        }
        state.milestones_achieved.push(milestone.days);
        info!(days = milestone.days, name = %milestone.name, "milestone reached");
        Some(milestone.event())
    }

    fn unchanged(state: &StreakState) -> CompletionOutcome {
        CompletionOutcome {
            state: state.clone(),
            status: CompletionStatus::Already,
            freezes_consumed: 0,
            milestone: None,
        }
    }
}
