//! Streak-length thresholds and the one-time events they produce.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub days: u32,
    pub name: String,
    pub badge: String,
    pub bonus_points: u32,
}

impl Milestone {
    pub fn new(days: u32, name: &str, badge: &str, bonus_points: u32) -> Self {
        Self {
            days,
            name: name.to_string(),
            badge: badge.to_string(),
            bonus_points,
        }
    }

    pub fn event(&self) -> MilestoneEvent {
        MilestoneEvent {
            days: self.days,
            name: self.name.clone(),
            badge: self.badge.clone(),
            bonus_points: self.bonus_points,
        }
    }
}

/// Emitted once when the current streak first lands on a milestone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneEvent {
    pub days: u32,
    pub name: String,
    pub badge: String,
    pub bonus_points: u32,
}

pub fn default_milestones() -> Vec<Milestone> {
    vec![
        Milestone::new(3, "Beginner", "🌱", 50),
        Milestone::new(7, "One Week Strong", "🔥", 100),
        Milestone::new(14, "Two Week Warrior", "⚔️", 200),
        Milestone::new(21, "21-Day Champion", "🏆", 300),
        Milestone::new(30, "Monthly Master", "👑", 500),
        Milestone::new(60, "Two Month Titan", "💎", 1000),
        Milestone::new(90, "Quarterly Quest", "🎖️", 1500),
        Milestone::new(365, "Year of Spanish", "🌟", 10000),
    ]
}

/// First milestone strictly above `streak`. Expects `milestones` sorted by days.
pub fn next_milestone(milestones: &[Milestone], streak: u32) -> Option<&Milestone> {
    milestones.iter().find(|m| m.days > streak)
}

/// Fraction of the way from the previous milestone (or 0) to the next one.
/// Past the last milestone the progress is 1.0.
pub fn milestone_progress(milestones: &[Milestone], streak: u32) -> f64 {
    let Some(next) = next_milestone(milestones, streak) else {
        return 1.0;
    };
    let prev = milestones
        .iter()
        .rev()
        .find(|m| m.days <= streak)
        .map(|m| m.days)
        .unwrap_or(0);
    let span = next.days - prev;
    if span == 0 {
        return 1.0;
    }
    f64::from(streak - prev) / f64::from(span)
}
