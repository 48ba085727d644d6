//! Short celebratory lines shown after a practice completion.
//!
//! Randomness is supplied by the caller so a seeded generator gives
//! reproducible picks.

use crate::engines::{CompletionOutcome, CompletionStatus};
use rand::Rng;
use rand::seq::SliceRandom;

const FIRST_DAY: &[&str] = &[
    "Welcome! Every journey starts with a single step. 🌱",
    "¡Bienvenido! You're here - that's what matters!",
    "Day 1 of your Spanish adventure! 🎉",
];

const KEEP_GOING: &[&str] = &[
    "You're building something amazing! 🔥",
    "Consistency is your superpower!",
    "Look at you go! Keep it up! 💪",
];

const RETURNED: &[&str] = &[
    "Welcome back! We missed you! 🤗",
    "Life happens - what matters is you're here now!",
    "¡Hola de nuevo! Ready to continue?",
    "Taking breaks is okay. Returning is what counts! 💚",
];

const SAVED: &[&str] = &[
    "A freeze day kept your streak safe ❄️",
    "Streak protected! Pick up right where you left off.",
];

const ALREADY: &[&str] = &["Already practiced today. See you tomorrow!"];

/// Message for a completion; a milestone always wins over the status pools.
pub fn pick<R: Rng + ?Sized>(outcome: &CompletionOutcome, rng: &mut R) -> String {
    if let Some(milestone) = &outcome.milestone {
        return format!(
            "{} {}! {} days in a row, +{} points",
            milestone.badge, milestone.name, milestone.days, milestone.bonus_points
        );
    }

    let pool = match outcome.status {
        CompletionStatus::Already => ALREADY,
        CompletionStatus::Started => FIRST_DAY,
        CompletionStatus::Continued => KEEP_GOING,
        CompletionStatus::Saved => SAVED,
        CompletionStatus::Restarted => RETURNED,
    };
    pool.choose(rng).copied().unwrap_or_default().to_string()
}
