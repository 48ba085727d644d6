pub mod difficulty;
pub mod scheduler;
pub mod streak;

pub use difficulty::{AttemptOutcome, DifficultyRegulator};
pub use scheduler::{DueReview, ReviewScheduler, ReviewStats};
pub use streak::{CompletionOutcome, CompletionStatus, FlameLevel, StreakSummary, StreakTracker};
