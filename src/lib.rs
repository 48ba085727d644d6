pub mod clock;
pub mod config;
pub mod database;
pub mod encouragement;
pub mod engines;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod personalization;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use database::{MemoryStore, SqliteStore, Store};
pub use error::{EngineError, Result};
pub use models::{DifficultyState, MilestoneEvent, ReviewItem, StreakState};
pub use personalization::Personalization;
