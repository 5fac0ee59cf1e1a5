//! Quiz content and the shared score leaderboard.

mod catalog;
mod leaderboard;

pub use catalog::{Quiz, QuizCatalog, ANY_CATEGORY};
pub use leaderboard::{
    BestScore, CategoryStats, LeaderboardStore, MemoryLeaderboard, ScoreSubmission, UserScore,
    ALL_CATEGORIES,
};
