//! Score storage and ranking queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Category value that selects every category in rankings.
pub const ALL_CATEGORIES: &str = "all";

/// A finished quiz run submitted by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub session_id: String,
    pub category: String,
    pub score: i32,
    pub correct_count: i32,
    pub total_count: i32,
}

/// A stored score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScore {
    pub id: u64,
    pub session_id: String,
    pub category: String,
    pub score: i32,
    pub correct_count: i32,
    pub total_count: i32,
    pub created_at: DateTime<Utc>,
}

/// One player's best result in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestScore {
    pub category: String,
    pub best_score: i32,
    pub total_attempts: u64,
}

/// Aggregate figures for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub total_players: u64,
    /// Mean score rounded to one decimal place
    pub avg_score: f64,
    pub total_attempts: u64,
}

/// Storage backend for the shared leaderboard.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Store a submission and return the stored row.
    async fn insert(&self, submission: ScoreSubmission) -> Result<UserScore>;

    /// Highest scores, newest first among equal scores.
    ///
    /// `None` or [`ALL_CATEGORIES`] ranks across every category.
    async fn top_scores(&self, category: Option<&str>, limit: usize) -> Result<Vec<UserScore>>;

    /// Best score and attempt count per category for one session.
    async fn best_scores(&self, session_id: &str) -> Result<Vec<BestScore>>;

    /// Player count, mean score and attempt count per category.
    async fn category_stats(&self) -> Result<Vec<CategoryStats>>;
}

/// Leaderboard held in process memory.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    scores: RwLock<Vec<UserScore>>,
    next_id: AtomicU64,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored scores.
    pub fn len(&self) -> usize {
        self.scores.read().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.scores.read().is_empty()
    }
}

#[async_trait]
impl LeaderboardStore for MemoryLeaderboard {
    async fn insert(&self, submission: ScoreSubmission) -> Result<UserScore> {
        let row = UserScore {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            session_id: submission.session_id,
            category: submission.category,
            score: submission.score,
            correct_count: submission.correct_count,
            total_count: submission.total_count,
            created_at: Utc::now(),
        };
        self.scores.write().push(row.clone());
        Ok(row)
    }

    async fn top_scores(&self, category: Option<&str>, limit: usize) -> Result<Vec<UserScore>> {
        let category = category.filter(|c| *c != ALL_CATEGORIES);
        let mut rows: Vec<UserScore> = self
            .scores
            .read()
            .iter()
            .filter(|s| category.map_or(true, |c| s.category == c))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn best_scores(&self, session_id: &str) -> Result<Vec<BestScore>> {
        let mut by_category: BTreeMap<&str, (i32, u64)> = BTreeMap::new();
        let scores = self.scores.read();

        for row in scores.iter().filter(|s| s.session_id == session_id) {
            let slot = by_category.entry(row.category.as_str()).or_insert((i32::MIN, 0));
            slot.0 = slot.0.max(row.score);
            slot.1 += 1;
        }

        Ok(by_category
            .into_iter()
            .map(|(category, (best_score, total_attempts))| BestScore {
                category: category.to_string(),
                best_score,
                total_attempts,
            })
            .collect())
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStats>> {
        #[derive(Default)]
        struct Acc<'a> {
            players: HashSet<&'a str>,
            sum: i64,
            attempts: u64,
        }

        let scores = self.scores.read();
        let mut by_category: BTreeMap<&str, Acc<'_>> = BTreeMap::new();

        for row in scores.iter() {
            let acc = by_category.entry(row.category.as_str()).or_default();
            acc.players.insert(row.session_id.as_str());
            acc.sum += i64::from(row.score);
            acc.attempts += 1;
        }

        Ok(by_category
            .into_iter()
            .map(|(category, acc)| {
                let mean = acc.sum as f64 / acc.attempts as f64;
                CategoryStats {
                    category: category.to_string(),
                    total_players: acc.players.len() as u64,
                    avg_score: (mean * 10.0).round() / 10.0,
                    total_attempts: acc.attempts,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(session: &str, category: &str, score: i32) -> ScoreSubmission {
        ScoreSubmission {
            session_id: session.to_string(),
            category: category.to_string(),
            score,
            correct_count: score / 10,
            total_count: 10,
        }
    }

    async fn seeded() -> MemoryLeaderboard {
        let board = MemoryLeaderboard::new();
        for (session, category, score) in [
            ("s1", "smishing", 80),
            ("s2", "smishing", 90),
            ("s1", "smishing", 90),
            ("s3", "alba", 70),
            ("s1", "alba", 50),
        ] {
            board.insert(submission(session, category, score)).await.unwrap();
        }
        board
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let board = MemoryLeaderboard::new();

        let first = board.insert(submission("s1", "sns", 10)).await.unwrap();
        let second = board.insert(submission("s1", "sns", 20)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);
        assert_eq!(board.len(), 2);
    }

    #[tokio::test]
    async fn test_top_scores_order_and_limit() {
        let board = seeded().await;

        let top = board.top_scores(None, 3).await.unwrap();
        let scores: Vec<i32> = top.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![90, 90, 80]);
        // Newer of the two 90s comes first.
        assert_eq!(top[0].session_id, "s1");
        assert_eq!(top[1].session_id, "s2");

        let all = board.top_scores(Some(ALL_CATEGORIES), 100).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_top_scores_by_category() {
        let board = seeded().await;

        let alba = board.top_scores(Some("alba"), 10).await.unwrap();
        assert_eq!(alba.len(), 2);
        assert!(alba.iter().all(|s| s.category == "alba"));
        assert_eq!(alba[0].score, 70);
    }

    #[tokio::test]
    async fn test_best_scores_per_category() {
        let board = seeded().await;

        let best = board.best_scores("s1").await.unwrap();
        assert_eq!(
            best,
            vec![
                BestScore {
                    category: "alba".to_string(),
                    best_score: 50,
                    total_attempts: 1,
                },
                BestScore {
                    category: "smishing".to_string(),
                    best_score: 90,
                    total_attempts: 2,
                },
            ]
        );

        assert!(board.best_scores("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_stats() {
        let board = seeded().await;

        let stats = board.category_stats().await.unwrap();
        assert_eq!(stats.len(), 2);

        let smishing = stats.iter().find(|s| s.category == "smishing").unwrap();
        assert_eq!(smishing.total_players, 2);
        assert_eq!(smishing.total_attempts, 3);
        assert_eq!(smishing.avg_score, 86.7);

        let alba = stats.iter().find(|s| s.category == "alba").unwrap();
        assert_eq!(alba.avg_score, 60.0);
    }
}
