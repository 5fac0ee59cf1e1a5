//! Shared handler state.

use std::sync::Arc;

use crate::generation::GenerationGateway;
use crate::quiz::{LeaderboardStore, QuizCatalog};
use crate::ratelimit::{AdmissionController, RateLimitConfig};

/// Everything the HTTP handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Admission control shared by every rate-limited route
    pub admission: AdmissionController,
    /// Quota for the explanation route
    pub explanation_policy: RateLimitConfig,
    /// Provider access for explanations
    pub gateway: GenerationGateway,
    /// Quiz content
    pub catalog: Arc<QuizCatalog>,
    /// Score storage
    pub leaderboard: Arc<dyn LeaderboardStore>,
}

impl AppState {
    /// Create handler state.
    pub fn new(
        admission: AdmissionController,
        explanation_policy: RateLimitConfig,
        gateway: GenerationGateway,
        catalog: Arc<QuizCatalog>,
        leaderboard: Arc<dyn LeaderboardStore>,
    ) -> Self {
        Self {
            admission,
            explanation_policy,
            gateway,
            catalog,
            leaderboard,
        }
    }
}
