//! Scripted text generator for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use super::provider::TextGenerator;
use crate::retry::{ProviderError, ProviderErrorKind};

/// Replays a fixed sequence of outcomes, one per call.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// The most recent `(system, user)` pair.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        self.requests.lock().push((system.to_string(), user.to_string()));
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(ProviderError::new(
                ProviderErrorKind::Permanent,
                "script exhausted",
            ))
        })
    }
}
