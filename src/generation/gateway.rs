//! Generation gateway: quiz content in, explanation text out.

use std::sync::Arc;
use tracing::{info, instrument};

use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::provider::TextGenerator;
use crate::retry::{ProviderError, ResilientInvoker};

/// Obtains explanations from a [`TextGenerator`] under a retry policy.
///
/// Performs no admission control; callers check the admission controller
/// before invoking it.
#[derive(Clone)]
pub struct GenerationGateway {
    provider: Arc<dyn TextGenerator>,
    invoker: ResilientInvoker,
}

impl std::fmt::Debug for GenerationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationGateway")
            .field("invoker", &self.invoker)
            .finish_non_exhaustive()
    }
}

impl GenerationGateway {
    /// Create a gateway over `provider`.
    pub fn new(provider: Arc<dyn TextGenerator>, invoker: ResilientInvoker) -> Self {
        Self { provider, invoker }
    }

    /// Explain why a quiz message is, or is not, a scam.
    ///
    /// Returns non-empty, trimmed text, or the last classified provider error.
    #[instrument(skip(self, content, scam_points), fields(content_len = content.len(), points = scam_points.len()))]
    pub async fn generate_explanation(
        &self,
        content: &str,
        is_scam: bool,
        scam_points: &[String],
    ) -> Result<String, ProviderError> {
        let prompt = build_prompt(content, is_scam, scam_points);
        let provider = self.provider.as_ref();

        let text = self
            .invoker
            .run(|| provider.complete(SYSTEM_PROMPT, &prompt))
            .await?;

        info!(is_scam = is_scam, chars = text.chars().count(), "Explanation generated");
        Ok(text.trim().to_string())
    }
}
