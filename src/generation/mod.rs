//! Explanation generation through an external text-generation provider.

mod gateway;
mod prompt;
mod provider;
#[cfg(test)]
pub(crate) mod testing;

pub use gateway::GenerationGateway;
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use provider::{OpenAiClient, TextGenerator};
