//! Retry logic for calls to the text-generation provider.

mod backoff;
mod error;
mod invoker;
mod sleeper;

pub use backoff::{backoff_delay, FixedJitter, JitterSource, RandomJitter, RetryConfig, JITTER_RATIO};
pub use error::{classify_message, ProviderError, ProviderErrorKind};
pub use invoker::{Payload, ResilientInvoker};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
