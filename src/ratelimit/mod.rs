//! Admission control: per-identifier request counting in fixed windows.
//!
//! State is per process. Several service instances do not share windows.

mod clock;
mod key;
mod limiter;
mod registry;
mod sweeper;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{client_address, RateLimitKey, UNKNOWN_CLIENT};
pub use limiter::{AdmissionController, RateLimitDecision};
pub use registry::RateLimitRegistry;
pub use sweeper::SweepTask;
pub use window::{RateLimitConfig, RateWindowEntry};
