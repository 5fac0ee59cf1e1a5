//! Scamguard - Scam-Awareness Quiz Backend
//!
//! This crate serves a scam-awareness quiz over HTTP. Explanations for quiz
//! answers are produced by an OpenAI-compatible provider behind a per-client
//! fixed-window admission controller and a retrying invoker with exponential
//! backoff and jitter. Scores are kept on a shared leaderboard.

pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod quiz;
pub mod ratelimit;
pub mod retry;

pub use error::{Result, ScamguardError};
