//! Error types for the simulator
//!
//! Startup problems are [`ConfigError`] and abort before the send loop starts.
//! [`GeneratorError`] and [`PublishError`] are per-tick and never stop the loop.

use thiserror::Error;

/// Fatal startup configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Connection string is missing the {0} entry")]
    MissingEntry(&'static str),

    #[error("Malformed connection string: {0}")]
    MalformedConnectionString(String),

    #[error("Invalid event hub name: {0:?}")]
    InvalidHubName(String),

    #[error("Connection string targets entity {found:?} but the sender publishes to {expected:?}")]
    EntityMismatch { expected: String, found: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Record construction failures; the whole tick is abandoned
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Failed to encode properties: {0}")]
    Properties(#[source] serde_json::Error),

    #[error("Failed to encode batch envelope: {0}")]
    Envelope(#[source] serde_json::Error),
}

/// Failures reported by a [`crate::publisher::Publisher`]
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Event hub rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to sign request: {0}")]
    Signature(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        PublishError::Transport(e.to_string())
    }
}
