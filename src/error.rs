//! Error types for the bot

use thiserror::Error;

/// All errors produced by flipbot
#[derive(Debug, Error)]
pub enum FlipError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("scrape backend credits exhausted")]
    CreditsExhausted,

    #[error("LLM backend unavailable: {0}")]
    LlmUnavailable(String),

    #[error("agent error: {0}")]
    Agent(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("webhook signature verification failed")]
    SignatureInvalid,

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlipError>;
