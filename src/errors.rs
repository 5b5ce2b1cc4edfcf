//! Unified error types for jukebot.
//!
//! Expected, user-facing command failures (bad preconditions, empty search
//! results) are deliberately *not* represented here. The coordinator handles
//! those locally and turns them into ephemeral replies; only collaborator
//! failures (database, audio node, gateway) travel through this enum.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("audio node request failed: {0}")]
    Node(#[from] reqwest::Error),

    #[error("audio node session is not established")]
    NodeSessionMissing,

    #[error("audio node socket error: {0}")]
    NodeSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("voice gateway error: {0}")]
    Voice(#[from] songbird::error::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Discord client error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Error::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
