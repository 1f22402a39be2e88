//! Broadcast errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Malformed client message: {0}")]
    Malformed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, BroadcastError>;
