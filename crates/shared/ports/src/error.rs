use thiserror::Error;

/// Failures reported by a venue connector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Venue call timed out after {0} ms")]
    Timeout(u64),

    #[error("Rejected by venue: {0}")]
    Rejected(String),
}

pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;
