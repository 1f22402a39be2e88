//! Error types for the market crate

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceStoreError {
    #[error("Price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("Volume must not be negative, got {0}")]
    InvalidVolume(Decimal),
}

pub type Result<T> = std::result::Result<T, PriceStoreError>;
