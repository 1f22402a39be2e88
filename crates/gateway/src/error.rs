//! Error types for the gateway crate

use arbiter_core::VenueId;
use thiserror::Error;

/// Registry-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Unknown venue: {0}")]
    UnknownVenue(VenueId),

    #[error("Venue is disabled: {0}")]
    VenueDisabled(VenueId),

    #[error("Venue already registered: {0}")]
    DuplicateVenue(VenueId),
}
