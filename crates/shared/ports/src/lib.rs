//! Arbiter Ports
//!
//! Port definitions (traits) for the Arbiter trading engine.
//! These define the boundaries between domain logic and infrastructure:
//!
//! - [`VenueConnector`] is the only way the engine reaches an external venue.
//! - [`EventPublisher`] is where components hand events for real-time fan-out.

mod connector;
mod error;
mod publisher;

pub use connector::VenueConnector;
pub use error::{ConnectorError, ConnectorResult};
pub use publisher::{EventPublisher, NullPublisher, RecordingPublisher};
