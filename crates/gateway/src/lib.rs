//! Arbiter Gateway
//!
//! Venue gateway for the Arbiter trading engine. Provides:
//! - A registry of venue connectors with per-venue enable flags
//! - Bounded-timeout venue calls (a timeout is a connector failure)
//! - A simulated venue for tests and local runs
//!
//! ## Architecture
//!
//! ```text
//!  Order Manager / Price Collector
//!         │
//!    ┌────▼──────────┐
//!    │ VenueRegistry │  name -> (connector, enabled)
//!    └────┬──────────┘
//!         │ call_with_timeout(..)
//!    ┌────▼────────────────────────┐
//!    │ dyn VenueConnector          │
//!    │ (SimulatedVenue, real APIs) │
//!    └─────────────────────────────┘
//! ```

pub mod error;
pub mod registry;
pub mod simulated;
pub mod timeout;

pub use error::GatewayError;
pub use registry::VenueRegistry;
pub use simulated::{SimulatedCall, SimulatedVenue, SimulatedVenueConfig};
pub use timeout::call_with_timeout;
