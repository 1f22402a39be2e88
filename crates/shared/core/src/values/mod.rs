use chrono::{DateTime, Utc};

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Item identifier (market hash name, e.g. `AK-47 | Redline (Field-Tested)`)
pub type ItemId = String;

/// Venue identifier (e.g. `buff`, `youpin`, `steam`)
pub type VenueId = String;

/// Owner (user) identifier
pub type OwnerId = String;
