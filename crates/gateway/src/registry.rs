use std::sync::Arc;

use arbiter_core::VenueId;
use arbiter_ports::VenueConnector;
use dashmap::DashMap;
use log::info;

use crate::error::GatewayError;

struct VenueEntry {
    connector: Arc<dyn VenueConnector>,
    enabled: bool,
}

/// Registered venue connectors keyed by venue name
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct VenueRegistry {
    venues: Arc<DashMap<VenueId, VenueEntry>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enabled connector under its own name
    pub fn register(&self, connector: Arc<dyn VenueConnector>) -> Result<(), GatewayError> {
        let name = connector.name();
        match self.venues.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(GatewayError::DuplicateVenue(name)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                info!("[gateway] registered venue {}", name);
                slot.insert(VenueEntry {
                    connector,
                    enabled: true,
                });
                Ok(())
            }
        }
    }

    pub fn set_enabled(&self, venue: &str, enabled: bool) -> Result<(), GatewayError> {
        let mut entry = self
            .venues
            .get_mut(venue)
            .ok_or_else(|| GatewayError::UnknownVenue(venue.to_string()))?;
        entry.enabled = enabled;
        info!(
            "[gateway] venue {} {}",
            venue,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Connector for a registered and enabled venue
    pub fn connector(&self, venue: &str) -> Result<Arc<dyn VenueConnector>, GatewayError> {
        let entry = self
            .venues
            .get(venue)
            .ok_or_else(|| GatewayError::UnknownVenue(venue.to_string()))?;
        if !entry.enabled {
            return Err(GatewayError::VenueDisabled(venue.to_string()));
        }
        Ok(Arc::clone(&entry.connector))
    }

    pub fn is_enabled(&self, venue: &str) -> bool {
        self.venues.get(venue).is_some_and(|e| e.enabled)
    }

    /// Every enabled connector
    pub fn enabled(&self) -> Vec<Arc<dyn VenueConnector>> {
        self.venues
            .iter()
            .filter(|e| e.enabled)
            .map(|e| Arc::clone(&e.connector))
            .collect()
    }

    pub fn names(&self) -> Vec<VenueId> {
        let mut names: Vec<VenueId> = self.venues.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}
