use arbiter_core::{AssetRef, ItemId, OwnerId, PricePoint, VenueId, VenueOrderRef};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ConnectorResult;

/// Capability set of one external trading venue
///
/// Fills are all-or-nothing: a successful `buy`/`sell` means the whole
/// quantity was accepted. Callers bound every call with a timeout.
#[async_trait]
pub trait VenueConnector: Send + Sync {
    /// Venue name, unique within a registry
    fn name(&self) -> VenueId;

    /// Current quote for an item
    async fn get_price(&self, item: &ItemId) -> ConnectorResult<PricePoint>;

    /// Assets held by an owner at this venue
    async fn get_inventory(&self, owner: &OwnerId) -> ConnectorResult<Vec<AssetRef>>;

    async fn buy(&self, item: &ItemId, price: Decimal, quantity: u32)
    -> ConnectorResult<VenueOrderRef>;

    async fn sell(
        &self,
        asset: &AssetRef,
        price: Decimal,
        quantity: u32,
    ) -> ConnectorResult<VenueOrderRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ensure the trait stays object-safe
    fn _assert_connector_object_safe(_: &dyn VenueConnector) {}
}
