//! Engine configuration
//!
//! One JSON document with a section per component. Every section and field
//! has a default, so `{}` is a valid configuration.

use std::path::Path;
use std::time::Duration;

use arbiter_broadcast::HubConfig;
use arbiter_core::{ItemId, VenueId};
use arbiter_market::{CollectorConfig, PriceStoreConfig};
use arbiter_order_manager::OrderManagerConfig;
use arbiter_strategy::SchedulerConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    pub history_limit: usize,
    pub collect_interval_ms: u64,
    pub collect_timeout_ms: u64,
    /// Items the collector polls; empty disables collection
    pub tracked_items: Vec<ItemId>,
    pub default_min_profit_percent: Decimal,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            history_limit: 10_000,
            collect_interval_ms: 60_000,
            collect_timeout_ms: 10_000,
            tracked_items: Vec::new(),
            default_min_profit_percent: dec!(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersSection {
    pub connector_timeout_ms: u64,
    pub fee_rate: Decimal,
}

impl Default for OrdersSection {
    fn default() -> Self {
        Self {
            connector_timeout_ms: 30_000,
            fee_rate: dec!(0.025),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    pub evaluation_interval_ms: u64,
    pub history_window_days: i64,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            evaluation_interval_ms: 60_000,
            history_window_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastSection {
    pub buffer_capacity: usize,
    pub keepalive_interval_ms: u64,
    pub keepalive_timeout_ms: u64,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        Self {
            buffer_capacity: 256,
            keepalive_interval_ms: 54_000,
            keepalive_timeout_ms: 60_000,
        }
    }
}

/// Initial enablement of a venue, applied when its connector is registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSection {
    pub name: VenueId,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub market: MarketSection,
    pub orders: OrdersSection,
    pub strategy: StrategySection,
    pub broadcast: BroadcastSection,
    pub venues: Vec<VenueSection>,
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::Invalid(reason.to_string()));

        if self.market.history_limit == 0 {
            return invalid("market.history_limit must be at least 1");
        }
        if self.market.collect_interval_ms == 0 || self.strategy.evaluation_interval_ms == 0 {
            return invalid("intervals must be positive");
        }
        if self.market.default_min_profit_percent < Decimal::ZERO {
            return invalid("market.default_min_profit_percent must not be negative");
        }
        if self.orders.fee_rate < Decimal::ZERO || self.orders.fee_rate >= Decimal::ONE {
            return invalid("orders.fee_rate must be in [0, 1)");
        }
        if self.broadcast.buffer_capacity == 0 {
            return invalid("broadcast.buffer_capacity must be at least 1");
        }
        if self.broadcast.keepalive_timeout_ms <= self.broadcast.keepalive_interval_ms {
            return invalid("broadcast.keepalive_timeout_ms must exceed keepalive_interval_ms");
        }
        Ok(())
    }

    /// Enablement configured for a venue, if listed
    pub fn venue_enabled(&self, name: &str) -> Option<bool> {
        self.venues.iter().find(|v| v.name == name).map(|v| v.enabled)
    }

    pub fn price_store(&self) -> PriceStoreConfig {
        PriceStoreConfig {
            history_limit: self.market.history_limit,
        }
    }

    pub fn collector(&self) -> CollectorConfig {
        CollectorConfig {
            interval: Duration::from_millis(self.market.collect_interval_ms),
            tracked_items: self.market.tracked_items.clone(),
            call_timeout: Duration::from_millis(self.market.collect_timeout_ms),
        }
    }

    pub fn order_manager(&self) -> OrderManagerConfig {
        OrderManagerConfig {
            connector_timeout: Duration::from_millis(self.orders.connector_timeout_ms),
            fee_rate: self.orders.fee_rate,
        }
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            evaluation_interval: Duration::from_millis(self.strategy.evaluation_interval_ms),
            history_window: chrono::Duration::days(self.strategy.history_window_days),
        }
    }

    pub fn hub(&self) -> HubConfig {
        HubConfig {
            buffer_capacity: self.broadcast.buffer_capacity,
            keepalive_interval: Duration::from_millis(self.broadcast.keepalive_interval_ms),
            keepalive_timeout: Duration::from_millis(self.broadcast.keepalive_timeout_ms),
        }
    }
}
