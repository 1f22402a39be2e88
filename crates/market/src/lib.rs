//! Arbiter Market
//!
//! Market data side of the Arbiter trading engine:
//! - **Price Store**: immutable observations per (item, venue) plus a
//!   copy-on-write latest-value cache
//! - **Indicators**: moving averages, dispersion, RSI, trend classification
//! - **Analyzer**: per-series analysis and cross-venue arbitrage detection
//! - **Collector**: periodic polling of every enabled venue into the store
//!
//! ## Architecture
//!
//! ```text
//! VenueConnector::get_price ──► PriceCollector ──► PriceStore ──► price_update
//!                                                      │
//!                                    latest_by_venue   │   history
//!                                                      ▼
//!                                               MarketAnalyzer
//!                                     (analysis, trend, arbitrage scan)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbiter_market::{MarketAnalyzer, PriceStore, PriceStoreConfig};
//!
//! let store = PriceStore::new(PriceStoreConfig::default());
//! store.record(PricePoint::new("AK-47 | Redline", "buff", dec!(100)))?;
//! store.record(PricePoint::new("AK-47 | Redline", "steam", dec!(112)))?;
//!
//! let analyzer = MarketAnalyzer::new(store.clone(), dec!(10));
//! let opportunities = analyzer.arbitrage(&"AK-47 | Redline".to_string(), dec!(10));
//! ```

pub mod analyzer;
pub mod arbitrage;
pub mod collector;
pub mod error;
pub mod indicators;
pub mod store;

pub use analyzer::{MarketAnalysis, MarketAnalyzer, MarketOverview, PriceChange, PriceDirection};
pub use arbitrage::{ArbitrageOpportunity, find_opportunities};
pub use collector::{CollectReport, CollectorConfig, PriceCollector};
pub use error::{PriceStoreError, Result};
pub use indicators::Trend;
pub use store::{PriceHistory, PriceStore, PriceStoreConfig, RecordOutcome};
