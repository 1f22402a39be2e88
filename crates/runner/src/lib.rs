//! Arbiter Runner - Engine Composition
//!
//! Builds the whole trading orchestration engine from one configuration:
//!
//! - **Config**: typed JSON configuration with defaults per section
//! - **Engine**: owns every component and exposes the control operations
//!
//! ## Architecture
//!
//! ```text
//!   venue connectors ──► PriceCollector ──► PriceStore ◄── record_price
//!                                              │
//!                                              ▼
//!                                       MarketAnalyzer / StrategyScheduler
//!                                                               │ intents
//!                                                               ▼
//!   create_order / cancel_order ──────────────────────────► OrderManager
//!                                                               │
//!                                  InventoryLedger ◄────────────┤
//!                                                               ▼
//!                                                         BroadcastHub ──► /ws
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbiter_runner::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::from_file("arbiter.json")?)?;
//! engine.register_venue(Arc::new(SimulatedVenue::new("buff")))?;
//! engine.start()?;
//! ```

pub mod config;
pub mod engine;
pub mod error;

// Re-export main types
pub use config::{
    BroadcastSection, ConfigError, EngineConfig, MarketSection, OrdersSection, StrategySection,
    VenueSection,
};
pub use engine::{Engine, EngineStats};
pub use error::{EngineError, Result};
