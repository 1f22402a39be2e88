//! Arbiter Strategy Framework
//!
//! User-configured strategies evaluated on a schedule:
//! - Parameters are a tagged union, one validated struct per kind
//! - Each kind implements [`StrategyLogic`] and turns a market snapshot into
//!   intents
//! - The executor turns intents into orders through the order manager
//! - The scheduler runs one periodic task per active strategy
//!
//! ## Architecture
//!
//! ```text
//!  StrategyRegistry ──── status ────┐
//!                                   ▼
//!  StrategyScheduler ──► task per strategy ──► StrategyExecutor
//!                                                  │
//!                         PriceStore snapshot ────►│ StrategyLogic::on_tick
//!                                                  ▼
//!                                             Vec<Intent>
//!                                                  │
//!                                                  ▼
//!                                      OrderManager::submit (await)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbiter_strategy::{NewStrategy, StrategyParams, TrendFollowingParams};
//!
//! let params = StrategyParams::TrendFollowing(TrendFollowingParams {
//!     venue: "buff".to_string(),
//!     quantity: 1,
//! });
//! let strategy = scheduler.create(NewStrategy::new("alice", "AK-47 | Redline", "trend", params))?;
//! scheduler.activate(strategy.id, "alice").await?;
//! ```

pub mod arbitrage;
pub mod entity;
pub mod error;
pub mod executor;
pub mod grid;
pub mod mean_reversion;
pub mod params;
pub mod registry;
pub mod scheduler;
pub mod strategy;
pub mod trend_following;

// Re-export main types
pub use arbitrage::ArbitrageStrategy;
pub use entity::{NewStrategy, Strategy, StrategyStatus, StrategyUpdate};
pub use error::{Result, StrategyError};
pub use executor::{StrategyExecutor, TickOutcome};
pub use grid::GridStrategy;
pub use mean_reversion::MeanReversionStrategy;
pub use params::{
    ArbitrageParams, GridParams, MeanReversionParams, StrategyParams, TrendFollowingParams,
};
pub use registry::StrategyRegistry;
pub use scheduler::{SchedulerConfig, StrategyScheduler};
pub use strategy::{Intent, StrategyContext, StrategyLogic, build_logic};
pub use trend_following::TrendFollowingStrategy;
