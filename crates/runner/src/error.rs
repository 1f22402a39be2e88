//! Engine errors

use arbiter_gateway::GatewayError;
use arbiter_market::PriceStoreError;
use arbiter_order_manager::{Error as OrderError, LedgerError};
use arbiter_ports::ConnectorError;
use arbiter_strategy::StrategyError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Venue(#[from] GatewayError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Price(#[from] PriceStoreError),

    #[error(transparent)]
    Inventory(#[from] LedgerError),

    #[error("Engine is already running")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, EngineError>;
