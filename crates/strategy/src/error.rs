//! Strategy errors

use arbiter_core::{OwnerId, StrategyId};
use thiserror::Error;

use crate::entity::StrategyStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Strategy not found: {0}")]
    NotFound(StrategyId),

    #[error("Strategy {strategy_id} does not belong to {caller}")]
    Unauthorized {
        strategy_id: StrategyId,
        caller: OwnerId,
    },

    #[error("Invalid strategy parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid strategy: {0}")]
    Invalid(String),

    #[error("Strategy {strategy_id} is {status}")]
    InvalidState {
        strategy_id: StrategyId,
        status: StrategyStatus,
    },
}

pub type Result<T> = std::result::Result<T, StrategyError>;
