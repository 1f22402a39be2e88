//! The strategy entity and its lifecycle states

use std::fmt;

use arbiter_core::{ItemId, OwnerId, StrategyId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StrategyError};
use crate::params::StrategyParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    Active,
    Paused,
    Stopped,
}

impl StrategyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyStatus::Active => "active",
            StrategyStatus::Paused => "paused",
            StrategyStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-configured rule set evaluated on a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub owner: OwnerId,
    pub item: ItemId,
    pub name: String,
    pub description: String,
    pub params: StrategyParams,
    pub status: StrategyStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Strategy {
    pub fn kind(&self) -> &'static str {
        self.params.kind()
    }

    pub fn is_active(&self) -> bool {
        self.status == StrategyStatus::Active
    }
}

/// Input for creating a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStrategy {
    pub owner: OwnerId,
    pub item: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub params: StrategyParams,
}

impl NewStrategy {
    pub fn new(
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        name: impl Into<String>,
        params: StrategyParams,
    ) -> Self {
        Self {
            owner: owner.into(),
            item: item.into(),
            name: name.into(),
            description: String::new(),
            params,
        }
    }

    /// Validate and build a paused strategy
    pub fn build(self) -> Result<Strategy> {
        if self.owner.is_empty() {
            return Err(StrategyError::Invalid("owner is empty".to_string()));
        }
        if self.item.is_empty() {
            return Err(StrategyError::Invalid("item is empty".to_string()));
        }
        self.params.validate()?;

        let now = Utc::now();
        Ok(Strategy {
            id: Uuid::new_v4(),
            owner: self.owner,
            item: self.item,
            name: self.name,
            description: self.description,
            params: self.params,
            status: StrategyStatus::Paused,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub params: Option<StrategyParams>,
}

impl StrategyUpdate {
    pub fn params(params: StrategyParams) -> Self {
        Self {
            params: Some(params),
            ..Default::default()
        }
    }
}
