//! In-memory strategy registry
//!
//! Owns every strategy entity. All mutations check ownership first.

use std::sync::Arc;

use arbiter_core::StrategyId;
use chrono::Utc;
use dashmap::DashMap;

use crate::entity::{NewStrategy, Strategy, StrategyStatus, StrategyUpdate};
use crate::error::{Result, StrategyError};

#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: Arc<DashMap<StrategyId, Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a new strategy; it starts paused
    pub fn create(&self, new: NewStrategy) -> Result<Strategy> {
        let strategy = new.build()?;
        self.strategies.insert(strategy.id, strategy.clone());
        Ok(strategy)
    }

    pub fn get(&self, id: StrategyId) -> Option<Strategy> {
        self.strategies.get(&id).map(|s| s.clone())
    }

    /// Fetch a strategy the caller owns
    pub fn owned(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        let strategy = self.get(id).ok_or(StrategyError::NotFound(id))?;
        check_owner(&strategy, caller)?;
        Ok(strategy)
    }

    /// Strategies of one owner, newest first
    pub fn list(&self, owner: &str) -> Vec<Strategy> {
        let mut list: Vec<Strategy> = self
            .strategies
            .iter()
            .filter(|s| s.owner == owner)
            .map(|s| s.clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub fn count(&self, owner: &str) -> usize {
        self.strategies.iter().filter(|s| s.owner == owner).count()
    }

    pub fn is_active(&self, id: StrategyId) -> bool {
        self.strategies.get(&id).is_some_and(|s| s.is_active())
    }

    /// Move a strategy to `status`
    ///
    /// Stopped strategies cannot be resumed.
    pub fn set_status(&self, id: StrategyId, caller: &str, status: StrategyStatus) -> Result<Strategy> {
        let mut entry = self.strategies.get_mut(&id).ok_or(StrategyError::NotFound(id))?;
        check_owner(&entry, caller)?;
        if entry.status == StrategyStatus::Stopped && status != StrategyStatus::Stopped {
            return Err(StrategyError::InvalidState {
                strategy_id: id,
                status: entry.status,
            });
        }
        entry.status = status;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Apply a partial update; new parameters are validated first
    pub fn update(&self, id: StrategyId, caller: &str, update: StrategyUpdate) -> Result<Strategy> {
        if let Some(params) = &update.params {
            params.validate()?;
        }
        let mut entry = self.strategies.get_mut(&id).ok_or(StrategyError::NotFound(id))?;
        check_owner(&entry, caller)?;
        if entry.status == StrategyStatus::Stopped {
            return Err(StrategyError::InvalidState {
                strategy_id: id,
                status: entry.status,
            });
        }

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(description) = update.description {
            entry.description = description;
        }
        if let Some(params) = update.params {
            entry.params = params;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    pub fn remove(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        self.owned(id, caller)?;
        self.strategies
            .remove(&id)
            .map(|(_, s)| s)
            .ok_or(StrategyError::NotFound(id))
    }
}

fn check_owner(strategy: &Strategy, caller: &str) -> Result<()> {
    if strategy.owner != caller {
        return Err(StrategyError::Unauthorized {
            strategy_id: strategy.id,
            caller: caller.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{StrategyParams, TrendFollowingParams};

    fn new_strategy(owner: &str) -> NewStrategy {
        NewStrategy::new(
            owner,
            "AK-47 | Redline",
            "trend",
            StrategyParams::TrendFollowing(TrendFollowingParams {
                venue: "buff".into(),
                quantity: 1,
            }),
        )
    }

    #[test]
    fn test_create_starts_paused() {
        let registry = StrategyRegistry::new();
        let strategy = registry.create(new_strategy("alice")).unwrap();
        assert_eq!(strategy.status, StrategyStatus::Paused);
        assert!(!registry.is_active(strategy.id));
        assert_eq!(registry.count("alice"), 1);
        assert_eq!(registry.count("bob"), 0);
    }

    #[test]
    fn test_ownership_enforced() {
        let registry = StrategyRegistry::new();
        let strategy = registry.create(new_strategy("alice")).unwrap();

        let err = registry
            .set_status(strategy.id, "bob", StrategyStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StrategyError::Unauthorized { .. }));
        assert!(registry.remove(strategy.id, "bob").is_err());
        assert!(registry.get(strategy.id).is_some());
    }

    #[test]
    fn test_stopped_is_final() {
        let registry = StrategyRegistry::new();
        let strategy = registry.create(new_strategy("alice")).unwrap();
        registry
            .set_status(strategy.id, "alice", StrategyStatus::Stopped)
            .unwrap();

        let err = registry
            .set_status(strategy.id, "alice", StrategyStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StrategyError::InvalidState { .. }));
    }

    #[test]
    fn test_update_validates_params() {
        let registry = StrategyRegistry::new();
        let strategy = registry.create(new_strategy("alice")).unwrap();

        let bad = StrategyUpdate::params(StrategyParams::TrendFollowing(TrendFollowingParams {
            venue: String::new(),
            quantity: 1,
        }));
        assert!(matches!(
            registry.update(strategy.id, "alice", bad),
            Err(StrategyError::InvalidParams(_))
        ));

        let renamed = registry
            .update(
                strategy.id,
                "alice",
                StrategyUpdate {
                    name: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "renamed");
        assert!(renamed.updated_at >= strategy.updated_at);
    }

    #[test]
    fn test_unknown_id() {
        let registry = StrategyRegistry::new();
        let id = uuid::Uuid::new_v4();
        assert_eq!(registry.owned(id, "alice").unwrap_err(), StrategyError::NotFound(id));
    }
}
