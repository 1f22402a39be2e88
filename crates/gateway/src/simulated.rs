//! Simulated venue - in-process connector with a random-walk quote
//!
//! Used by tests and local runs. Quotes move by a bounded random step on each
//! `get_price`; buys and sells are accepted after an optional latency unless a
//! failure has been injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arbiter_core::{AssetRef, ItemId, OwnerId, PricePoint, VenueId, VenueOrderRef};
use arbiter_ports::{ConnectorError, ConnectorResult, VenueConnector};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Configuration for a simulated venue
#[derive(Debug, Clone)]
pub struct SimulatedVenueConfig {
    /// Max relative move per quote (e.g. 0.01 = 1%); zero keeps quotes fixed
    pub price_volatility: Decimal,
    /// Volume reported with each quote
    pub quote_volume: Decimal,
    pub currency: String,
    /// Delay applied to buy/sell before answering
    pub latency: Duration,
}

impl Default for SimulatedVenueConfig {
    fn default() -> Self {
        Self {
            price_volatility: Decimal::ZERO,
            quote_volume: Decimal::ONE,
            currency: "CNY".to_string(),
            latency: Duration::ZERO,
        }
    }
}

/// A buy or sell the venue accepted or refused
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedCall {
    Buy {
        item: ItemId,
        price: Decimal,
        quantity: u32,
    },
    Sell {
        asset_id: String,
        price: Decimal,
        quantity: u32,
    },
}

#[derive(Debug, Default)]
enum FailureMode {
    #[default]
    None,
    Always(ConnectorError),
    Next(u32, ConnectorError),
}

struct SimState {
    quotes: HashMap<ItemId, Decimal>,
    holdings: HashMap<OwnerId, Vec<AssetRef>>,
    failure: FailureMode,
    calls: Vec<SimulatedCall>,
    rng: StdRng,
}

/// In-process venue connector
pub struct SimulatedVenue {
    name: VenueId,
    config: SimulatedVenueConfig,
    state: Mutex<SimState>,
    order_seq: AtomicU64,
}

impl SimulatedVenue {
    pub fn new(name: impl Into<VenueId>) -> Self {
        Self::with_config(name, SimulatedVenueConfig::default())
    }

    pub fn with_config(name: impl Into<VenueId>, config: SimulatedVenueConfig) -> Self {
        Self::build(name.into(), config, StdRng::from_entropy())
    }

    /// Reproducible random walk
    pub fn with_seed(name: impl Into<VenueId>, config: SimulatedVenueConfig, seed: u64) -> Self {
        Self::build(name.into(), config, StdRng::seed_from_u64(seed))
    }

    fn build(name: VenueId, config: SimulatedVenueConfig, rng: StdRng) -> Self {
        Self {
            name,
            config,
            state: Mutex::new(SimState {
                quotes: HashMap::new(),
                holdings: HashMap::new(),
                failure: FailureMode::None,
                calls: Vec::new(),
                rng,
            }),
            order_seq: AtomicU64::new(0),
        }
    }

    /// Set the current quote for an item
    pub fn set_price(&self, item: impl Into<ItemId>, price: Decimal) {
        self.state.lock().quotes.insert(item.into(), price);
    }

    /// Seed an asset the venue reports for an owner
    pub fn add_holding(&self, owner: impl Into<OwnerId>, asset: AssetRef) {
        self.state
            .lock()
            .holdings
            .entry(owner.into())
            .or_default()
            .push(asset);
    }

    /// Fail every buy/sell until cleared
    pub fn fail_with(&self, error: ConnectorError) {
        self.state.lock().failure = FailureMode::Always(error);
    }

    /// Fail the next `count` buy/sell calls
    pub fn fail_next(&self, count: u32, error: ConnectorError) {
        self.state.lock().failure = FailureMode::Next(count, error);
    }

    pub fn clear_failure(&self) {
        self.state.lock().failure = FailureMode::None;
    }

    /// Every buy/sell attempted so far
    pub fn calls(&self) -> Vec<SimulatedCall> {
        self.state.lock().calls.clone()
    }

    fn next_ref(&self) -> VenueOrderRef {
        let seq = self.order_seq.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", self.name, seq)
    }

    /// Record the call and decide whether it fails
    fn admit(&self, call: SimulatedCall) -> ConnectorResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);

        let (outcome, next) = match std::mem::take(&mut state.failure) {
            FailureMode::None => (Ok(()), FailureMode::None),
            FailureMode::Always(e) => (Err(e.clone()), FailureMode::Always(e)),
            FailureMode::Next(n, e) if n > 1 => (Err(e.clone()), FailureMode::Next(n - 1, e)),
            FailureMode::Next(_, e) => (Err(e), FailureMode::None),
        };
        state.failure = next;
        outcome
    }

    fn step(&self, current: Decimal, rng: &mut StdRng) -> Decimal {
        if self.config.price_volatility.is_zero() {
            return current;
        }
        let draw: f64 = rng.gen_range(-1.0..1.0);
        let change = Decimal::from_f64_retain(draw).unwrap_or(Decimal::ZERO);
        let next = (current * (Decimal::ONE + self.config.price_volatility * change)).round_dp(2);
        next.max(Decimal::new(1, 2))
    }
}

#[async_trait]
impl VenueConnector for SimulatedVenue {
    fn name(&self) -> VenueId {
        self.name.clone()
    }

    async fn get_price(&self, item: &ItemId) -> ConnectorResult<PricePoint> {
        let price = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let current = *state
                .quotes
                .get(item)
                .ok_or_else(|| ConnectorError::Rejected(format!("unknown item {}", item)))?;
            let next = self.step(current, &mut state.rng);
            state.quotes.insert(item.clone(), next);
            next
        };

        Ok(PricePoint::new_with_time(item.clone(), self.name.clone(), price, Utc::now())
            .with_volume(self.config.quote_volume)
            .with_currency(self.config.currency.clone()))
    }

    async fn get_inventory(&self, owner: &OwnerId) -> ConnectorResult<Vec<AssetRef>> {
        Ok(self
            .state
            .lock()
            .holdings
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn buy(
        &self,
        item: &ItemId,
        price: Decimal,
        quantity: u32,
    ) -> ConnectorResult<VenueOrderRef> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        let admitted = self.admit(SimulatedCall::Buy {
            item: item.clone(),
            price,
            quantity,
        });
        if let Err(e) = admitted {
            warn!("[{}] buy {} x{} refused: {}", self.name, item, quantity, e);
            return Err(e);
        }

        let order_ref = self.next_ref();
        debug!("[{}] buy {} x{} @ {} -> {}", self.name, item, quantity, price, order_ref);
        Ok(order_ref)
    }

    async fn sell(
        &self,
        asset: &AssetRef,
        price: Decimal,
        quantity: u32,
    ) -> ConnectorResult<VenueOrderRef> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        let admitted = self.admit(SimulatedCall::Sell {
            asset_id: asset.asset_id.clone(),
            price,
            quantity,
        });
        if let Err(e) = admitted {
            warn!("[{}] sell {} x{} refused: {}", self.name, asset.item, quantity, e);
            return Err(e);
        }

        let order_ref = self.next_ref();
        debug!(
            "[{}] sell {} x{} @ {} -> {}",
            self.name, asset.item, quantity, price, order_ref
        );
        Ok(order_ref)
    }
}
