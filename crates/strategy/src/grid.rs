//! Grid Strategy
//!
//! Splits `[min_price, max_price]` into equal bands at one venue:
//! - Price crosses down into a lower band -> buy
//! - Price crosses up into a higher band -> sell
//! - Price outside the range -> nothing
//!
//! The first observed band only sets the reference.

use log::info;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::params::GridParams;
use crate::strategy::{Intent, StrategyContext, StrategyLogic};

pub struct GridStrategy {
    params: GridParams,
    last_band: Option<u32>,
}

impl GridStrategy {
    pub fn new(params: GridParams) -> Self {
        Self {
            params,
            last_band: None,
        }
    }

    /// Band index of a price, None outside the range
    fn band(&self, price: Decimal) -> Option<u32> {
        if price < self.params.min_price || price > self.params.max_price {
            return None;
        }
        let raw = ((price - self.params.min_price) / self.params.step())
            .floor()
            .to_u32()?;
        // the top edge belongs to the highest band
        Some(raw.min(self.params.grid_count - 1))
    }
}

impl StrategyLogic for GridStrategy {
    fn name(&self) -> &str {
        "grid"
    }

    fn on_tick(&mut self, ctx: &StrategyContext<'_>) -> Vec<Intent> {
        let Some(price) = ctx.price_at(&self.params.venue) else {
            return Vec::new();
        };
        let Some(band) = self.band(price) else {
            return Vec::new();
        };
        let Some(previous) = self.last_band.replace(band) else {
            return Vec::new();
        };

        let venue = self.params.venue.clone();
        let quantity = self.params.quantity;
        if band < previous {
            info!("[Grid] BUY signal: band {} -> {}, price={}", previous, band, price);
            vec![Intent::buy(
                venue,
                price,
                quantity,
                format!("grid crossed down to band {}", band),
            )]
        } else if band > previous {
            info!("[Grid] SELL signal: band {} -> {}, price={}", previous, band, price);
            vec![Intent::sell(
                venue,
                price,
                quantity,
                format!("grid crossed up to band {}", band),
            )]
        } else {
            Vec::new()
        }
    }
}
