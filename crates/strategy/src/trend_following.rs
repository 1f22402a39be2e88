//! Trend Following Strategy
//!
//! Enters on a bullish classification when flat, exits on a bearish one
//! when holding.

use arbiter_market::{Trend, indicators};
use log::info;

use crate::params::TrendFollowingParams;
use crate::strategy::{Intent, StrategyContext, StrategyLogic};

pub struct TrendFollowingStrategy {
    params: TrendFollowingParams,
}

impl TrendFollowingStrategy {
    pub fn new(params: TrendFollowingParams) -> Self {
        Self { params }
    }
}

impl StrategyLogic for TrendFollowingStrategy {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn on_tick(&mut self, ctx: &StrategyContext<'_>) -> Vec<Intent> {
        let Some(price) = ctx.price_at(&self.params.venue) else {
            return Vec::new();
        };
        let trend = indicators::classify_trend(&ctx.history(&self.params.venue));
        let venue = self.params.venue.clone();

        match trend {
            Trend::Bullish if !ctx.is_holding() => {
                info!("[TrendFollowing] BUY {} at {} for {}", ctx.item, venue, price);
                vec![Intent::buy(venue, price, self.params.quantity, "bullish trend".to_string())]
            }
            Trend::Bearish if ctx.is_holding() => {
                info!("[TrendFollowing] SELL {} at {} for {}", ctx.item, venue, price);
                vec![Intent::sell(venue, price, self.params.quantity, "bearish trend".to_string())]
            }
            _ => Vec::new(),
        }
    }
}
