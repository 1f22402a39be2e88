//! Cross-Venue Arbitrage Strategy
//!
//! Compares the cheapest and the dearest venue each tick. When the spread
//! clears both minimums it buys at the cheap venue (if cheap enough) and
//! sells at the dear one (if dear enough).

use log::{debug, info};
use rust_decimal::Decimal;

use crate::params::ArbitrageParams;
use crate::strategy::{Intent, StrategyContext, StrategyLogic};

pub struct ArbitrageStrategy {
    params: ArbitrageParams,
}

impl ArbitrageStrategy {
    pub fn new(params: ArbitrageParams) -> Self {
        Self { params }
    }
}

impl StrategyLogic for ArbitrageStrategy {
    fn name(&self) -> &str {
        "arbitrage"
    }

    fn on_tick(&mut self, ctx: &StrategyContext<'_>) -> Vec<Intent> {
        let cheapest = ctx.latest.iter().min_by_key(|(_, p)| p.price);
        let dearest = ctx.latest.iter().max_by_key(|(_, p)| p.price);
        let (Some((buy_venue, low)), Some((sell_venue, high))) = (cheapest, dearest) else {
            return Vec::new();
        };
        if buy_venue == sell_venue || low.price <= Decimal::ZERO {
            return Vec::new();
        }

        let spread = high.price - low.price;
        let spread_percent = spread / low.price * Decimal::ONE_HUNDRED;
        if spread_percent <= self.params.min_spread_percent
            || spread <= self.params.min_spread_amount
        {
            debug!(
                "[Arbitrage] {} spread {}% below minimum, skipping",
                ctx.item,
                spread_percent.round_dp(2)
            );
            return Vec::new();
        }

        let reason = format!(
            "spread {}% between {} and {}",
            spread_percent.round_dp(2),
            buy_venue,
            sell_venue
        );
        let mut intents = Vec::new();
        if low.price <= self.params.buy_threshold {
            info!("[Arbitrage] BUY {} at {} for {}", ctx.item, buy_venue, low.price);
            intents.push(Intent::buy(
                buy_venue.clone(),
                low.price,
                self.params.quantity,
                reason.clone(),
            ));
        }
        if high.price >= self.params.sell_threshold {
            info!("[Arbitrage] SELL {} at {} for {}", ctx.item, sell_venue, high.price);
            intents.push(Intent::sell(
                sell_venue.clone(),
                high.price,
                self.params.quantity,
                reason,
            ));
        }
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::*;
    use arbiter_core::Side;
    use arbiter_market::PriceStore;
    use rust_decimal_macros::dec;

    fn params() -> ArbitrageParams {
        ArbitrageParams {
            buy_threshold: dec!(105),
            sell_threshold: dec!(110),
            min_spread_percent: dec!(10),
            min_spread_amount: dec!(5),
            quantity: 1,
        }
    }

    fn evaluate(quotes: &[(&str, Decimal)], params: ArbitrageParams) -> Vec<Intent> {
        let store = PriceStore::default();
        for (venue, price) in quotes {
            record(&store, venue, *price, 0);
        }
        let latest = store.latest_by_venue(ITEM);
        let item = ITEM.to_string();
        let ctx = StrategyContext {
            item: &item,
            latest: &latest,
            store: &store,
            since: base_time(),
            held: 0,
        };
        ArbitrageStrategy::new(params).on_tick(&ctx)
    }

    #[test]
    fn test_wide_spread_buys_and_sells() {
        let intents = evaluate(&[("buff", dec!(100)), ("steam", dec!(115))], params());
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].side, Side::Buy);
        assert_eq!(intents[0].venue, "buff");
        assert_eq!(intents[0].price, dec!(100));
        assert_eq!(intents[1].side, Side::Sell);
        assert_eq!(intents[1].venue, "steam");
    }

    #[test]
    fn test_spread_at_minimum_is_not_enough() {
        // exactly 10%
        let intents = evaluate(&[("buff", dec!(100)), ("steam", dec!(110))], params());
        assert!(intents.is_empty());
    }

    #[test]
    fn test_thresholds_gate_each_leg() {
        let mut p = params();
        p.buy_threshold = dec!(90);
        let intents = evaluate(&[("buff", dec!(100)), ("steam", dec!(115))], p);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].side, Side::Sell);
    }

    #[test]
    fn test_single_venue_emits_nothing() {
        assert!(evaluate(&[("buff", dec!(100))], params()).is_empty());
    }
}
