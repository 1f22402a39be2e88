//! Mean Reversion Strategy
//!
//! Trades when the venue price leaves a band around its moving average:
//! - Below `ma × (1 − deviation%)` -> buy (expects price to rise)
//! - Above `ma × (1 + deviation%)` -> sell (expects price to fall)

use arbiter_market::indicators;
use log::info;
use rust_decimal::Decimal;

use crate::params::MeanReversionParams;
use crate::strategy::{Intent, StrategyContext, StrategyLogic};

pub struct MeanReversionStrategy {
    params: MeanReversionParams,
}

impl MeanReversionStrategy {
    pub fn new(params: MeanReversionParams) -> Self {
        Self { params }
    }

    /// Lower and upper band edges around the moving average
    fn band(&self, ma: Decimal) -> (Decimal, Decimal) {
        let deviation = self.params.deviation_percent / Decimal::ONE_HUNDRED;
        (ma * (Decimal::ONE - deviation), ma * (Decimal::ONE + deviation))
    }
}

impl StrategyLogic for MeanReversionStrategy {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn on_tick(&mut self, ctx: &StrategyContext<'_>) -> Vec<Intent> {
        let Some(price) = ctx.price_at(&self.params.venue) else {
            return Vec::new();
        };
        let history = ctx.history(&self.params.venue);
        let Some(ma) = indicators::sma(&history, self.params.window) else {
            return Vec::new();
        };

        let (lower, upper) = self.band(ma);
        let venue = self.params.venue.clone();
        let quantity = self.params.quantity;

        if price < lower {
            info!("[MeanReversion] BUY signal: price={}, ma={}, lower={}", price, ma, lower);
            vec![Intent::buy(venue, price, quantity, format!("price below band {}", lower))]
        } else if price > upper {
            info!("[MeanReversion] SELL signal: price={}, ma={}, upper={}", price, ma, upper);
            vec![Intent::sell(venue, price, quantity, format!("price above band {}", upper))]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::*;
    use arbiter_core::Side;
    use rust_decimal_macros::dec;

    fn strategy() -> MeanReversionStrategy {
        MeanReversionStrategy::new(MeanReversionParams {
            venue: "buff".into(),
            window: 4,
            deviation_percent: dec!(5),
            quantity: 1,
        })
    }

    fn evaluate(prices: &[Decimal]) -> Vec<Intent> {
        let store = store_with_series("buff", prices);
        let latest = store.latest_by_venue(ITEM);
        let item = ITEM.to_string();
        let ctx = StrategyContext {
            item: &item,
            latest: &latest,
            store: &store,
            since: base_time(),
            held: 1,
        };
        strategy().on_tick(&ctx)
    }

    #[test]
    fn test_band() {
        assert_eq!(strategy().band(dec!(100)), (dec!(95), dec!(105)));
    }

    #[test]
    fn test_drop_below_band_buys() {
        // ma of last 4 = (100 + 100 + 100 + 80) / 4 = 95, lower = 90.25
        let intents = evaluate(&[dec!(100), dec!(100), dec!(100), dec!(80)]);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].side, Side::Buy);
        assert_eq!(intents[0].price, dec!(80));
    }

    #[test]
    fn test_spike_above_band_sells() {
        // ma = 105, upper = 110.25
        let intents = evaluate(&[dec!(100), dec!(100), dec!(100), dec!(120)]);
        assert_eq!(intents[0].side, Side::Sell);
    }

    #[test]
    fn test_inside_band_or_short_window_holds() {
        assert!(evaluate(&[dec!(100), dec!(101), dec!(99), dec!(100)]).is_empty());
        assert!(evaluate(&[dec!(100), dec!(50)]).is_empty());
    }
}
