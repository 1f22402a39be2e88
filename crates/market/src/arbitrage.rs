//! Cross-venue arbitrage detection

use std::collections::BTreeMap;

use arbiter_core::{ItemId, PricePoint, VenueId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Buy at one venue, sell at another. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub item: ItemId,
    pub buy_venue: VenueId,
    pub sell_venue: VenueId,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// sell - buy, per unit
    pub profit: Decimal,
    /// profit / buy x 100
    pub profit_percent: Decimal,
}

/// Every ordered venue pair whose spread reaches `min_profit_percent`
///
/// Direction matters: (a, b) and (b, a) are separate candidates and only the
/// one selling higher can qualify. Results are sorted by `profit_percent`,
/// best first.
pub fn find_opportunities(
    item: &str,
    latest: &BTreeMap<VenueId, PricePoint>,
    min_profit_percent: Decimal,
) -> Vec<ArbitrageOpportunity> {
    let mut found = Vec::new();

    for (buy_venue, buy) in latest {
        if buy.price <= Decimal::ZERO {
            continue;
        }
        for (sell_venue, sell) in latest {
            if buy_venue == sell_venue || sell.price <= buy.price {
                continue;
            }
            let profit = sell.price - buy.price;
            let profit_percent = profit / buy.price * Decimal::ONE_HUNDRED;
            if profit_percent >= min_profit_percent {
                found.push(ArbitrageOpportunity {
                    item: item.to_string(),
                    buy_venue: buy_venue.clone(),
                    sell_venue: sell_venue.clone(),
                    buy_price: buy.price,
                    sell_price: sell.price,
                    profit,
                    profit_percent,
                });
            }
        }
    }

    found.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));
    found
}
