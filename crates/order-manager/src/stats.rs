//! Profit and trading statistics derived from transactions

use arbiter_core::{Timestamp, Transaction};
use chrono::{Duration, Months};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lookback window for profit statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl StatsPeriod {
    /// Start of the window ending at `now`
    pub fn start(&self, now: Timestamp) -> Timestamp {
        match self {
            StatsPeriod::Day => now - Duration::days(1),
            StatsPeriod::Week => now - Duration::days(7),
            StatsPeriod::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            StatsPeriod::Year => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        }
    }
}

impl From<&str> for StatsPeriod {
    /// Unknown names fall back to a month
    fn from(name: &str) -> Self {
        match name {
            "day" => StatsPeriod::Day,
            "week" => StatsPeriod::Week,
            "year" => StatsPeriod::Year,
            _ => StatsPeriod::Month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitStats {
    pub period: StatsPeriod,
    pub total_profit: Decimal,
    pub trade_count: usize,
    /// Percent of trades with positive profit
    pub win_rate: Decimal,
    pub best_trade: Option<Transaction>,
}

impl ProfitStats {
    pub fn from_transactions<'a>(
        period: StatsPeriod,
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Self {
        let mut total_profit = Decimal::ZERO;
        let mut trade_count = 0usize;
        let mut wins = 0usize;
        let mut best_trade: Option<&Transaction> = None;

        for tx in transactions {
            trade_count += 1;
            total_profit += tx.realized_profit();
            if tx.is_win() {
                wins += 1;
            }
            if best_trade.is_none_or(|best| tx.realized_profit() > best.realized_profit()) {
                best_trade = Some(tx);
            }
        }

        let win_rate = if trade_count == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(wins) / Decimal::from(trade_count) * Decimal::ONE_HUNDRED
        };

        Self {
            period,
            total_profit,
            trade_count,
            win_rate,
            best_trade: best_trade.cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingStats {
    /// Sum of transaction amounts
    pub total_volume: Decimal,
    /// Orders still pending
    pub active_orders: usize,
    pub inventory_value: Decimal,
}
