//! Statistics over an ordered price series
//!
//! All functions take prices oldest first and never panic on short input.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Samples considered by [`classify_trend`]
pub const TREND_WINDOW: usize = 7;

/// Default RSI lookback
pub const RSI_PERIOD: usize = 14;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Short-term direction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

pub fn min(prices: &[Decimal]) -> Option<Decimal> {
    prices.iter().copied().min()
}

pub fn max(prices: &[Decimal]) -> Option<Decimal> {
    prices.iter().copied().max()
}

/// Arithmetic mean, zero for an empty series
pub fn mean(prices: &[Decimal]) -> Decimal {
    if prices.is_empty() {
        return Decimal::ZERO;
    }
    prices.iter().sum::<Decimal>() / Decimal::from(prices.len())
}

pub fn median(prices: &[Decimal]) -> Option<Decimal> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation
pub fn std_dev(prices: &[Decimal]) -> Decimal {
    if prices.is_empty() {
        return Decimal::ZERO;
    }
    let avg = mean(prices);
    let variance = prices
        .iter()
        .map(|p| (*p - avg) * (*p - avg))
        .sum::<Decimal>()
        / Decimal::from(prices.len());
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

/// Standard deviation of period returns `(p[t] - p[t-1]) / p[t-1]`
pub fn volatility(prices: &[Decimal]) -> Decimal {
    if prices.len() < 2 {
        return Decimal::ZERO;
    }
    let returns: Vec<Decimal> = prices
        .windows(2)
        .filter(|w| !w[0].is_zero())
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    std_dev(&returns)
}

/// Simple moving average of the last `window` samples
pub fn sma(prices: &[Decimal], window: usize) -> Option<Decimal> {
    if window == 0 || prices.len() < window {
        return None;
    }
    Some(mean(&prices[prices.len() - window..]))
}

/// Relative strength index over the last `period` changes
///
/// Neutral 50 without `period + 1` samples; 100 when nothing fell.
pub fn rsi(prices: &[Decimal], period: usize) -> Decimal {
    if period == 0 || prices.len() < period + 1 {
        return Decimal::from(50);
    }

    let (gains, losses) = prices[prices.len() - period - 1..].windows(2).fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(gains, losses), w| {
            let change = w[1] - w[0];
            if change > Decimal::ZERO {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        },
    );

    let n = Decimal::from(period);
    let avg_gain = gains / n;
    let avg_loss = losses / n;
    if avg_loss.is_zero() {
        return HUNDRED;
    }

    let rs = avg_gain / avg_loss;
    HUNDRED - HUNDRED / (Decimal::ONE + rs)
}

/// Trend over the last [`TREND_WINDOW`] samples
///
/// Bullish when more than half the window's samples are up-steps, bearish
/// when more than half are down-steps. Short series are neutral.
pub fn classify_trend(prices: &[Decimal]) -> Trend {
    if prices.len() < TREND_WINDOW {
        return Trend::Neutral;
    }
    let recent = &prices[prices.len() - TREND_WINDOW..];
    let half = TREND_WINDOW / 2;

    let ups = recent.windows(2).filter(|w| w[1] > w[0]).count();
    let downs = recent.windows(2).filter(|w| w[1] < w[0]).count();

    if ups > half {
        Trend::Bullish
    } else if downs > half {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}
