//! Indicator Math
//!
//! Free functions over candle field slices. All arithmetic is in `Decimal`,
//! so results are exact and assertable. Insufficient input is always a
//! `None`/empty result, never an error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Exponential moving average series
///
/// Empty when fewer than `period` closes. The seed is the simple average of
/// the first `period` closes; the remaining closes are folded in with factor
/// `2 / (period + 1)`. The output is padded to the input length with the
/// first `period` entries all equal to the seed.
pub fn ema(closes: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let seed = closes[..period].iter().copied().sum::<Decimal>() / Decimal::from(period as u64);
    let factor = dec!(2) / Decimal::from(period as u64 + 1);

    let mut values = vec![seed; period];
    let mut prev = seed;
    for &price in &closes[period..] {
        prev = (price - prev) * factor + prev;
        values.push(prev);
    }
    values
}

/// Relative Strength Index, final value only
///
/// `None` when fewer than `period + 1` closes. Seeds the average gain/loss
/// from the first `period` deltas, then applies Wilder smoothing
/// `(prev * (period - 1) +/- delta) / period` across the rest.
///
/// When the smoothed average loss is zero, RS is taken as 0 and the RSI
/// evaluates to 0 rather than the conventional 100. The degenerate value
/// reads as oversold, so a loss-free run scores toward BUY momentum.
pub fn rsi(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<Decimal> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let p = Decimal::from(period as u64);

    let mut avg_gain = deltas[..period]
        .iter()
        .filter(|d| **d >= Decimal::ZERO)
        .copied()
        .sum::<Decimal>()
        / p;
    let mut avg_loss = -deltas[..period]
        .iter()
        .filter(|d| **d < Decimal::ZERO)
        .copied()
        .sum::<Decimal>()
        / p;

    let mut value = rsi_from_averages(avg_gain, avg_loss);
    for &delta in &deltas[period..] {
        if delta > Decimal::ZERO {
            avg_gain = (avg_gain * (p - Decimal::ONE) + delta) / p;
            avg_loss = avg_loss * (p - Decimal::ONE) / p;
        } else {
            avg_gain = avg_gain * (p - Decimal::ONE) / p;
            avg_loss = (avg_loss * (p - Decimal::ONE) - delta) / p;
        }
        value = rsi_from_averages(avg_gain, avg_loss);
    }

    Some(value)
}

fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    let rs = if avg_loss.is_zero() {
        Decimal::ZERO
    } else {
        avg_gain / avg_loss
    };
    dec!(100) - dec!(100) / (Decimal::ONE + rs)
}

/// Stochastic oscillator (%K, %D)
///
/// `None` when fewer than `k_period` bars. %K compares the latest close to
/// the trailing `k_period` range, using 50 on a zero range. %D is the simple
/// average of the last `d_period` %K values; when history is shorter than
/// `k_period + d_period - 1` bars it falls back to the current %K.
pub fn stochastic(
    highs: &[Decimal],
    lows: &[Decimal],
    closes: &[Decimal],
    k_period: usize,
    d_period: usize,
) -> Option<(Decimal, Decimal)> {
    let k = percent_k(highs, lows, closes, k_period)?;

    let d = if d_period > 1 && closes.len() + 1 >= k_period + d_period {
        let mut sum = Decimal::ZERO;
        for back in 0..d_period {
            let end = closes.len() - back;
            sum += percent_k(&highs[..end], &lows[..end], &closes[..end], k_period)?;
        }
        sum / Decimal::from(d_period as u64)
    } else {
        k
    };

    Some((k, d))
}

/// %K at the last bar of the given slices
fn percent_k(
    highs: &[Decimal],
    lows: &[Decimal],
    closes: &[Decimal],
    k_period: usize,
) -> Option<Decimal> {
    if k_period == 0 || closes.len() < k_period || highs.len() < k_period || lows.len() < k_period {
        return None;
    }

    let highest_high = highs[highs.len() - k_period..].iter().copied().max()?;
    let lowest_low = lows[lows.len() - k_period..].iter().copied().min()?;
    let last_close = *closes.last()?;

    let range = highest_high - lowest_low;
    if range.is_zero() {
        return Some(dec!(50));
    }
    Some(dec!(100) * (last_close - lowest_low) / range)
}

/// Average True Range: simple average of the last `period` true ranges
///
/// TR per bar is `max(high - low, |high - prev_close|, |low - prev_close|)`.
/// `None` when there are not enough bars to form `period` true ranges.
pub fn atr(
    highs: &[Decimal],
    lows: &[Decimal],
    closes: &[Decimal],
    period: usize,
) -> Option<Decimal> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(closes.len().saturating_sub(1));
    for i in 1..closes.len() {
        let high_low = highs[i] - lows[i];
        let high_close = (highs[i] - closes[i - 1]).abs();
        let low_close = (lows[i] - closes[i - 1]).abs();
        true_ranges.push(high_low.max(high_close).max(low_close));
    }

    if true_ranges.len() < period {
        return None;
    }

    Some(
        true_ranges[true_ranges.len() - period..]
            .iter()
            .copied()
            .sum::<Decimal>()
            / Decimal::from(period as u64),
    )
}
