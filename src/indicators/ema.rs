// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The first EMA value is seeded with the SMA of the `period` closes ending at
// the seed index.  A standalone EMA seeds at `period - 1`; MACD seeds both of
// its averages later (see `macd.rs`).
// =============================================================================

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    ema_seeded_at(closes, period, period - 1)
}

/// EMA aligned to `closes`: the first `period - 1` entries are `None`.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    super::align(
        closes.len(),
        period.saturating_sub(1),
        calculate_ema(closes, period),
    )
}

/// EMA whose first output lands on `seed_index`, seeded with the mean of
/// `values[seed_index + 1 - period..=seed_index]`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `seed_index < period - 1` or `seed_index >= values.len()` => empty vec
pub(crate) fn ema_seeded_at(values: &[f64], period: usize, seed_index: usize) -> Vec<f64> {
    if period == 0 || seed_index < period - 1 || seed_index >= values.len() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let window = &values[seed_index + 1 - period..=seed_index];
    let seed = window.iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(values.len() - seed_index);
    result.push(seed);

    let mut prev_ema = seed;
    for &value in &values[seed_index + 1..] {
        let ema = value * multiplier + prev_ema * (1.0 - multiplier);
        result.push(ema);
        prev_ema = ema;
    }

    result
}
