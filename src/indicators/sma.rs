// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// The first defined value sits at index `period - 1`.
// =============================================================================

/// Compute the SMA series for `closes` over a trailing window of `period`.
///
/// Returns an empty `Vec` when the period is zero or longer than the input.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let divisor = period as f64;
    closes
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / divisor)
        .collect()
}

/// SMA aligned to `closes`: the first `period - 1` entries are `None`.
pub fn sma_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    super::align(
        closes.len(),
        period.saturating_sub(1),
        calculate_sma(closes, period),
    )
}
