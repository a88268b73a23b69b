// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD   = EMA_fast(close) - EMA_slow(close)
//   Signal = EMA_signal(MACD)
//
// Alignment follows TA-Lib: both averages start at index `slow - 1`, each
// seeded with the SMA of its own period ending there, and neither output is
// defined before `slow - 1 + signal - 1` (index 33 for 12/26/9).
// =============================================================================

use super::ema::ema_seeded_at;

/// Defined tail of a MACD computation.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    /// Index of the input close that `macd[0]` and `signal[0]` belong to.
    pub start: usize,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Compute MACD and its signal line.
///
/// Returns `None` when any period is zero or the input is too short to
/// produce a single signal value. A `slow` period shorter than `fast` is
/// swapped with it.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Option<MacdOutput> {
    if fast == 0 || slow == 0 || signal == 0 {
        return None;
    }
    let (fast, slow) = if slow < fast { (slow, fast) } else { (fast, slow) };

    let line_start = slow - 1;
    let start = line_start.checked_add(signal - 1)?;
    if closes.len() <= start {
        return None;
    }

    let fast_ema = ema_seeded_at(closes, fast, line_start);
    let slow_ema = ema_seeded_at(closes, slow, line_start);
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_seeded_at(&line, signal, signal - 1);
    let macd = line[signal - 1..].to_vec();

    Some(MacdOutput {
        start,
        macd,
        signal: signal_line,
    })
}

/// MACD and signal aligned to `closes`, as `(macd, signal)`.
pub fn macd_series(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let len = closes.len();
    match calculate_macd(closes, fast, slow, signal) {
        Some(out) => (
            super::align(len, out.start, out.macd),
            super::align(len, out.start, out.signal),
        ),
        None => (vec![None; len], vec![None; len]),
    }
}
