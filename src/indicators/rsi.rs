// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the mean of the first
//          `period` gains / losses.
// Step 3 — Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RSI = 100 * avg_gain / (avg_gain + avg_loss)
//
// A window with no movement at all reports 0, as TA-Lib does.
//
// Thresholds:  RSI >= 70 => overbought,  RSI <= 30 => oversold.
// =============================================================================

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period` (the first `period` closes are consumed to seed the averages).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() <= period` => empty vec (need at least `period` deltas)
/// - If average loss is zero and average gain is not, RSI is 100.0.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with the mean of the first `period` deltas -----------
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);
    result.push(rsi_from_averages(avg_gain, avg_loss));

    // --- Wilder's smoothing for subsequent values ----------------------------
    for &delta in &deltas[period..] {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        result.push(rsi_from_averages(avg_gain, avg_loss));
    }

    result
}

/// RSI aligned to `closes`: the first `period` entries are `None`.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    super::align(closes.len(), period, calculate_rsi(closes, period))
}

/// Human-readable zone for an RSI reading.
pub fn rsi_zone(value: f64) -> &'static str {
    if value >= 70.0 {
        "overbought"
    } else if value <= 30.0 {
        "oversold"
    } else {
        "neutral"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        0.0
    } else {
        100.0 * avg_gain / total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes (period deltas). 14 closes => 13 deltas < 14.
        assert!(calculate_rsi(&(1..=14).map(|x| x as f64).collect::<Vec<_>>(), 14).is_empty());
    }

    #[test]
    fn rsi_huge_period_is_insufficient_data() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], usize::MAX).is_empty());
        assert_eq!(rsi_series(&[1.0, 2.0, 3.0], usize::MAX), vec![None; 3]);
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 30 - 14);
        for &v in &series {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert!(!series.is_empty());
        for &v in &series {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_reports_zero() {
        let closes = vec![100.0; 30];
        let series = calculate_rsi(&closes, 14);
        assert!(!series.is_empty());
        assert!(series.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rsi_wilder_reference_values() {
        // Wilder's worked example (period 14), unrounded intermediates.
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 6);
        assert!((series[0] - 70.464).abs() < 0.001, "got {}", series[0]);
        assert!((series[1] - 66.250).abs() < 0.001, "got {}", series[1]);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = calculate_rsi(&closes, 14);
        for &v in &series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_series_alignment() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = rsi_series(&closes, 14);
        assert_eq!(series.len(), 20);
        assert!(series[..14].iter().all(Option::is_none));
        assert!(series[14..].iter().all(Option::is_some));
    }

    #[test]
    fn zones() {
        assert_eq!(rsi_zone(85.0), "overbought");
        assert_eq!(rsi_zone(15.0), "oversold");
        assert_eq!(rsi_zone(50.0), "neutral");
    }
}
