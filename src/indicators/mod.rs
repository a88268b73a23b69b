// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the pipeline
// attaches to a price series.  The `calculate_*` functions return only the
// defined tail of each indicator; `align` pads that tail back to the length of
// the input so every column lines up with the series index.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

/// Place `values` at `start..` inside a vector of `len` entries, leaving every
/// other entry undefined.
pub fn align(len: usize, start: usize, values: Vec<f64>) -> Vec<Option<f64>> {
    let mut out = vec![None; len];
    for (slot, value) in out.iter_mut().skip(start).zip(values) {
        *slot = Some(value);
    }
    out
}
