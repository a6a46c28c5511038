//! Curve smoothing, independent of runs, colors and rendering.

use clap::ValueEnum;

/// Smoothing method applied to a series' values before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmoothMethod {
    /// Exponential moving average.
    Ema,
    /// Simple moving average.
    Ma,
}

/// Smooth `values` with the given method and window.
///
/// Output length always equals input length. A window of one or less
/// returns the input unchanged, as does an empty input.
pub fn smooth(values: &[f64], method: SmoothMethod, window: usize) -> Vec<f64> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }
    match method {
        SmoothMethod::Ma => moving_average(values, window),
        SmoothMethod::Ema => exponential(values, window),
    }
}

/// Uniform-kernel convolution with "same" length semantics: edge bins are
/// averaged against implicit zeros outside the sequence boundary.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    // The center of a same-length convolution sits (window - 1) / 2 ahead.
    let lead = (window - 1) / 2;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let hi = (i + lead).min(n - 1);
        let lo = (i + lead).saturating_sub(window - 1);
        let sum: f64 = values[lo..=hi].iter().sum();
        out.push(sum / window as f64);
    }
    out
}

/// Recurrence seeded with the first sample, alpha = 2 / (window + 1).
fn exponential(values: &[f64], window: usize) -> Vec<f64> {
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    out.push(values[0]);
    for i in 1..values.len() {
        out.push(alpha * values[i] + (1.0 - alpha) * out[i - 1]);
    }
    out
}
