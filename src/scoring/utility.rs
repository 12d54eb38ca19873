/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the sample standard deviation (N-1 divisor) given a
/// pre-computed mean. Returns 0.0 for fewer than two values.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Raw points over max points. A max of zero (or less) yields 0.0 rather
/// than an infinite or undefined ratio.
pub fn ratio(raw: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        raw / max
    }
}
