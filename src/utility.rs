//! Small numerical helpers shared by several stages.

/// Arithmetic mean, or `None` for an empty slice.
pub(crate) fn mean(vals: &[f64]) -> Option<f64> {
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

/// Sample standard deviation of `vals` about `center`. A single value has zero spread.
pub(crate) fn sample_std_dev(vals: &[f64], center: f64) -> f64 {
    if vals.len() < 2 {
        return 0.0;
    }

    let sum_sq: f64 = vals.iter().map(|v| (v - center) * (v - center)).sum();
    (sum_sq / (vals.len() - 1) as f64).sqrt()
}
