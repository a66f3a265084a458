//! One-shot filtering with string errors, for older call sites.
//!
//! `calc` builds a filter with polynomial edges and unit time step, applies it once
//! and disposes it. Failures come back as `(None, Some(message))` instead of a
//! structured error.

use tracing::debug;

use crate::error::SavitzkyGolayError;
use crate::filter::{FilterConfig, SavitzkyGolayFilter};
use crate::input::collect_samples;

/// `(Some(output), None)` on success, `(None, Some(message))` on failure.
pub type LegacyOutcome = (Option<Vec<f64>>, Option<String>);

/// Smooths or differentiates `data` in one call.
///
/// Parameters are signed so that negative values from loosely typed callers are
/// reported rather than wrapped.
///
/// # Example
///
/// ```rust
/// use savgol_filter::legacy::calc;
///
/// let (output, error) = calc(2, 2, 2, 0, &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0]);
/// assert_eq!(output.map(|o| o.len()), Some(7));
/// assert!(error.is_none());
///
/// let (output, error) = calc(1, 3, 1, 0, &[1.0, 2.0, 3.0]);
/// assert!(output.is_none());
/// assert!(error.is_some());
/// ```
pub fn calc(
    half_window: i64,
    poly_order: i64,
    target_point: i64,
    derivative: i64,
    data: &[f64],
) -> LegacyOutcome {
    let result = legacy_config(half_window, poly_order, target_point, derivative)
        .and_then(|config| run(config, data));
    into_outcome(result)
}

/// [`calc`] on a sequence that may have holes.
///
/// A hole is reported by its 1-based position, as host tables count.
pub fn calc_sparse(
    half_window: i64,
    poly_order: i64,
    target_point: i64,
    derivative: i64,
    samples: &[Option<f64>],
) -> LegacyOutcome {
    let result = legacy_config(half_window, poly_order, target_point, derivative).and_then(|config| {
        let data = collect_samples(samples.iter().copied()).map_err(|e| legacy_message(&e))?;
        run(config, &data)
    });
    into_outcome(result)
}

fn run(config: FilterConfig, data: &[f64]) -> Result<Vec<f64>, String> {
    let mut filter = SavitzkyGolayFilter::new(config).map_err(|e| legacy_message(&e))?;
    let output = filter.apply(data).map_err(|e| legacy_message(&e));
    filter.dispose();
    output
}

fn into_outcome(result: Result<Vec<f64>, String>) -> LegacyOutcome {
    match result {
        Ok(output) => (Some(output), None),
        Err(message) => {
            debug!(error = %message, "legacy calc failed");
            (None, Some(message))
        }
    }
}

/// Checks arguments in the order older callers expect: half-window, polynomial order
/// (sign, then against the window), target point, derivative order, then the remaining
/// ranges `SavitzkyGolayFilter::new` checks.
fn legacy_config(
    half_window: i64,
    poly_order: i64,
    target_point: i64,
    derivative: i64,
) -> Result<FilterConfig, String> {
    if half_window < 1 {
        return Err(legacy_message(&SavitzkyGolayError::InvalidHalfWindow(0)));
    }
    if poly_order < 0 {
        return Err("Polynomial order must be a positive integer.".to_string());
    }
    let half_window = to_usize(half_window)?;
    let poly_order = to_usize(poly_order)?;
    let window_size = FilterConfig::new(half_window, poly_order).window_size();

    if poly_order >= window_size {
        return Err(legacy_message(&SavitzkyGolayError::InvalidPolynomialOrder {
            poly_order,
            window_size,
        }));
    }
    if target_point < 0 || target_point >= i64::try_from(window_size).unwrap_or(i64::MAX) {
        return Err(legacy_message(&SavitzkyGolayError::InvalidTargetPoint {
            target_point: 0,
            max: window_size - 1,
        }));
    }
    if derivative < 0 {
        return Err("Derivative order must be a positive integer.".to_string());
    }

    let config = FilterConfig::new(half_window, poly_order)
        .with_target_point(to_usize(target_point)?)
        .with_derivative(to_usize(derivative)?);
    config.validate().map_err(|e| legacy_message(&e))?;
    Ok(config)
}

fn to_usize(value: i64) -> Result<usize, String> {
    usize::try_from(value).map_err(|_| format!("Argument {} is out of range.", value))
}

/// Historical message for each failure.
fn legacy_message(err: &SavitzkyGolayError) -> String {
    match err {
        SavitzkyGolayError::InvalidHalfWindow(_) => "Half-window size must be greater than 0.".to_string(),
        SavitzkyGolayError::InvalidPolynomialOrder { .. } => {
            "Polynomial order must be less than the filter window size.".to_string()
        }
        SavitzkyGolayError::InvalidTargetPoint { .. } => {
            "Target point must be within the filter window.".to_string()
        }
        SavitzkyGolayError::InsufficientData { .. } => {
            "Filter window size must not exceed data size.".to_string()
        }
        SavitzkyGolayError::MissingSample { index } => {
            format!("Input data has a missing element at position {}.", index + 1)
        }
        SavitzkyGolayError::AllocationFailed { .. } => {
            "Could not allocate memory for rawData and filteredData.".to_string()
        }
        other => other.to_string(),
    }
}
