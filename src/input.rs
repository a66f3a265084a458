//! Conversion of host-side sample containers into dense sequences.
//!
//! Hosts such as scripting bindings hand over tables that may have holes. The
//! filter only accepts dense `&[f64]`, so holes are rejected here before any
//! filtering starts.

use crate::error::{Result, SavitzkyGolayError};

/// Collects optional samples into a dense vector.
///
/// Fails with [`SavitzkyGolayError::MissingSample`] at the first `None`.
///
/// # Example
///
/// ```rust
/// use savgol_filter::collect_samples;
///
/// let dense = collect_samples(vec![Some(1.0), Some(2.0)]).unwrap();
/// assert_eq!(dense, vec![1.0, 2.0]);
/// assert!(collect_samples(vec![Some(1.0), None]).is_err());
/// ```
pub fn collect_samples<I>(samples: I) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let samples = samples.into_iter();
    let mut dense = Vec::new();
    dense
        .try_reserve_exact(samples.size_hint().0)
        .map_err(|_| SavitzkyGolayError::AllocationFailed {
            requested: samples.size_hint().0,
        })?;

    for (index, sample) in samples.enumerate() {
        match sample {
            Some(value) => dense.push(value),
            None => return Err(SavitzkyGolayError::MissingSample { index }),
        }
    }

    Ok(dense)
}
