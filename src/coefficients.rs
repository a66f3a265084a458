use nalgebra::{DMatrix, DVector};
use crate::error::{Result, SavitzkyGolayError};

/// Convolution kernel of a Savitzky-Golay filter.
///
/// Holds `2n + 1` coefficients ordered by window offset `-n..=n`. Convolving the kernel
/// with a window of samples yields the requested derivative at the target point,
/// already scaled by the sample spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    coefficients: Vec<f64>,
}

impl Kernel {
    /// The coefficients, ordered by window offset.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of coefficients (the window size).
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Always false for a kernel produced by [`derive_kernel`].
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Samples taken on each side of the evaluation point.
    pub fn half_window(&self) -> usize {
        self.coefficients.len() / 2
    }
}

impl AsRef<[f64]> for Kernel {
    fn as_ref(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Checks the filter parameters against their valid ranges.
///
/// Fails on the first offending field: `half_window`, then `poly_order`,
/// `target_point` and `time_step`. A derivative is divided by `time_step^derivative`,
/// so a spacing whose power is not a normal float is rejected as well.
pub fn validate_parameters(
    half_window: usize,
    poly_order: usize,
    target_point: usize,
    derivative: usize,
    time_step: f64,
) -> Result<()> {
    let window_size = half_window
        .checked_mul(2)
        .and_then(|w| w.checked_add(1))
        .filter(|_| half_window >= 1)
        .ok_or(SavitzkyGolayError::InvalidHalfWindow(half_window))?;

    if poly_order >= window_size {
        return Err(SavitzkyGolayError::InvalidPolynomialOrder { poly_order, window_size });
    }

    if target_point >= window_size {
        return Err(SavitzkyGolayError::InvalidTargetPoint {
            target_point,
            max: window_size - 1,
        });
    }

    // Written as a negated comparison so NaN is rejected too
    if !(time_step > 0.0) || !time_step.is_finite() {
        return Err(SavitzkyGolayError::InvalidTimeStep(time_step));
    }

    // Derivatives above the polynomial order give a zero kernel and are never scaled
    if derivative > 0
        && derivative <= poly_order
        && !derivative_scale(time_step, derivative).is_normal()
    {
        return Err(SavitzkyGolayError::InvalidTimeStep(time_step));
    }

    Ok(())
}

/// `time_step^derivative`; zero when the exponent does not fit `powi`.
fn derivative_scale(time_step: f64, derivative: usize) -> f64 {
    i32::try_from(derivative).map_or(0.0, |d| time_step.powi(d))
}

/// Derives the Savitzky-Golay convolution kernel.
///
/// A polynomial of degree `poly_order` is fitted by least squares to the `2n + 1`
/// samples at integer offsets `-n..=n`; the kernel evaluates the `derivative`-th
/// derivative of that polynomial at window index `target_point` (offset
/// `target_point - n`), divided by `time_step^derivative`.
///
/// # Arguments
///
/// * `half_window` - Samples on each side of the centre (n ≥ 1)
/// * `poly_order` - Degree of the fitted polynomial (must be < 2n + 1)
/// * `target_point` - Window index at which the fit is evaluated, in `[0, 2n]`
/// * `derivative` - Order of derivative to compute (0 for smoothing)
/// * `time_step` - Sample spacing (must be > 0)
///
/// # Returns
///
/// The kernel, or a configuration error naming the offending field
///
/// # Example
///
/// ```rust
/// use savgol_filter::derive_kernel;
///
/// let kernel = derive_kernel(2, 2, 2, 0, 1.0).unwrap();
/// assert_eq!(kernel.len(), 5);
/// ```
pub fn derive_kernel(
    half_window: usize,
    poly_order: usize,
    target_point: usize,
    derivative: usize,
    time_step: f64,
) -> Result<Kernel> {
    validate_parameters(half_window, poly_order, target_point, derivative, time_step)?;

    let offsets = centred_offsets(half_window);
    let at = target_point as f64 - half_window as f64;
    let coefficients = compute_weights(&offsets, at, poly_order, derivative, time_step)?;

    Ok(Kernel { coefficients })
}

/// Integer window offsets `-n..=n` as abscissae.
pub(crate) fn centred_offsets(half_window: usize) -> Vec<f64> {
    let n = half_window as f64;
    (0..=2 * half_window).map(|i| i as f64 - n).collect()
}

/// Least-squares weights for arbitrary sample abscissae.
///
/// Returns `w` such that `Σ w[i] * y[i]` is the `derivative`-th derivative, at `at`,
/// of the degree-`poly_order` polynomial fitted to the points `(offsets[i], y[i])`,
/// divided by `time_step^derivative`.
pub(crate) fn compute_weights(
    offsets: &[f64],
    at: f64,
    poly_order: usize,
    derivative: usize,
    time_step: f64,
) -> Result<Vec<f64>> {
    let num_points = offsets.len();
    if poly_order >= num_points {
        return Err(SavitzkyGolayError::InvalidPolynomialOrder {
            poly_order,
            window_size: num_points,
        });
    }

    // Derivative order higher than polynomial order results in zero
    if derivative > poly_order {
        return Ok(vec![0.0; num_points]);
    }

    // Abscissae are scaled into [-1, 1] to keep the normal matrix well conditioned
    let span = offsets.iter().fold(1.0_f64, |acc, x| acc.max(x.abs()));
    let at = at / span;

    // Vandermonde matrix: one row per sample, one column per polynomial power
    let mut vandermonde = DMatrix::<f64>::zeros(num_points, poly_order + 1);
    for (i, &x) in offsets.iter().enumerate() {
        let x = x / span;
        for j in 0..=poly_order {
            vandermonde[(i, j)] = x.powi(j as i32);
        }
    }

    // d-th derivative of each monomial x^j evaluated at `at`
    let mut rhs = DVector::<f64>::zeros(poly_order + 1);
    for j in derivative..=poly_order {
        rhs[j] = falling_factorial(j, derivative) * at.powi((j - derivative) as i32);
    }

    // (A^T A) z = rhs, then w = A z
    let ata = vandermonde.transpose() * &vandermonde;
    let solution = ata.lu().solve(&rhs).ok_or_else(|| {
        SavitzkyGolayError::ComputationError(
            "Failed to solve least squares system: normal matrix is singular".to_string(),
        )
    })?;

    // Undo the abscissa scaling and the spacing separately; their product can underflow
    let span_scale = span.powi(derivative as i32);
    let step_scale = derivative_scale(time_step, derivative);
    let weights: Vec<f64> = (&vandermonde * solution)
        .iter()
        .map(|w| w / span_scale / step_scale)
        .collect();

    if weights.iter().any(|w| !w.is_finite()) {
        if derivative > 0 {
            return Err(SavitzkyGolayError::InvalidTimeStep(time_step));
        }
        return Err(SavitzkyGolayError::ComputationError(format!(
            "Non-finite filter weight for poly_order {} derivative {}",
            poly_order, derivative
        )));
    }

    Ok(weights)
}

/// `Σ weights[k] * values[k]`, accumulated in window order.
///
/// Every kernel convolution goes through here, so interior values from `apply` and
/// `apply_valid` agree bit for bit, as do the extended edges.
pub(crate) fn weighted_sum<I: IntoIterator<Item = f64>>(weights: &[f64], values: I) -> f64 {
    let mut sum = 0.0;
    for (&w, v) in weights.iter().zip(values) {
        sum += w * v;
    }
    sum
}

/// `j! / (j - d)!`
pub(crate) fn falling_factorial(j: usize, d: usize) -> f64 {
    ((j - d + 1)..=j).fold(1.0, |acc, x| acc * x as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_kernel(kernel: &Kernel, expected: &[f64]) {
        assert_eq!(kernel.len(), expected.len());
        for (actual, expected) in kernel.coefficients().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_5_point_quadratic_smoothing() {
        let kernel = derive_kernel(2, 2, 2, 0, 1.0).unwrap();
        // Known coefficients for 5-point quadratic smoothing
        let expected: Vec<f64> = [-3.0, 12.0, 17.0, 12.0, -3.0].iter().map(|c| c / 35.0).collect();
        assert_kernel(&kernel, &expected);
    }

    #[test]
    fn test_7_point_quadratic_smoothing() {
        let kernel = derive_kernel(3, 2, 3, 0, 1.0).unwrap();
        let expected: Vec<f64> = [-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0].iter().map(|c| c / 21.0).collect();
        assert_kernel(&kernel, &expected);
    }

    #[test]
    fn test_first_derivative() {
        let kernel = derive_kernel(2, 2, 2, 1, 1.0).unwrap();
        let expected: Vec<f64> = [-2.0, -1.0, 0.0, 1.0, 2.0].iter().map(|c| c / 10.0).collect();
        assert_kernel(&kernel, &expected);
    }

    #[test]
    fn test_second_derivative_includes_factorial() {
        let kernel = derive_kernel(2, 2, 2, 2, 1.0).unwrap();
        let expected: Vec<f64> = [2.0, -1.0, -2.0, -1.0, 2.0].iter().map(|c| c / 7.0).collect();
        assert_kernel(&kernel, &expected);
    }

    #[test]
    fn test_time_step_scaling() {
        let unit = derive_kernel(3, 3, 3, 1, 1.0).unwrap();
        let half = derive_kernel(3, 3, 3, 1, 0.5).unwrap();
        for (u, h) in unit.coefficients().iter().zip(half.coefficients()) {
            assert_abs_diff_eq!(*h, 2.0 * u, epsilon = 1e-12);
        }

        let unit = derive_kernel(3, 3, 3, 2, 1.0).unwrap();
        let tenth = derive_kernel(3, 3, 3, 2, 0.1).unwrap();
        for (u, t) in unit.coefficients().iter().zip(tenth.coefficients()) {
            assert_abs_diff_eq!(*t, 100.0 * u, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_off_centre_target_point() {
        // Linear fit over offsets -2..=2 evaluated at offset +2
        let kernel = derive_kernel(2, 1, 4, 0, 1.0).unwrap();
        assert_kernel(&kernel, &[-0.2, 0.0, 0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_smoothing_kernel_is_symmetric_and_normalised() {
        let kernel = derive_kernel(5, 3, 5, 0, 1.0).unwrap();
        let c = kernel.coefficients();
        for k in 0..kernel.len() {
            assert_abs_diff_eq!(c[k], c[kernel.len() - 1 - k], epsilon = 1e-12);
        }
        assert_abs_diff_eq!(c.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_above_order_is_zero() {
        let kernel = derive_kernel(2, 1, 2, 2, 1.0).unwrap();
        assert!(kernel.coefficients().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let a = derive_kernel(6, 4, 1, 2, 0.25).unwrap();
        let b = derive_kernel(6, 4, 1, 2, 0.25).unwrap();
        let a_bits: Vec<u64> = a.coefficients().iter().map(|c| c.to_bits()).collect();
        let b_bits: Vec<u64> = b.coefficients().iter().map(|c| c.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            derive_kernel(0, 0, 0, 0, 1.0),
            Err(SavitzkyGolayError::InvalidHalfWindow(0))
        );
        assert_eq!(
            derive_kernel(1, 3, 1, 0, 1.0),
            Err(SavitzkyGolayError::InvalidPolynomialOrder { poly_order: 3, window_size: 3 })
        );
        assert_eq!(
            derive_kernel(2, 2, 5, 0, 1.0),
            Err(SavitzkyGolayError::InvalidTargetPoint { target_point: 5, max: 4 })
        );
        assert!(matches!(
            derive_kernel(2, 2, 2, 0, 0.0),
            Err(SavitzkyGolayError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            derive_kernel(2, 2, 2, 0, -1.0),
            Err(SavitzkyGolayError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            derive_kernel(2, 2, 2, 0, f64::NAN),
            Err(SavitzkyGolayError::InvalidTimeStep(_))
        ));
        assert_eq!(
            validate_parameters(usize::MAX, 0, 0, 0, 1.0),
            Err(SavitzkyGolayError::InvalidHalfWindow(usize::MAX))
        );
    }

    #[test]
    fn test_tiny_time_step() {
        // dt^2 = 1e-340 is not representable
        assert_eq!(
            derive_kernel(2, 2, 2, 2, 1e-170),
            Err(SavitzkyGolayError::InvalidTimeStep(1e-170))
        );

        // dt^1 is, and the weights scale accordingly
        let kernel = derive_kernel(2, 2, 2, 1, 1e-170).unwrap();
        assert!(kernel.coefficients().iter().all(|c| c.is_finite()));
        assert_abs_diff_eq!(kernel.coefficients()[4] * 1e-170, 0.2, epsilon = 1e-12);

        let kernel = derive_kernel(2, 2, 2, 2, 1e-150).unwrap();
        assert_abs_diff_eq!(kernel.coefficients()[0] * 1e-300, 2.0 / 7.0, epsilon = 1e-12);

        // Smoothing and derivatives above the order ignore the spacing
        assert!(derive_kernel(2, 2, 2, 0, 1e-300).is_ok());
        assert!(derive_kernel(2, 1, 2, 2, 1e-300).is_ok());

        // Huge spacings overflow the other way
        assert_eq!(
            derive_kernel(2, 2, 2, 2, 1e200),
            Err(SavitzkyGolayError::InvalidTimeStep(1e200))
        );
    }

    #[test]
    fn test_weights_for_one_sided_offsets() {
        // Quadratic data is reproduced exactly at any abscissa, including outside the samples
        let offsets: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let data: Vec<f64> = offsets.iter().map(|x| 1.0 + 2.0 * x - 0.5 * x * x).collect();
        for at in [-1.0, 0.0, 0.5, 4.0] {
            let w = compute_weights(&offsets, at, 2, 0, 1.0).unwrap();
            let value: f64 = w.iter().zip(&data).map(|(w, y)| w * y).sum();
            assert_abs_diff_eq!(value, 1.0 + 2.0 * at - 0.5 * at * at, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_falling_factorial() {
        assert_eq!(falling_factorial(4, 0), 1.0);
        assert_eq!(falling_factorial(4, 2), 12.0);
        assert_eq!(falling_factorial(3, 3), 6.0);
    }
}
