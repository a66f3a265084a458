use tracing::{debug, trace};

use crate::boundary::{BoundaryHandler, BoundaryMode};
use crate::coefficients::{derive_kernel, validate_parameters, weighted_sum, Kernel};
use crate::error::{Result, SavitzkyGolayError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Savitzky-Golay filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    /// Samples on each side of the evaluation point; window size is `2n + 1`
    pub half_window: usize,
    /// Order of the polynomial to fit
    pub poly_order: usize,
    /// Window index at which the fit is evaluated, in `[0, 2n]`
    pub target_point: usize,
    /// Derivative to report (0 = smoothed value)
    #[cfg_attr(feature = "serde", serde(default))]
    pub derivative_order: usize,
    /// Sample spacing
    #[cfg_attr(feature = "serde", serde(default = "default_time_step"))]
    pub time_step: f64,
    /// Boundary handling strategy
    #[cfg_attr(feature = "serde", serde(default))]
    pub boundary_mode: BoundaryMode,
}

#[cfg(feature = "serde")]
fn default_time_step() -> f64 {
    1.0
}

impl FilterConfig {
    /// Creates a centred smoothing configuration.
    ///
    /// The target point defaults to the window centre, derivative order to 0,
    /// time step to 1.0 and boundary mode to [`BoundaryMode::Polynomial`].
    /// Nothing is validated until the filter is built.
    pub fn new(half_window: usize, poly_order: usize) -> Self {
        Self {
            half_window,
            poly_order,
            target_point: half_window,
            derivative_order: 0,
            time_step: 1.0,
            boundary_mode: BoundaryMode::Polynomial,
        }
    }

    /// Sets the window index at which the fit is evaluated
    pub fn with_target_point(mut self, target_point: usize) -> Self {
        self.target_point = target_point;
        self
    }

    /// Sets the derivative order
    pub fn with_derivative(mut self, derivative_order: usize) -> Self {
        self.derivative_order = derivative_order;
        self
    }

    /// Sets the sample spacing used to scale derivatives
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Sets the boundary handling mode
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary_mode = mode;
        self
    }

    /// Window size, `2n + 1`.
    pub fn window_size(&self) -> usize {
        self.half_window.saturating_mul(2).saturating_add(1)
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        validate_parameters(
            self.half_window,
            self.poly_order,
            self.target_point,
            self.derivative_order,
            self.time_step,
        )
    }
}

impl Default for FilterConfig {
    /// 5-point quadratic smoothing
    fn default() -> Self {
        Self::new(2, 2)
    }
}

/// Kernel and edge strategy; dropped on dispose.
#[derive(Debug)]
struct FilterState {
    kernel: Kernel,
    boundary: BoundaryHandler,
}

/// A Savitzky-Golay filter for signal smoothing and differentiation.
///
/// The kernel is derived once at construction. `apply` and `apply_valid` only read
/// the filter, so a shared reference may be used from several threads. After
/// [`dispose`](Self::dispose) every filtering call fails with
/// [`SavitzkyGolayError::UseAfterDispose`].
#[derive(Debug)]
pub struct SavitzkyGolayFilter {
    config: FilterConfig,
    state: Option<FilterState>,
}

impl SavitzkyGolayFilter {
    /// Creates a new Savitzky-Golay filter from the given configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use savgol_filter::{FilterConfig, SavitzkyGolayFilter};
    ///
    /// let filter = SavitzkyGolayFilter::new(FilterConfig::new(2, 2)).expect("Valid parameters");
    /// assert_eq!(filter.window_size(), 5);
    /// ```
    pub fn new(config: FilterConfig) -> Result<Self> {
        let kernel = derive_kernel(
            config.half_window,
            config.poly_order,
            config.target_point,
            config.derivative_order,
            config.time_step,
        )?;
        let boundary = BoundaryHandler::new(&config)?;

        debug!(
            half_window = config.half_window,
            poly_order = config.poly_order,
            target_point = config.target_point,
            derivative_order = config.derivative_order,
            time_step = config.time_step,
            boundary_mode = ?config.boundary_mode,
            "created Savitzky-Golay filter"
        );

        Ok(Self {
            config,
            state: Some(FilterState { kernel, boundary }),
        })
    }

    /// Applies the filter, producing one output per input sample.
    ///
    /// Interior outputs are the direct convolution of the kernel with the window
    /// centred on each sample; the first and last `n` outputs come from the
    /// configured boundary mode.
    ///
    /// # Example
    ///
    /// ```rust
    /// use savgol_filter::{FilterConfig, SavitzkyGolayFilter};
    ///
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
    /// let filter = SavitzkyGolayFilter::new(FilterConfig::new(2, 2)).expect("Valid parameters");
    /// let smoothed = filter.apply(&data).unwrap();
    /// assert_eq!(smoothed.len(), data.len());
    /// ```
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        let state = self.state()?;
        self.check_length(data)?;

        let len = data.len();
        let n = self.config.half_window;
        let kernel = state.kernel.coefficients();
        trace!(len, boundary_mode = ?self.config.boundary_mode, "applying filter");

        let (leading, trailing) = state.boundary.edges(kernel, data)?;
        let mut output = allocate(len)?;
        output.extend_from_slice(&leading);
        for i in n..len - n {
            output.push(convolve_at(kernel, data, i));
        }
        output.extend_from_slice(&trailing);

        Ok(output)
    }

    /// Applies the filter to interior samples only.
    ///
    /// Returns `len - 2n` values; output `j` corresponds to input index `j + n`.
    /// No boundary mode is involved. Input exactly one window long yields a single
    /// value, the kernel applied to that window.
    pub fn apply_valid(&self, data: &[f64]) -> Result<Vec<f64>> {
        let state = self.state()?;
        self.check_length(data)?;

        let len = data.len();
        let n = self.config.half_window;
        let kernel = state.kernel.coefficients();
        trace!(len, "applying filter to interior samples");

        let mut output = allocate(len - 2 * n)?;
        for i in n..len - n {
            output.push(convolve_at(kernel, data, i));
        }

        Ok(output)
    }

    /// Releases the kernel. Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if self.state.take().is_some() {
            debug!("disposed Savitzky-Golay filter");
        } else {
            trace!("dispose called on an already disposed filter");
        }
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    /// The convolution kernel
    pub fn kernel(&self) -> Result<&Kernel> {
        self.state().map(|state| &state.kernel)
    }

    /// Returns the filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Window size, `2n + 1`.
    pub fn window_size(&self) -> usize {
        self.config.window_size()
    }

    fn state(&self) -> Result<&FilterState> {
        self.state.as_ref().ok_or(SavitzkyGolayError::UseAfterDispose)
    }

    fn check_length(&self, data: &[f64]) -> Result<()> {
        let required = self.window_size();
        if data.len() < required {
            return Err(SavitzkyGolayError::InsufficientData {
                actual: data.len(),
                required,
            });
        }
        Ok(())
    }
}

/// Direct convolution at an interior index.
fn convolve_at(kernel: &[f64], data: &[f64], center: usize) -> f64 {
    let n = kernel.len() / 2;
    weighted_sum(kernel, data[center - n..=center + n].iter().copied())
}

/// Empty output buffer with room for `len` samples.
pub(crate) fn allocate(len: usize) -> Result<Vec<f64>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| SavitzkyGolayError::AllocationFailed { requested: len })?;
    Ok(buffer)
}
