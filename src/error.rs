use thiserror::Error;

/// Broad classes of failure, independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A `FilterConfig` field is out of its valid range
    Config,
    /// The sample sequence cannot be filtered
    Input,
    /// A working buffer could not be allocated
    Allocation,
    /// The filter has already been disposed
    UseAfterDestroy,
    /// Numerical failure that validated parameters should never produce
    InternalComputation,
}

/// Error types for Savitzky-Golay filter operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SavitzkyGolayError {
    /// Half-window must be at least 1 and its window size representable
    #[error("Invalid half-window: {0}. Half-window must be at least 1 and 2n + 1 must fit in usize")]
    InvalidHalfWindow(usize),

    /// Polynomial order must be less than window size
    #[error("Invalid polynomial order: {poly_order}. Must be less than window size ({window_size})")]
    InvalidPolynomialOrder { poly_order: usize, window_size: usize },

    /// Target point must lie inside the window
    #[error("Invalid target point: {target_point}. Must be within [0, {max}]")]
    InvalidTargetPoint { target_point: usize, max: usize },

    /// Sample spacing must be positive and finite, and its derivative power representable
    #[error("Invalid time step: {0}. Must be positive and finite, with time_step^derivative a normal float")]
    InvalidTimeStep(f64),

    /// Unknown numeric boundary mode code
    #[error("Invalid boundary mode code: {0}. Expected 0 (polynomial), 1 (reflect), 2 (periodic) or 3 (constant)")]
    InvalidBoundaryCode(u8),

    /// Input data is too short for the filter window
    #[error("Insufficient data: {actual} points. Need at least {required} points for window size {required}")]
    InsufficientData { actual: usize, required: usize },

    /// Input sequence has a hole
    #[error("Missing sample at index {index}")]
    MissingSample { index: usize },

    /// Working buffer allocation failed
    #[error("Could not allocate a working buffer of {requested} samples")]
    AllocationFailed { requested: usize },

    /// Operation on a filter after `dispose`
    #[error("Filter has been disposed")]
    UseAfterDispose,

    /// Mathematical computation error (e.g., singular matrix)
    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl SavitzkyGolayError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SavitzkyGolayError::InvalidHalfWindow(_)
            | SavitzkyGolayError::InvalidPolynomialOrder { .. }
            | SavitzkyGolayError::InvalidTargetPoint { .. }
            | SavitzkyGolayError::InvalidTimeStep(_)
            | SavitzkyGolayError::InvalidBoundaryCode(_) => ErrorKind::Config,
            SavitzkyGolayError::InsufficientData { .. } | SavitzkyGolayError::MissingSample { .. } => {
                ErrorKind::Input
            }
            SavitzkyGolayError::AllocationFailed { .. } => ErrorKind::Allocation,
            SavitzkyGolayError::UseAfterDispose => ErrorKind::UseAfterDestroy,
            SavitzkyGolayError::ComputationError(_) => ErrorKind::InternalComputation,
        }
    }

    /// Name of the offending `FilterConfig` field, for configuration errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SavitzkyGolayError::InvalidHalfWindow(_) => Some("half_window"),
            SavitzkyGolayError::InvalidPolynomialOrder { .. } => Some("poly_order"),
            SavitzkyGolayError::InvalidTargetPoint { .. } => Some("target_point"),
            SavitzkyGolayError::InvalidTimeStep(_) => Some("time_step"),
            SavitzkyGolayError::InvalidBoundaryCode(_) => Some("boundary_mode"),
            _ => None,
        }
    }
}

/// Result type for Savitzky-Golay operations
pub type Result<T> = std::result::Result<T, SavitzkyGolayError>;
