use nalgebra::{DMatrix, DVector};

use crate::coefficients::{falling_factorial, weighted_sum};
use crate::error::{Result, SavitzkyGolayError};
use crate::filter::{allocate, FilterConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Boundary handling strategies for the first and last `half_window` outputs.
///
/// The numeric codes are stable and shared with host bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum BoundaryMode {
    /// Refit the polynomial over the nearest full window and evaluate it at the edge point
    #[default]
    Polynomial = 0,
    /// Mirror around the first/last sample, without repeating the edge sample
    Reflect = 1,
    /// Treat the sequence as circular
    Periodic = 2,
    /// Repeat the first/last sample
    Constant = 3,
}

impl BoundaryMode {
    /// All modes, in code order.
    pub const ALL: [BoundaryMode; 4] = [
        BoundaryMode::Polynomial,
        BoundaryMode::Reflect,
        BoundaryMode::Periodic,
        BoundaryMode::Constant,
    ];

    /// Stable numeric code of this mode.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for BoundaryMode {
    type Error = SavitzkyGolayError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(BoundaryMode::Polynomial),
            1 => Ok(BoundaryMode::Reflect),
            2 => Ok(BoundaryMode::Periodic),
            3 => Ok(BoundaryMode::Constant),
            other => Err(SavitzkyGolayError::InvalidBoundaryCode(other)),
        }
    }
}

impl From<BoundaryMode> for u8 {
    fn from(mode: BoundaryMode) -> Self {
        mode.code()
    }
}

/// Produces the first and last `n` outputs, where the full window is not in bounds.
#[derive(Debug, Clone)]
pub(crate) enum BoundaryHandler {
    Polynomial(EdgeFit),
    Extend(Extension),
}

impl BoundaryHandler {
    /// Builds the handler for an already validated configuration.
    pub(crate) fn new(config: &FilterConfig) -> Result<Self> {
        match config.boundary_mode {
            BoundaryMode::Polynomial => EdgeFit::new(config).map(BoundaryHandler::Polynomial),
            BoundaryMode::Reflect => Ok(BoundaryHandler::Extend(Extension::Reflect)),
            BoundaryMode::Periodic => Ok(BoundaryHandler::Extend(Extension::Periodic)),
            BoundaryMode::Constant => Ok(BoundaryHandler::Extend(Extension::Constant)),
        }
    }

    /// Leading outputs `0..n` and trailing outputs `len - n..len`.
    ///
    /// Callers guarantee `data.len() >= kernel.len()`.
    pub(crate) fn edges(&self, kernel: &[f64], data: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let len = data.len();
        let window_size = kernel.len();
        let n = window_size / 2;

        let mut leading = allocate(n)?;
        let mut trailing = allocate(n)?;
        match self {
            BoundaryHandler::Polynomial(fit) => {
                fit.evaluate_edge(&data[..window_size], Edge::Leading, &mut leading)?;
                fit.evaluate_edge(&data[len - window_size..], Edge::Trailing, &mut trailing)?;
            }
            BoundaryHandler::Extend(extension) => {
                leading.extend((0..n).map(|i| extension.convolve_at(kernel, data, i)));
                trailing.extend((len - n..len).map(|i| extension.convolve_at(kernel, data, i)));
            }
        }

        Ok((leading, trailing))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Leading,
    Trailing,
}

/// Least-squares polynomial fit over the first or last full window.
///
/// Only the normal matrix `AᵀA` over the scaled window abscissae is kept, so memory
/// does not grow with the window. Each `apply` fits the polynomial once per edge and
/// evaluates it at the `n` edge abscissae.
#[derive(Debug, Clone)]
pub(crate) struct EdgeFit {
    normal: DMatrix<f64>,
    half_window: usize,
    target_point: usize,
    poly_order: usize,
    derivative: usize,
    time_step: f64,
}

impl EdgeFit {
    fn new(config: &FilterConfig) -> Result<Self> {
        let n = config.half_window;
        let m = config.poly_order;
        let span = n as f64;

        // Power sums: normal[(a, b)] = Σ x^(a + b)
        let mut normal = DMatrix::<f64>::zeros(m + 1, m + 1);
        let mut powers = vec![0.0; 2 * m + 1];
        for k in 0..=2 * n {
            let x = (k as f64 - span) / span;
            let mut p = 1.0;
            for power in powers.iter_mut() {
                *power = p;
                p *= x;
            }
            for a in 0..=m {
                for b in 0..=m {
                    normal[(a, b)] += powers[a + b];
                }
            }
        }

        if !normal.clone().lu().is_invertible() {
            return Err(SavitzkyGolayError::ComputationError(
                "Edge fit normal matrix is singular".to_string(),
            ));
        }

        Ok(Self {
            normal,
            half_window: n,
            target_point: config.target_point,
            poly_order: m,
            derivative: config.derivative_order,
            time_step: config.time_step,
        })
    }

    /// Fits `window` and pushes the `n` edge outputs onto `out`.
    ///
    /// Output `i` estimates the signal at abscissa `i + (t - n)`. Relative to the
    /// window centre that is `j + t - 2n` for leading position `j` and
    /// `j + t - n + 1` for trailing position `j`.
    fn evaluate_edge(&self, window: &[f64], edge: Edge, out: &mut Vec<f64>) -> Result<()> {
        let n = self.half_window as f64;
        let t = self.target_point as f64;
        let first = match edge {
            Edge::Leading => t - 2.0 * n,
            Edge::Trailing => t - n + 1.0,
        };

        if self.derivative > self.poly_order {
            out.extend((0..self.half_window).map(|_| 0.0));
            return Ok(());
        }

        // Aᵀy over the scaled abscissae
        let mut rhs = DVector::<f64>::zeros(self.poly_order + 1);
        for (k, &y) in window.iter().enumerate() {
            let x = (k as f64 - n) / n;
            let mut p = 1.0;
            for j in 0..=self.poly_order {
                rhs[j] += p * y;
                p *= x;
            }
        }

        let coefficients = self.normal.clone().lu().solve(&rhs).ok_or_else(|| {
            SavitzkyGolayError::ComputationError("Failed to fit edge polynomial".to_string())
        })?;

        let span_scale = n.powi(self.derivative as i32);
        let step_scale = self.time_step.powi(self.derivative as i32);
        for j in 0..self.half_window {
            let at = (first + j as f64) / n;
            let value = self.derivative_at(&coefficients, at);
            out.push(value / span_scale / step_scale);
        }

        Ok(())
    }

    /// `derivative`-th derivative of `Σ c[j] x^j` at `x`.
    fn derivative_at(&self, coefficients: &DVector<f64>, x: f64) -> f64 {
        let d = self.derivative;
        let mut value = 0.0;
        let mut p = 1.0;
        for j in d..=self.poly_order {
            value += coefficients[j] * falling_factorial(j, d) * p;
            p *= x;
        }
        value
    }
}

/// Edge modes that convolve the kernel over virtual samples past either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extension {
    Reflect,
    Periodic,
    Constant,
}

impl Extension {
    /// Kernel applied to the window centred on edge index `i`.
    fn convolve_at(self, kernel: &[f64], data: &[f64], i: usize) -> f64 {
        let start = i as isize - (kernel.len() / 2) as isize;
        weighted_sum(
            kernel,
            (0..kernel.len() as isize).map(|k| self.sample(data, start + k)),
        )
    }

    /// Sample at a possibly out-of-range index.
    ///
    /// Out-of-range indices are at most `n` past either end and `n <= len - 1`,
    /// so every mirrored or clamped index stays inside `data`.
    fn sample(self, data: &[f64], idx: isize) -> f64 {
        let len = data.len() as isize;
        if (0..len).contains(&idx) {
            return data[idx as usize];
        }

        match self {
            Extension::Reflect => {
                if idx < 0 {
                    data[(-idx) as usize]
                } else {
                    data[(2 * (len - 1) - idx) as usize]
                }
            }
            Extension::Periodic => data[idx.rem_euclid(len) as usize],
            Extension::Constant => {
                if idx < 0 {
                    data[0]
                } else {
                    data[data.len() - 1]
                }
            }
        }
    }
}
