//! # Savitzky-Golay Filter
//!
//! Savitzky-Golay smoothing and numerical differentiation of finite sample sequences.
//!
//! For every output position the filter fits a polynomial by least squares to a window of
//! `2n + 1` samples and evaluates the polynomial, or one of its derivatives, at a chosen
//! point of the window. The fit reduces to a fixed convolution kernel that is derived once
//! per filter.
//!
//! ## Features
//!
//! - Kernels for any half-window, polynomial order, target point, derivative order and
//!   sample spacing
//! - Same-length output with four edge policies: polynomial refit, reflect, periodic and
//!   constant
//! - Interior-only output with no edge policy
//! - Explicit filter lifecycle: use after `dispose` is reported, never undefined
//! - A one-shot `calc` entry point with string errors for older call sites
//!
//! ## Example
//!
//! ```rust
//! use savgol_filter::{BoundaryMode, FilterConfig, SavitzkyGolayFilter};
//!
//! let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
//! let config = FilterConfig::new(2, 2).with_boundary_mode(BoundaryMode::Reflect);
//! let filter = SavitzkyGolayFilter::new(config).expect("Invalid parameters");
//! let smoothed = filter.apply(&data).unwrap();
//! let interior = filter.apply_valid(&data).unwrap();
//! assert_eq!(smoothed.len(), 9);
//! assert_eq!(interior.len(), 5);
//! ```

mod boundary;
mod coefficients;
mod error;
mod filter;
mod input;
pub mod legacy;

pub use boundary::BoundaryMode;
pub use coefficients::{derive_kernel, validate_parameters, Kernel};
pub use error::{ErrorKind, Result, SavitzkyGolayError};
pub use filter::{FilterConfig, SavitzkyGolayFilter};
pub use input::collect_samples;
pub use legacy::calc;

/// Library name and version, as reported to host bindings.
pub const VERSION: &str = concat!("savgol-filter ", env!("CARGO_PKG_VERSION"));
