use thiserror::Error;

/// Errors raised constructing or evaluating a [`super::PerformanceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MapError {
    /// An axis had fewer than two breakpoints.
    #[error("axis must have at least two breakpoints")]
    AxisTooShort,

    /// Axis breakpoints were not strictly increasing.
    #[error("axis breakpoints must be strictly increasing")]
    AxisNotMonotonic,

    /// A grid's row/column counts did not match its axes' lengths.
    #[error("grid dimensions do not match its axes")]
    DimensionMismatch,

    /// A 3-axis (external) map was evaluated without an outlet temperature.
    #[error("a 3-axis evaluation requires an outlet temperature")]
    MissingOutletAxis,

    /// A legacy polynomial map had no breakpoints.
    #[error("polynomial map must have at least one breakpoint")]
    EmptyPolynomial,
}
