use thiserror::Error;

/// Errors raised by [`super::Tank`] construction and operation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TankError {
    /// Node count is not a positive multiple of 12.
    #[error("node count {n} is not a positive multiple of 12")]
    NodeCountInvalid { n: usize },

    /// Tank volume was not strictly positive.
    #[error("tank volume must be strictly positive")]
    NonPositiveVolume,

    /// An ambient or fittings conductance was negative.
    #[error("conductance must be nonnegative")]
    NegativeConductance,

    /// A requested draw volume was negative.
    #[error("draw volume {volume} is negative")]
    NegativeDraw { volume: f64 },

    /// A node temperature is NaN or infinite.
    #[error("node {node} temperature is not finite: {value}")]
    NonFiniteTemperature { node: usize, value: f64 },

    /// A node index fell outside `0..n_nodes`.
    #[error("node index {index} is out of range for a {n}-node tank")]
    InvalidNodeIndex { index: usize, n: usize },
}
