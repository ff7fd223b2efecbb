use thiserror::Error;

use crate::heating_logic::HeatingLogicError;
use crate::performance_map::MapError;

/// Errors raised constructing or evaluating a heat source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Condensity entries were negative or summed to zero.
    #[error("condensity must have nonnegative entries summing to more than zero (got sum {sum})")]
    InvalidCondensity { sum: f64 },

    /// A configuration named a node index outside the tank.
    #[error("node index {index} is out of range")]
    NodeOutOfRange { index: usize },

    /// A setpoint exceeded this source family's physical maximum.
    #[error("setpoint {setpoint} exceeds this source's maximum of {max}")]
    SetpointAboveMax { setpoint: f64, max: f64 },

    /// A multipass external condenser had a nonpositive flow rate.
    #[error("multipass flow rate must be strictly positive")]
    NonPositiveFlowRate,

    #[error(transparent)]
    Logic(#[from] HeatingLogicError),

    #[error(transparent)]
    Map(#[from] MapError),
}
