use thiserror::Error;

use crate::heat_source::ConfigError;
use crate::tank::TankError;

/// Errors raised running one engine step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    /// A heat source index referenced by a backup/companion/follower link,
    /// or by [`crate::engine::EngineConfig`], does not exist.
    #[error("heat source index {index} is out of range (have {n} sources)")]
    SourceIndexOutOfRange { index: usize, n: usize },

    /// The step's energy balance didn't close within tolerance: a
    /// programming error in dispatch or a tank/heat-source accounting bug,
    /// never a condition a caller can recover from by retrying.
    #[error(
        "energy balance failed: expected {expected_kj} kJ added, tank gained {actual_kj} kJ \
         (tolerance {tolerance_kj} kJ)"
    )]
    EnergyImbalance {
        expected_kj: f64,
        actual_kj: f64,
        tolerance_kj: f64,
    },

    #[error(transparent)]
    Tank(#[from] TankError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
