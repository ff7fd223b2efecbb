//! Crate-level error type.
//!
//! Each subsystem defines its own focused error enum (see
//! [`crate::tank::TankError`], [`crate::performance_map::MapError`],
//! [`crate::heat_source::ConfigError`], and [`crate::engine::StepError`]).
//! [`Error`] composes them for callers that want a single type to propagate
//! with `?`.

use thiserror::Error;

use crate::{engine::StepError, heat_source::ConfigError, performance_map::MapError, tank::TankError};

/// Top-level error for the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Tank(#[from] TankError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Step(#[from] StepError),
}
