use thiserror::Error;

use crate::engine::StepError;

/// Errors raised running a rating or efficiency test procedure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Step(#[from] StepError),

    /// A test schedule was empty.
    #[error("a test schedule needs at least one step")]
    EmptySchedule,
}
