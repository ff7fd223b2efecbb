use thiserror::Error;

/// Errors raised constructing or evaluating a [`super::HeatingLogic`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HeatingLogicError {
    /// A weighted term named a node index outside the tank.
    #[error("node index {index} is out of range")]
    NodeOutOfRange { index: usize },

    /// A temperature-based logic had no weighted terms.
    #[error("a weighted average needs at least one term")]
    EmptyWeights,

    /// A state-of-charge logic's minimum useful temperature was at or below
    /// its cold-water reference.
    #[error("minimum useful temperature must exceed the mains temperature")]
    MinUsefulBelowMains,
}
