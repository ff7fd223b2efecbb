//! Weighted-region temperature and state-of-charge turn-on/shut-off logic.
//!
//! A [`HeatingLogic`] is a tagged variant over [`TemperatureLogic`] and
//! [`StateOfChargeLogic`], each exposing a pure `evaluate(context)` method.
//! [`Comparator`] is a plain enum rather than a function pointer so
//! configurations remain comparable and (with the `serde` feature)
//! serializable.

mod error;
mod state_of_charge;
mod temperature;

pub use error::HeatingLogicError;
pub use state_of_charge::StateOfChargeLogic;
pub use temperature::{NodeTerm, NodeWeight, TemperatureLogic};

/// Comparison applied between a computed value and a logic's decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Less,
    Greater,
}

/// Tank and schedule state a [`HeatingLogic`] evaluates against.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub node_temps_c: &'a [f64],
    pub inlet_temp_c: f64,
    pub setpoint_c: f64,
}

/// A turn-on or shut-off predicate: temperature-based or
/// state-of-charge-based.
#[derive(Debug, Clone)]
pub enum HeatingLogic {
    TemperatureBased(TemperatureLogic),
    StateOfChargeBased(StateOfChargeLogic),
}

impl HeatingLogic {
    /// Evaluates the predicate.
    ///
    /// `scheduled_mains_temp_c` is only consulted by
    /// [`HeatingLogic::StateOfChargeBased`] logics that don't use a constant
    /// mains temperature.
    ///
    /// # Errors
    ///
    /// Propagates [`HeatingLogicError`] from a temperature-based logic's
    /// weighted average.
    pub fn evaluate(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, HeatingLogicError> {
        match self {
            Self::TemperatureBased(logic) => logic.evaluate(ctx),
            Self::StateOfChargeBased(logic) => Ok(logic.evaluate(ctx, scheduled_mains_temp_c)),
        }
    }

    /// True if this is the entering-water high-temperature shut-off logic.
    #[must_use]
    pub fn is_ht_shutoff(&self) -> bool {
        matches!(self, Self::TemperatureBased(t) if t.is_ht_shutoff())
    }
}

impl From<TemperatureLogic> for HeatingLogic {
    fn from(logic: TemperatureLogic) -> Self {
        Self::TemperatureBased(logic)
    }
}

impl From<StateOfChargeLogic> for HeatingLogic {
    fn from(logic: StateOfChargeLogic) -> Self {
        Self::StateOfChargeBased(logic)
    }
}
