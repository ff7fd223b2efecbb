use super::{Comparator, EvaluationContext, HeatingLogicError};

/// A state-of-charge turn-on/shut-off predicate.
///
/// State of charge is the average, over nodes warmer than the cold-water
/// reference, of each node's fractional "charge" between that reference and
/// an upper reference temperature.
#[derive(Debug, Clone, Copy)]
pub struct StateOfChargeLogic {
    target_fraction: f64,
    hysteresis_fraction: f64,
    min_useful_temp_c: f64,
    use_constant_mains: bool,
    constant_mains_temp_c: f64,
    use_setpoint_as_upper_reference: bool,
    comparator: Comparator,
}

impl StateOfChargeLogic {
    /// Builds a state-of-charge logic.
    ///
    /// `use_setpoint_as_upper_reference` selects the alternate charge
    /// definition that uses the engine's setpoint, rather than
    /// `min_useful_temp_c`, as each node's upper reference.
    ///
    /// # Errors
    ///
    /// Returns [`HeatingLogicError::MinUsefulBelowMains`] if
    /// `use_constant_mains` is set and `min_useful_temp_c <= constant_mains_temp_c`.
    pub fn new(
        target_fraction: f64,
        hysteresis_fraction: f64,
        min_useful_temp_c: f64,
        use_constant_mains: bool,
        constant_mains_temp_c: f64,
        use_setpoint_as_upper_reference: bool,
        comparator: Comparator,
    ) -> Result<Self, HeatingLogicError> {
        if use_constant_mains && min_useful_temp_c <= constant_mains_temp_c {
            return Err(HeatingLogicError::MinUsefulBelowMains);
        }
        Ok(Self {
            target_fraction,
            hysteresis_fraction,
            min_useful_temp_c,
            use_constant_mains,
            constant_mains_temp_c,
            use_setpoint_as_upper_reference,
            comparator,
        })
    }

    /// The charge fraction of a single node: `(hot - cold) / (upper - cold)`,
    /// clamped to 0 when `hot < upper` would make it negative past the
    /// reference, and never negative.
    #[must_use]
    pub fn charge_per_node(cold: f64, upper: f64, hot: f64) -> f64 {
        if hot < upper {
            return 0.0;
        }
        let denom = upper - cold;
        if denom.abs() < f64::EPSILON {
            return 0.0;
        }
        ((hot - cold) / denom).max(0.0)
    }

    /// Computes the tank's current state of charge given the step's
    /// schedule-supplied mains temperature (ignored if this logic was built
    /// with `use_constant_mains`).
    #[must_use]
    pub fn state_of_charge(&self, ctx: &EvaluationContext, scheduled_mains_temp_c: f64) -> f64 {
        let cold = if self.use_constant_mains {
            self.constant_mains_temp_c
        } else {
            scheduled_mains_temp_c
        };
        let upper = if self.use_setpoint_as_upper_reference {
            ctx.setpoint_c
        } else {
            self.min_useful_temp_c
        };

        let above_cold: Vec<f64> = ctx
            .node_temps_c
            .iter()
            .copied()
            .filter(|&t| t > cold)
            .collect();
        if above_cold.is_empty() {
            return 0.0;
        }

        let sum: f64 = above_cold
            .iter()
            .map(|&t| Self::charge_per_node(cold, upper, t))
            .sum();
        sum / above_cold.len() as f64
    }

    /// Evaluates the state of charge against `target_fraction ± hysteresis_fraction`.
    #[must_use]
    pub fn evaluate(&self, ctx: &EvaluationContext, scheduled_mains_temp_c: f64) -> bool {
        let soc = self.state_of_charge(ctx, scheduled_mains_temp_c);
        match self.comparator {
            Comparator::Less => soc < self.target_fraction - self.hysteresis_fraction,
            Comparator::Greater => soc > self.target_fraction + self.hysteresis_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(temps: &[f64]) -> EvaluationContext<'_> {
        EvaluationContext {
            node_temps_c: temps,
            inlet_temp_c: 10.0,
            setpoint_c: 51.7,
        }
    }

    #[test]
    fn charge_per_node_is_zero_below_upper_reference() {
        assert_eq!(StateOfChargeLogic::charge_per_node(10.0, 50.0, 9.0), 0.0);
    }

    #[test]
    fn charge_per_node_scales_linearly_above_cold() {
        let c = StateOfChargeLogic::charge_per_node(10.0, 50.0, 50.0);
        assert!((c - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_min_useful_at_or_below_constant_mains() {
        assert!(StateOfChargeLogic::new(
            0.5, 0.1, 40.0, true, 45.0, false, Comparator::Less
        )
        .is_err());
    }

    #[test]
    fn fully_charged_tank_reads_soc_of_one() {
        let logic =
            StateOfChargeLogic::new(0.5, 0.05, 50.0, true, 10.0, false, Comparator::Less).unwrap();
        let temps = [50.0; 12];
        let soc = logic.state_of_charge(&ctx(&temps), 10.0);
        assert!((soc - 1.0).abs() < 1e-6);
        assert!(!logic.evaluate(&ctx(&temps), 10.0));
    }

    #[test]
    fn depleted_tank_trips_a_less_than_comparator() {
        let logic =
            StateOfChargeLogic::new(0.5, 0.05, 50.0, true, 10.0, false, Comparator::Less).unwrap();
        let temps = [10.0; 12];
        assert!(logic.evaluate(&ctx(&temps), 10.0));
    }
}
