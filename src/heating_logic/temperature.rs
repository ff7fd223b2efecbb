use super::{Comparator, EvaluationContext, HeatingLogicError};

/// A term in a weighted-average temperature predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTerm {
    /// An ordinary tank node, by index.
    Node(usize),
    /// The draw inlet temperature for the current step.
    InletTemperature,
    /// The engine's current setpoint.
    Setpoint,
}

/// One `(term, weight)` pair in a [`TemperatureLogic`]'s weighted average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeWeight {
    pub term: NodeTerm,
    pub weight: f64,
}

impl NodeWeight {
    #[must_use]
    pub fn node(index: usize, weight: f64) -> Self {
        Self {
            term: NodeTerm::Node(index),
            weight,
        }
    }
}

/// A weighted-region temperature predicate: turn-on/shut-off logic based on
/// a weighted average of tank node temperatures (or the inlet/setpoint
/// pseudo-nodes) compared against a decision point.
#[derive(Debug, Clone)]
pub struct TemperatureLogic {
    weights: Vec<NodeWeight>,
    decision_point: f64,
    is_absolute: bool,
    comparator: Comparator,
    is_ht_shutoff: bool,
}

impl TemperatureLogic {
    /// Builds a logic from explicit weighted terms.
    ///
    /// `is_absolute` selects between comparing the node temperatures
    /// directly (`true`) or comparing `setpoint - T` at each node (`false`,
    /// the usual "how far below setpoint" framing).
    #[must_use]
    pub fn new(
        weights: Vec<NodeWeight>,
        decision_point: f64,
        is_absolute: bool,
        comparator: Comparator,
    ) -> Self {
        Self {
            weights,
            decision_point,
            is_absolute,
            comparator,
            is_ht_shutoff: false,
        }
    }

    /// Marks this logic as the entering-water high-temperature shut-off.
    #[must_use]
    pub fn with_ht_shutoff(mut self, is_ht_shutoff: bool) -> Self {
        self.is_ht_shutoff = is_ht_shutoff;
        self
    }

    #[must_use]
    pub fn is_ht_shutoff(&self) -> bool {
        self.is_ht_shutoff
    }

    /// Evaluates the weighted average against `ctx` and applies the
    /// comparator.
    ///
    /// # Errors
    ///
    /// Returns [`HeatingLogicError::EmptyWeights`] if no terms are
    /// configured, or [`HeatingLogicError::NodeOutOfRange`] if a term names
    /// a node outside the tank.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> Result<bool, HeatingLogicError> {
        let value = self.weighted_average(ctx)?;
        Ok(match self.comparator {
            Comparator::Less => value < self.decision_point,
            Comparator::Greater => value > self.decision_point,
        })
    }

    /// The weighted average itself, useful for reporting state-of-charge
    /// style progress without the comparator applied.
    ///
    /// # Errors
    ///
    /// See [`TemperatureLogic::evaluate`].
    pub fn weighted_average(&self, ctx: &EvaluationContext) -> Result<f64, HeatingLogicError> {
        if self.weights.is_empty() {
            return Err(HeatingLogicError::EmptyWeights);
        }

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for nw in &self.weights {
            let t = match nw.term {
                NodeTerm::Node(i) => *ctx
                    .node_temps_c
                    .get(i)
                    .ok_or(HeatingLogicError::NodeOutOfRange { index: i })?,
                NodeTerm::InletTemperature => ctx.inlet_temp_c,
                NodeTerm::Setpoint => ctx.setpoint_c,
            };
            let term_value = if self.is_absolute { t } else { ctx.setpoint_c - t };
            numerator += nw.weight * term_value;
            denominator += nw.weight;
        }

        Ok(numerator / denominator)
    }

    fn region(
        start: usize,
        end: usize,
        decision_point: f64,
        is_absolute: bool,
        comparator: Comparator,
    ) -> Self {
        let weights = (start..end).map(|i| NodeWeight::node(i, 1.0)).collect();
        Self::new(weights, decision_point, is_absolute, comparator)
    }

    /// Average of the top third of nodes, relative to setpoint.
    #[must_use]
    pub fn top_third(n_nodes: usize, decision_point: f64, comparator: Comparator) -> Self {
        Self::region(n_nodes * 2 / 3, n_nodes, decision_point, false, comparator)
    }

    /// Average of the bottom third of nodes, relative to setpoint.
    #[must_use]
    pub fn bottom_third(n_nodes: usize, decision_point: f64, comparator: Comparator) -> Self {
        Self::region(0, n_nodes / 3, decision_point, false, comparator)
    }

    /// Average of the bottom half of nodes, relative to setpoint.
    #[must_use]
    pub fn bottom_half(n_nodes: usize, decision_point: f64, comparator: Comparator) -> Self {
        Self::region(0, n_nodes / 2, decision_point, false, comparator)
    }

    /// Average of the bottom twelfth of nodes, relative to setpoint.
    #[must_use]
    pub fn bottom_twelfth(n_nodes: usize, decision_point: f64, comparator: Comparator) -> Self {
        Self::region(0, (n_nodes / 12).max(1), decision_point, false, comparator)
    }

    /// Average of the bottom sixth of nodes, relative to setpoint.
    #[must_use]
    pub fn bottom_sixth(n_nodes: usize, decision_point: f64, comparator: Comparator) -> Self {
        Self::region(0, (n_nodes / 6).max(1), decision_point, false, comparator)
    }

    /// The top node is more than `delta` below setpoint: a standby
    /// short-cycle guard.
    #[must_use]
    pub fn standby(n_nodes: usize, delta: f64) -> Self {
        Self::new(
            vec![NodeWeight::node(n_nodes - 1, 1.0)],
            delta,
            false,
            Comparator::Greater,
        )
    }

    /// Whole-tank average relative to setpoint, used to detect a large draw
    /// has depressed the tank broadly rather than just the top.
    #[must_use]
    pub fn large_draw(n_nodes: usize, decision_point: f64, comparator: Comparator) -> Self {
        Self::region(0, n_nodes, decision_point, false, comparator)
    }

    /// Absolute top-node temperature exceeding `max_temp_c`: a high-limit
    /// shut-off.
    #[must_use]
    pub fn top_node_max_temp(n_nodes: usize, max_temp_c: f64) -> Self {
        Self::region(n_nodes - 1, n_nodes, max_temp_c, true, Comparator::Greater)
            .with_ht_shutoff(true)
    }

    /// Absolute bottom-twelfth average temperature exceeding `max_temp_c`.
    #[must_use]
    pub fn bottom_twelfth_max_temp(n_nodes: usize, max_temp_c: f64) -> Self {
        Self::region(0, (n_nodes / 12).max(1), max_temp_c, true, Comparator::Greater)
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
    fn bottom_third_averages_the_lowest_nodes() {
        let temps = [10.0; 12];
        let logic = TemperatureLogic::bottom_third(12, 5.0, Comparator::Greater);
        // setpoint - 10 = 41.7, well above 5.0
        assert!(logic.evaluate(&ctx(&temps)).unwrap());
    }

    #[test]
    fn top_node_max_temp_is_absolute_and_flagged_as_ht_shutoff() {
        let mut temps = [20.0; 12];
        temps[11] = 99.0;
        let logic = TemperatureLogic::top_node_max_temp(12, 90.0);
        assert!(logic.is_ht_shutoff());
        assert!(logic.evaluate(&ctx(&temps)).unwrap());
    }

    #[test]
    fn out_of_range_node_is_an_error() {
        let logic = TemperatureLogic::new(
            vec![NodeWeight::node(99, 1.0)],
            0.0,
            true,
            Comparator::Greater,
        );
        assert!(logic.evaluate(&ctx(&[20.0; 12])).is_err());
    }

    #[test]
    fn pseudo_nodes_reference_inlet_and_setpoint() {
        let logic = TemperatureLogic::new(
            vec![NodeWeight {
                term: NodeTerm::InletTemperature,
                weight: 1.0,
            }],
            5.0,
            true,
            Comparator::Less,
        );
        assert!(logic.evaluate(&ctx(&[20.0; 12])).unwrap());
    }
}
