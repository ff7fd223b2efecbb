//! A single electric-resistance element.

use crate::tank::Tank;

use super::common::HeatSourceState;
use super::error::ConfigError;

/// A resistance element coupled to a single tank node.
#[derive(Debug, Clone)]
pub struct Resistance {
    state: HeatSourceState,
    node: usize,
    power_kw: f64,
}

impl Resistance {
    /// Builds a resistance element at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NodeOutOfRange`] if `node >= n_nodes`.
    pub fn new(
        name: impl Into<String>,
        n_nodes: usize,
        node: usize,
        power_kw: f64,
        min_temp_c: f64,
        max_temp_c: f64,
        hysteresis_c: f64,
    ) -> Result<Self, ConfigError> {
        if node >= n_nodes {
            return Err(ConfigError::NodeOutOfRange { index: node });
        }
        let mut condensity = vec![0.0; n_nodes];
        condensity[node] = 1.0;
        let state =
            HeatSourceState::new_direct(name, condensity, min_temp_c, max_temp_c, hysteresis_c, 1.0)?;
        Ok(Self {
            state,
            node,
            power_kw,
        })
    }

    #[must_use]
    pub fn state(&self) -> &HeatSourceState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut HeatSourceState {
        &mut self.state
    }

    #[must_use]
    pub fn node(&self) -> usize {
        self.node
    }

    /// Delivers `power_kw * dt_min` of electrical energy to `tank`, capped
    /// at `max_temp_c`, and records runtime/energy onto this step.
    ///
    /// Returns the runtime actually accrued, in minutes.
    pub fn add_heat(&mut self, tank: &mut Tank, max_temp_c: f64, dt_min: f64) -> f64 {
        let dq_kj = self.power_kw * dt_min * 60.0;
        if dq_kj <= 0.0 {
            return 0.0;
        }

        let leftover_kj = tank.add_heat_at_node(self.node, dq_kj, max_temp_c);
        let absorbed_kj = dq_kj - leftover_kj;
        let runtime_min = (absorbed_kj / dq_kj * dt_min).clamp(0.0, dt_min);
        let energy_kj = self.power_kw * runtime_min * 60.0;

        self.state.accumulate(runtime_min, energy_kj, energy_kj);
        if leftover_kj > 1e-9 {
            self.state.mark_maxed_out();
        }
        runtime_min
    }
}
