//! State and engagement behavior shared by every heat source family.

use crate::heating_logic::{EvaluationContext, HeatingLogic};

use super::ConfigError;

/// A stable index into the owning engine's heat-source list. Backup,
/// companion, and follower relationships are expressed this way rather than
/// as references, so a source set forms a small DAG that can be validated
/// and serialized independently of Rust's borrow rules.
pub type SourceIndex = usize;

/// A heat source's links to other sources in the same engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    /// Engaged in this source's place while it is locked out.
    pub backup: Option<SourceIndex>,
    /// Engaged alongside this source whenever it runs.
    pub companion: Option<SourceIndex>,
    /// Engaged after this source shuts off, within the same step's
    /// remaining time.
    pub follower: Option<SourceIndex>,
}

/// Engagement state, environment lockout bounds, turn-on/shut-off logic, and
/// per-step accumulators common to every heat source.
#[derive(Debug, Clone)]
pub struct HeatSourceState {
    name: String,
    is_on: bool,
    is_locked_out: bool,
    maxed_out_this_step: bool,
    is_vip: bool,
    runtime_min: f64,
    energy_in_kj: f64,
    energy_out_kj: f64,
    min_temp_c: f64,
    max_temp_c: f64,
    hysteresis_c: f64,
    depresses_temperature: bool,
    airflow_freedom: f64,
    condensity: Vec<f64>,
    turn_on_logic: Vec<HeatingLogic>,
    shut_off_logic: Vec<HeatingLogic>,
    standby_logic: Option<HeatingLogic>,
    links: Links,
}

impl HeatSourceState {
    /// Builds state from a condensity authored at a canonical 12-node
    /// resolution, resampled onto `n_nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCondensity`] if `condensity_12`'s
    /// entries are negative or sum to zero.
    pub fn new(
        name: impl Into<String>,
        n_nodes: usize,
        condensity_12: &[f64],
        min_temp_c: f64,
        max_temp_c: f64,
        hysteresis_c: f64,
        airflow_freedom: f64,
    ) -> Result<Self, ConfigError> {
        let sum: f64 = condensity_12.iter().sum();
        if sum <= 0.0 || condensity_12.iter().any(|&w| w < 0.0) {
            return Err(ConfigError::InvalidCondensity { sum });
        }
        let mut condensity = crate::support::resample::resample(condensity_12, n_nodes);
        crate::support::resample::normalize(&mut condensity, 1e-6);
        Ok(Self::from_resolved_condensity(
            name,
            condensity,
            min_temp_c,
            max_temp_c,
            hysteresis_c,
            airflow_freedom,
        ))
    }

    /// Builds state from a condensity already expressed at the tank's own
    /// node count (a single-node electric element, say).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCondensity`] if `condensity`'s entries
    /// are negative or sum to zero.
    pub fn new_direct(
        name: impl Into<String>,
        condensity: Vec<f64>,
        min_temp_c: f64,
        max_temp_c: f64,
        hysteresis_c: f64,
        airflow_freedom: f64,
    ) -> Result<Self, ConfigError> {
        let sum: f64 = condensity.iter().sum();
        if sum <= 0.0 || condensity.iter().any(|&w| w < 0.0) {
            return Err(ConfigError::InvalidCondensity { sum });
        }
        Ok(Self::from_resolved_condensity(
            name,
            condensity,
            min_temp_c,
            max_temp_c,
            hysteresis_c,
            airflow_freedom,
        ))
    }

    fn from_resolved_condensity(
        name: impl Into<String>,
        condensity: Vec<f64>,
        min_temp_c: f64,
        max_temp_c: f64,
        hysteresis_c: f64,
        airflow_freedom: f64,
    ) -> Self {
        Self {
            name: name.into(),
            is_on: false,
            is_locked_out: false,
            maxed_out_this_step: false,
            is_vip: false,
            runtime_min: 0.0,
            energy_in_kj: 0.0,
            energy_out_kj: 0.0,
            min_temp_c,
            max_temp_c,
            hysteresis_c,
            depresses_temperature: false,
            airflow_freedom: airflow_freedom.clamp(1e-6, 1.0),
            condensity,
            turn_on_logic: Vec::new(),
            shut_off_logic: Vec::new(),
            standby_logic: None,
            links: Links::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn condensity(&self) -> &[f64] {
        &self.condensity
    }

    #[must_use]
    pub fn airflow_freedom(&self) -> f64 {
        self.airflow_freedom
    }

    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.is_on
    }

    #[must_use]
    pub fn is_locked_out(&self) -> bool {
        self.is_locked_out
    }

    #[must_use]
    pub fn is_vip(&self) -> bool {
        self.is_vip
    }

    pub fn set_vip(&mut self, is_vip: bool) {
        self.is_vip = is_vip;
    }

    #[must_use]
    pub fn depresses_temperature(&self) -> bool {
        self.depresses_temperature
    }

    pub fn set_depresses_temperature(&mut self, depresses_temperature: bool) {
        self.depresses_temperature = depresses_temperature;
    }

    #[must_use]
    pub fn links(&self) -> Links {
        self.links
    }

    pub fn set_links(&mut self, links: Links) {
        self.links = links;
    }

    pub fn add_turn_on_logic(&mut self, logic: impl Into<HeatingLogic>) {
        self.turn_on_logic.push(logic.into());
    }

    pub fn add_shut_off_logic(&mut self, logic: impl Into<HeatingLogic>) {
        self.shut_off_logic.push(logic.into());
    }

    pub fn set_standby_logic(&mut self, logic: impl Into<HeatingLogic>) {
        self.standby_logic = Some(logic.into());
    }

    #[must_use]
    pub fn runtime_min(&self) -> f64 {
        self.runtime_min
    }

    #[must_use]
    pub fn energy_in_kj(&self) -> f64 {
        self.energy_in_kj
    }

    #[must_use]
    pub fn energy_out_kj(&self) -> f64 {
        self.energy_out_kj
    }

    /// Engages the source, resetting per-cycle accumulators on an off-to-on
    /// transition.
    pub fn engage(&mut self) {
        if !self.is_on {
            self.reset_step_accumulators();
        }
        self.is_on = true;
    }

    pub fn disengage(&mut self) {
        self.is_on = false;
    }

    /// Clears per-step accumulators and the maxed-out flag. Called by the
    /// engine at the start of every step.
    pub fn reset_step_accumulators(&mut self) {
        self.runtime_min = 0.0;
        self.energy_in_kj = 0.0;
        self.energy_out_kj = 0.0;
        self.maxed_out_this_step = false;
    }

    pub fn mark_maxed_out(&mut self) {
        self.maxed_out_this_step = true;
    }

    /// Accumulates this step's runtime and energy flows onto whatever has
    /// already been recorded this step (companions and followers may run
    /// the same source more than once within one engine step).
    pub fn accumulate(&mut self, runtime_min: f64, energy_in_kj: f64, energy_out_kj: f64) {
        debug_assert!(runtime_min >= -1e-9, "negative runtime is a programming error");
        self.runtime_min += runtime_min.max(0.0);
        self.energy_in_kj += energy_in_kj;
        self.energy_out_kj += energy_out_kj;
    }

    /// Whether environment temperature `env_t_c` should lock this source
    /// out, applying hysteresis on the side it is already engaged from, and
    /// forcing lockout if it has already maxed out the tank this step.
    #[must_use]
    pub fn should_lock_out(&self, env_t_c: f64, is_maxed_out: bool) -> bool {
        let (lo, hi) = if self.is_on {
            (self.min_temp_c - self.hysteresis_c, self.max_temp_c + self.hysteresis_c)
        } else {
            (self.min_temp_c, self.max_temp_c)
        };
        env_t_c < lo || env_t_c > hi || is_maxed_out
    }

    pub fn to_lock_or_unlock(&mut self, env_t_c: f64, is_maxed_out: bool) -> bool {
        self.is_locked_out = self.should_lock_out(env_t_c, is_maxed_out);
        self.is_locked_out
    }

    /// True iff every turn-on logic's predicate holds.
    ///
    /// # Errors
    ///
    /// Propagates a [`HeatingLogic::evaluate`] error.
    pub fn should_heat(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, ConfigError> {
        for logic in &self.turn_on_logic {
            if !logic.evaluate(ctx, scheduled_mains_temp_c)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether a configured standby logic blocks this source from starting
    /// this step (a short-cycle guard, not a shut-off of a running source).
    ///
    /// # Errors
    ///
    /// Propagates a [`HeatingLogic::evaluate`] error.
    pub fn standby_blocks_start(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, ConfigError> {
        match &self.standby_logic {
            Some(logic) => Ok(logic.evaluate(ctx, scheduled_mains_temp_c)?),
            None => Ok(false),
        }
    }

    /// True if any shut-off logic holds, or this source saturated the tank
    /// somewhere this step.
    ///
    /// # Errors
    ///
    /// Propagates a [`HeatingLogic::evaluate`] error.
    pub fn shuts_off(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, ConfigError> {
        if self.maxed_out_this_step {
            return Ok(true);
        }
        for logic in &self.shut_off_logic {
            if logic.evaluate(ctx, scheduled_mains_temp_c)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
