//! Per-step simulation dispatcher.
//!
//! [`Engine`] owns a [`Tank`], an ordered set of [`HeatSource`]s, and a
//! [`Courier`] for diagnostics. [`Engine::run_one_step`] advances the whole
//! system by one (typically one-minute) time step: draw advection and
//! standby loss, lockout evaluation, source dispatch under demand-response
//! rules, and an energy-balance check before returning [`StepOutput`].

mod config;
mod dr_mode;
mod error;
mod step;

pub use config::EngineConfig;
pub use dr_mode::DrMode;
pub use error::StepError;
pub use step::{StepInput, StepOutput};

use crate::heat_source::HeatSource;
use crate::heating_logic::EvaluationContext;
use crate::performance_map::MapWarning;
use crate::support::courier::{Courier, LogCourier, OperatingWarning};
use crate::tank::Tank;

/// The simulation core: a tank, its heat sources, and the rules that
/// dispatch them.
pub struct Engine {
    tank: Tank,
    sources: Vec<HeatSource>,
    config: EngineConfig,
    setpoint_c: f64,
    top_off_remaining_min: f64,
    courier: Box<dyn Courier>,
}

impl Engine {
    /// Builds an engine around `tank` and `sources`, logging through
    /// [`LogCourier`].
    #[must_use]
    pub fn new(tank: Tank, sources: Vec<HeatSource>, config: EngineConfig) -> Self {
        Self::with_courier(tank, sources, config, Box::new(LogCourier))
    }

    /// As [`Engine::new`], with an explicit [`Courier`].
    #[must_use]
    pub fn with_courier(
        tank: Tank,
        sources: Vec<HeatSource>,
        config: EngineConfig,
        courier: Box<dyn Courier>,
    ) -> Self {
        let setpoint_c = config.setpoint_c();
        Self {
            tank,
            sources,
            config,
            setpoint_c,
            top_off_remaining_min: 0.0,
            courier,
        }
    }

    #[must_use]
    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    #[must_use]
    pub fn sources(&self) -> &[HeatSource] {
        &self.sources
    }

    #[must_use]
    pub fn setpoint_c(&self) -> f64 {
        self.setpoint_c
    }

    /// Changes the setpoint, if [`EngineConfig::allow_setpoint_change`]
    /// permits it.
    ///
    /// Silently ignored (not an error) otherwise, mirroring how a fixed
    /// factory setpoint is usually enforced: the caller's request is simply
    /// inert rather than a step that should fail.
    pub fn set_setpoint_c(&mut self, setpoint_c: f64) {
        if self.config.allow_setpoint_change() {
            self.setpoint_c = setpoint_c;
        }
    }

    fn priority_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.sources.len()).collect();
        order.sort_by_key(|&i| !self.sources[i].is_vip());
        order
    }

    fn eval_context<'a>(&'a self, node_temps_c: &'a [f64], inlet_temp_c: f64) -> EvaluationContext<'a> {
        EvaluationContext {
            node_temps_c,
            inlet_temp_c,
            setpoint_c: self.setpoint_c,
        }
    }

    /// Advances the simulation by one step.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Tank`] if the draw is invalid, propagates
    /// [`StepError::Config`] from a heat source's logic or performance-map
    /// evaluation, or returns [`StepError::EnergyImbalance`] if the tank's
    /// heat-content change during the heat-addition phase doesn't match the
    /// sum of engaged sources' delivered energy within tolerance.
    pub fn run_one_step(&mut self, input: &StepInput) -> Result<StepOutput, StepError> {
        for source in &mut self.sources {
            source.reset_step_accumulators();
        }

        self.tank
            .advect_draw_and_lose(input.draw, input.ambient_temp_c, input.dt_min)?;
        let standby_loss_kj = self.tank.standby_loss_kj();

        for source in &mut self.sources {
            source.to_lock_or_unlock(input.env_temp_c, &self.tank);
        }
        self.apply_dr_locks(input.dr_mode);

        if input.dr_mode.top_off_timer {
            self.top_off_remaining_min = self.top_off_remaining_min.max(self.config.top_off_timer_min());
        }
        let top_off_active = input.dr_mode.top_off_once
            || (input.dr_mode.top_off_timer && self.top_off_remaining_min > 0.0);

        let heat_before_kj = self.tank.heat_content_kj();
        let mut warnings: Vec<MapWarning> = Vec::new();
        let mut engaged_sources = Vec::new();
        let mut expected_energy_out_kj = 0.0;

        if top_off_active {
            if let Some(index) = self.config.top_off_resistance_index() {
                if index >= self.sources.len() {
                    return Err(StepError::SourceIndexOutOfRange {
                        index,
                        n: self.sources.len(),
                    });
                }
                if !self.sources[index].is_locked_out() {
                    self.sources[index].engage();
                    let energy_before = self.sources[index].energy_out_kj();
                    let source_warnings = self.sources[index].add_heat(
                        &mut self.tank,
                        input.env_temp_c,
                        self.setpoint_c,
                        self.config.max_temp_c(),
                        input.dt_min,
                    )?;
                    warnings.extend(source_warnings);
                    expected_energy_out_kj += self.sources[index].energy_out_kj() - energy_before;
                    engaged_sources.push(index);
                }
            }
        } else {
            for &candidate in &self.priority_order() {
                let index = match self.resolve_via_backup(candidate) {
                    Some(index) => index,
                    None => continue,
                };

                let ctx = self.eval_context(self.tank.node_temperatures_c(), input.mains_temp_c);
                let keep_running = if self.sources[index].is_engaged() {
                    // Already running: stay on while not shuts_off, per the
                    // turn-on/shut-off hysteresis gap. Re-checking should_heat
                    // here would short-cycle a source whose turn-on and
                    // shut-off decision points don't coincide.
                    !self.sources[index].shuts_off(&ctx, input.mains_temp_c)?
                } else {
                    let should_heat = self.sources[index].should_heat(&ctx, input.mains_temp_c)?;
                    let standby_blocked =
                        self.sources[index].standby_blocks_start(&ctx, input.mains_temp_c)?;
                    should_heat && !standby_blocked
                };

                if !keep_running {
                    self.sources[index].disengage();
                    continue;
                }

                for run_index in self.run_group(index) {
                    self.run_source_and_followers(
                        run_index,
                        input,
                        input.dt_min,
                        &mut engaged_sources,
                        &mut warnings,
                        &mut expected_energy_out_kj,
                    )?;
                }
                break;
            }
        }

        if input.dr_mode.top_off_timer {
            self.top_off_remaining_min = (self.top_off_remaining_min - input.dt_min).max(0.0);
        }

        self.tank.mix_inversions();
        let heat_after_kj = self.tank.heat_content_kj();
        let actual_gain_kj = heat_after_kj - heat_before_kj;
        let tolerance_kj = self.config.energy_balance_tolerance_kj().max(1e-9 * expected_energy_out_kj.abs());
        if (actual_gain_kj - expected_energy_out_kj).abs() > tolerance_kj {
            return Err(StepError::EnergyImbalance {
                expected_kj: expected_energy_out_kj,
                actual_kj: actual_gain_kj,
                tolerance_kj,
            });
        }

        for warning in &warnings {
            self.courier.warn(&render_map_warning(warning));
        }

        Ok(StepOutput {
            tank_mean_c: self.tank.mean_temperature_c(),
            tank_top_c: self.tank.top_temperature_c(),
            thermocouples_c: self.tank.sample_thermocouples_c(6),
            standby_loss_kj,
            engaged_sources,
            source_runtime_min: self.sources.iter().map(HeatSource::runtime_min).collect(),
            source_energy_in_kj: self.sources.iter().map(HeatSource::energy_in_kj).collect(),
            source_energy_out_kj: self.sources.iter().map(HeatSource::energy_out_kj).collect(),
            warnings,
        })
    }

    fn apply_dr_locks(&mut self, dr_mode: DrMode) {
        if !dr_mode.lock_compressor && !dr_mode.lock_resistance {
            return;
        }
        for source in &mut self.sources {
            let locked_by_dr = match source {
                HeatSource::Condenser(_) => dr_mode.lock_compressor,
                HeatSource::Resistance(_) => dr_mode.lock_resistance,
            };
            if locked_by_dr {
                match source {
                    HeatSource::Condenser(c) => {
                        c.state_mut().to_lock_or_unlock(f64::NEG_INFINITY, false);
                    }
                    HeatSource::Resistance(r) => {
                        r.state_mut().to_lock_or_unlock(f64::NEG_INFINITY, false);
                    }
                }
            }
        }
    }

    /// A source together with its companion, if linked: both engage and run
    /// for the same step.
    fn run_group(&self, index: usize) -> Vec<usize> {
        let mut group = vec![index];
        if let Some(companion) = self.sources[index].links().companion {
            if companion < self.sources.len() && !self.sources[companion].is_locked_out() {
                group.push(companion);
            }
        }
        group
    }

    /// If `index` is locked out, substitutes its linked backup (if any and
    /// eligible), following at most one hop — the backup relation is a DAG,
    /// not a chain, so a locked-out backup simply yields no candidate this
    /// step rather than searching further.
    fn resolve_via_backup(&mut self, index: usize) -> Option<usize> {
        if !self.sources[index].is_locked_out() {
            return Some(index);
        }
        self.sources[index].disengage();
        match self.sources[index].links().backup {
            Some(backup) if backup < self.sources.len() && !self.sources[backup].is_locked_out() => {
                Some(backup)
            }
            _ => None,
        }
    }

    /// Engages `index` and runs it for `budget_min`. If it shuts off before
    /// exhausting the budget and has a linked follower, the follower engages
    /// for whatever time remains, within the same step.
    fn run_source_and_followers(
        &mut self,
        index: usize,
        input: &StepInput,
        budget_min: f64,
        engaged_sources: &mut Vec<usize>,
        warnings: &mut Vec<MapWarning>,
        expected_energy_out_kj: &mut f64,
    ) -> Result<(), StepError> {
        if budget_min <= 1e-9 || self.sources[index].is_locked_out() {
            return Ok(());
        }

        self.sources[index].engage();
        let energy_before = self.sources[index].energy_out_kj();
        let runtime_before = self.sources[index].runtime_min();
        let source_warnings = self.sources[index].add_heat(
            &mut self.tank,
            input.env_temp_c,
            self.setpoint_c,
            self.config.max_temp_c(),
            budget_min,
        )?;
        warnings.extend(source_warnings);
        *expected_energy_out_kj += self.sources[index].energy_out_kj() - energy_before;
        engaged_sources.push(index);

        let consumed_min = self.sources[index].runtime_min() - runtime_before;
        let remaining_min = budget_min - consumed_min;

        let ctx = self.eval_context(self.tank.node_temperatures_c(), input.mains_temp_c);
        let shuts_off = self.sources[index].shuts_off(&ctx, input.mains_temp_c)?;
        if shuts_off {
            self.sources[index].disengage();
        }

        if shuts_off && remaining_min > 1e-9 {
            if let Some(follower) = self.sources[index].links().follower {
                if follower < self.sources.len() && follower != index {
                    self.run_source_and_followers(
                        follower,
                        input,
                        remaining_min,
                        engaged_sources,
                        warnings,
                        expected_energy_out_kj,
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn render_map_warning(warning: &MapWarning) -> String {
    match *warning {
        MapWarning::Extrapolated { axis, value } => OperatingWarning::Extrapolated {
            heat_source: String::new(),
            axis,
            value,
        }
        .message(),
        MapWarning::LowCop { cop } => OperatingWarning::LowCop {
            heat_source: String::new(),
            cop,
        }
        .message(),
        MapWarning::NegativeCop { cop } => OperatingWarning::NegativeCop {
            heat_source: String::new(),
            cop,
        }
        .message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_source::Resistance;
    use crate::heating_logic::{Comparator, HeatingLogic, TemperatureLogic};
    use crate::tank::TankConfig;

    fn engine_with_one_resistance() -> Engine {
        let tank_config = TankConfig::new(12, 189.0, 0.0, 0.0).unwrap();
        let tank = Tank::new(&tank_config, 20.0).unwrap();
        let mut resistance = Resistance::new("top", 12, 11, 4.5, -100.0, 100.0, 0.0).unwrap();
        let logic: HeatingLogic = TemperatureLogic::top_third(12, 5.0, Comparator::Greater).into();
        resistance.state_mut().add_turn_on_logic(logic);
        let engine_config = EngineConfig::new(51.7, 99.0);
        Engine::new(tank, vec![resistance.into()], engine_config)
    }

    #[test]
    fn a_cold_tank_engages_its_resistance_element_and_closes_the_energy_balance() {
        let mut engine = engine_with_one_resistance();
        let input = StepInput {
            dt_min: 1.0,
            ..StepInput::default()
        };
        let output = engine.run_one_step(&input).unwrap();
        assert_eq!(output.engaged_sources, vec![0]);
        assert!(output.source_energy_out_kj[0] > 0.0);
    }

    #[test]
    fn dr_lock_resistance_prevents_engagement_even_when_cold() {
        let mut engine = engine_with_one_resistance();
        let input = StepInput {
            dt_min: 1.0,
            dr_mode: DrMode::lock_resistance(),
            ..StepInput::default()
        };
        let output = engine.run_one_step(&input).unwrap();
        assert!(output.engaged_sources.is_empty());
    }

    #[test]
    fn setpoint_change_is_ignored_when_disallowed() {
        let tank_config = TankConfig::new(12, 189.0, 0.0, 0.0).unwrap();
        let tank = Tank::new(&tank_config, 20.0).unwrap();
        let config = EngineConfig::new(51.7, 99.0).with_allow_setpoint_change(false);
        let mut engine = Engine::new(tank, Vec::new(), config);
        engine.set_setpoint_c(60.0);
        assert_eq!(engine.setpoint_c(), 51.7);
    }
}
