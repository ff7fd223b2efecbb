//! Heat-pump condensers: submerged, wrapped, and external configurations.

use crate::performance_map::{MapWarning, PerformanceMap};
use crate::tank::{Tank, SPECIFIC_HEAT_WATER_KJ_PER_L_C};

use super::common::HeatSourceState;
use super::condensity::{calc_shrinkage_c, calc_thermal_distribution, find_lowest_node};
use super::error::ConfigError;

const LOW_AIRFLOW_COP_SLOPE: f64 = 0.000_56;
const LOW_AIRFLOW_COP_SCALE: f64 = 375.0;
const LOW_AIRFLOW_COP_INTERCEPT: f64 = 0.79;

/// How a condenser couples to the tank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Configuration {
    /// Submerged in the tank; heats in proportion to its condensity
    /// directly.
    Submerged,
    /// Wrapped around the tank exterior; heats according to a
    /// condensity-derived logistic distribution shape.
    Wrapped,
    /// Circulates tank water through an external heat exchanger between
    /// `inlet_height` and `outlet_height`.
    External {
        is_multipass: bool,
        inlet_height: usize,
        outlet_height: usize,
        /// Required (and only used) when `is_multipass`, in liters/minute.
        mp_flow_rate_l_per_min: f64,
    },
}

/// A piecewise-linear environment-temperature derate applied to COP while
/// the unit is in defrost. No extrapolation beyond its declared range — a
/// query outside it derates by exactly 1 (no effect).
#[derive(Debug, Clone)]
pub struct DefrostMap {
    points: Vec<(f64, f64)>,
}

impl DefrostMap {
    /// Builds a map from `(env_t_c, derate)` points, sorted ascending by
    /// temperature.
    #[must_use]
    pub fn new(mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("defrost points must be finite"));
        Self { points }
    }

    /// The standard three-point map: full output at 17 °F and 47 °F, with a
    /// derate at 35 °F (conventionally 0.8865, but configurable for units
    /// with a shallower frost dip).
    #[must_use]
    pub fn standard(derate_at_35_f: f64) -> Self {
        let f_to_c = |f: f64| (f - 32.0) * 5.0 / 9.0;
        Self::new(vec![
            (f_to_c(17.0), 1.0),
            (f_to_c(35.0), derate_at_35_f),
            (f_to_c(47.0), 1.0),
        ])
    }

    #[must_use]
    pub fn derate(&self, env_t_c: f64) -> f64 {
        let n = self.points.len();
        if n == 0 {
            return 1.0;
        }
        if env_t_c < self.points[0].0 || env_t_c > self.points[n - 1].0 {
            return 1.0;
        }
        for pair in self.points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if env_t_c >= x0 && env_t_c <= x1 {
                if (x1 - x0).abs() < f64::EPSILON {
                    return y0;
                }
                return y0 + (y1 - y0) * (env_t_c - x0) / (x1 - x0);
            }
        }
        1.0
    }
}

/// A resistance-defrost auxiliary: below `on_below_t_c`, the compressor's
/// evaporator air temperature is treated as lifted by `constant_lift_c` and
/// `input_power_kw` of resistance power is added alongside the compressor's.
#[derive(Debug, Clone, Copy)]
pub struct ResistanceDefrost {
    pub input_power_kw: f64,
    pub constant_lift_c: f64,
    pub on_below_t_c: f64,
}

/// A heat-pump condenser: a [`PerformanceMap`] plus how it couples thermally
/// to the tank.
#[derive(Debug, Clone)]
pub struct Condenser {
    state: HeatSourceState,
    configuration: Configuration,
    performance_map: PerformanceMap,
    max_setpoint_c: f64,
    cold_side_offset_c: f64,
    extra_pump_power_kw: f64,
    defrost_map: Option<DefrostMap>,
    do_defrost: bool,
    resistance_defrost: Option<ResistanceDefrost>,
    input_power_scale: f64,
    cop_scale: f64,
    shrinkage_c: f64,
    lowest_node: usize,
}

impl Condenser {
    /// Builds a condenser.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCondensity`] if `condensity_12` is
    /// degenerate, or [`ConfigError::NonPositiveFlowRate`] if `configuration`
    /// is a multipass external unit with a nonpositive flow rate.
    pub fn new(
        name: impl Into<String>,
        n_nodes: usize,
        condensity_12: &[f64],
        configuration: Configuration,
        performance_map: PerformanceMap,
        max_setpoint_c: f64,
        min_temp_c: f64,
        max_temp_c: f64,
        hysteresis_c: f64,
        airflow_freedom: f64,
    ) -> Result<Self, ConfigError> {
        if let Configuration::External {
            is_multipass: true,
            mp_flow_rate_l_per_min,
            ..
        } = configuration
        {
            if mp_flow_rate_l_per_min <= 0.0 {
                return Err(ConfigError::NonPositiveFlowRate);
            }
        }

        let state = HeatSourceState::new(
            name,
            n_nodes,
            condensity_12,
            min_temp_c,
            max_temp_c,
            hysteresis_c,
            airflow_freedom,
        )?;
        let shrinkage_c = calc_shrinkage_c(state.condensity());
        let lowest_node = find_lowest_node(state.condensity());

        Ok(Self {
            state,
            configuration,
            performance_map,
            max_setpoint_c,
            cold_side_offset_c: 0.0,
            extra_pump_power_kw: 0.0,
            defrost_map: None,
            do_defrost: false,
            resistance_defrost: None,
            input_power_scale: 1.0,
            cop_scale: 1.0,
            shrinkage_c,
            lowest_node,
        })
    }

    #[must_use]
    pub fn with_defrost_map(mut self, map: DefrostMap) -> Self {
        self.defrost_map = Some(map);
        self.do_defrost = true;
        self
    }

    #[must_use]
    pub fn with_resistance_defrost(mut self, defrost: ResistanceDefrost) -> Self {
        self.resistance_defrost = Some(defrost);
        self
    }

    #[must_use]
    pub fn with_secondary_heat_exchanger(mut self, cold_side_offset_c: f64, extra_pump_power_kw: f64) -> Self {
        self.cold_side_offset_c = cold_side_offset_c;
        self.extra_pump_power_kw = extra_pump_power_kw;
        self
    }

    #[must_use]
    pub fn with_scale_factors(mut self, input_power_scale: f64, cop_scale: f64) -> Self {
        self.input_power_scale = input_power_scale;
        self.cop_scale = cop_scale;
        self
    }

    #[must_use]
    pub fn state(&self) -> &HeatSourceState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut HeatSourceState {
        &mut self.state
    }

    #[must_use]
    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    #[must_use]
    pub fn max_setpoint_c(&self) -> f64 {
        self.max_setpoint_c
    }

    /// The condensity-weighted (submerged/wrapped) or outlet-node (external)
    /// coupled temperature this condenser is currently seeing.
    #[must_use]
    pub fn coupled_temperature_c(&self, tank: &Tank) -> f64 {
        match self.configuration {
            Configuration::Submerged | Configuration::Wrapped => {
                weighted_average(tank.node_temperatures_c(), self.state.condensity())
            }
            Configuration::External { outlet_height, .. } => {
                let node = outlet_height.min(tank.n_nodes() - 1);
                tank.node_temperatures_c()[node]
            }
        }
    }

    /// Whether this condenser has already raised its coupled region to
    /// `max_setpoint_c`.
    #[must_use]
    pub fn is_maxed_out(&self, tank: &Tank) -> bool {
        self.coupled_temperature_c(tank) >= self.max_setpoint_c - 1e-6
    }

    /// As [`HeatSourceState::to_lock_or_unlock`], folding in this
    /// condenser's own maxed-out check.
    pub fn to_lock_or_unlock(&mut self, env_t_c: f64, tank: &Tank) -> bool {
        let maxed = self.is_maxed_out(tank);
        self.state.to_lock_or_unlock(env_t_c, maxed)
    }

    /// `(inputPower, COP)` at the given conditions, with defrost,
    /// resistance-defrost, scale factors, and low-airflow derate applied.
    ///
    /// # Errors
    ///
    /// Propagates a [`PerformanceMap::evaluate`] error.
    pub fn evaluate_performance(
        &self,
        env_t_c: f64,
        heat_source_t_c: f64,
        outlet_t_c: Option<f64>,
    ) -> Result<(f64, f64, Vec<MapWarning>), ConfigError> {
        let mut effective_env_t_c = env_t_c;
        let mut resistance_power_kw = 0.0;
        if let Some(rd) = &self.resistance_defrost {
            if env_t_c < rd.on_below_t_c {
                effective_env_t_c += rd.constant_lift_c;
                resistance_power_kw = rd.input_power_kw;
            }
        }

        let effective_source_t_c = heat_source_t_c + self.cold_side_offset_c;
        let (mut power_kw, mut cop, warnings) = self.performance_map.evaluate(
            effective_env_t_c,
            effective_source_t_c,
            outlet_t_c,
        )?;

        power_kw *= self.input_power_scale;
        cop *= self.cop_scale;

        if self.do_defrost {
            if let Some(map) = &self.defrost_map {
                cop *= map.derate(env_t_c);
            }
        }

        if self.state.airflow_freedom() < 1.0 {
            cop *= LOW_AIRFLOW_COP_SLOPE * (LOW_AIRFLOW_COP_SCALE * self.state.airflow_freedom())
                + LOW_AIRFLOW_COP_INTERCEPT;
        }

        power_kw += resistance_power_kw + self.extra_pump_power_kw;

        Ok((power_kw, cop, warnings))
    }

    /// The heat-distribution shape this step: condensity directly for
    /// submerged units, a condensity-derived logistic shape for wrapped
    /// units. Not used by external configurations, which heat along an
    /// explicit inlet/outlet flow path instead.
    #[must_use]
    pub fn calc_heat_distribution(&self, tank: &Tank, setpoint_c: f64) -> Vec<f64> {
        match self.configuration {
            Configuration::Submerged => self.state.condensity().to_vec(),
            Configuration::Wrapped => calc_thermal_distribution(
                tank.node_temperatures_c(),
                setpoint_c,
                self.shrinkage_c,
                self.lowest_node,
            ),
            Configuration::External { .. } => vec![0.0; tank.n_nodes()],
        }
    }

    /// Runs this condenser for `dt_min`, dispatching on `configuration`.
    ///
    /// Returns non-fatal warnings surfaced while evaluating performance.
    ///
    /// # Errors
    ///
    /// Propagates an evaluation error from the underlying performance map
    /// or a turn-on/shut-off logic.
    pub fn add_heat(
        &mut self,
        tank: &mut Tank,
        env_t_c: f64,
        setpoint_c: f64,
        dt_min: f64,
    ) -> Result<Vec<MapWarning>, ConfigError> {
        match self.configuration {
            Configuration::Submerged | Configuration::Wrapped => {
                self.add_heat_integrated(tank, env_t_c, setpoint_c, dt_min)
            }
            Configuration::External {
                is_multipass: false,
                ..
            } => self.add_heat_external_single_pass(tank, env_t_c, setpoint_c, dt_min),
            Configuration::External {
                is_multipass: true, ..
            } => self.add_heat_external_multipass(tank, env_t_c, setpoint_c, dt_min),
        }
    }

    fn add_heat_integrated(
        &mut self,
        tank: &mut Tank,
        env_t_c: f64,
        setpoint_c: f64,
        dt_min: f64,
    ) -> Result<Vec<MapWarning>, ConfigError> {
        let condenser_t_c = self.coupled_temperature_c(tank);
        let (power_kw, cop, warnings) = self.evaluate_performance(env_t_c, condenser_t_c, None)?;
        let dq_kj = (power_kw * cop * dt_min * 60.0).max(0.0);

        let distribution = self.calc_heat_distribution(tank, setpoint_c);
        let leftover_kj = tank.add_heat_distributed(&distribution, dq_kj, self.max_setpoint_c);
        let absorbed_kj = dq_kj - leftover_kj;

        let runtime_min = if dq_kj > 0.0 {
            (absorbed_kj / dq_kj * dt_min).clamp(0.0, dt_min)
        } else {
            0.0
        };
        self.state
            .accumulate(runtime_min, power_kw * runtime_min * 60.0, absorbed_kj);
        if leftover_kj > 1e-9 {
            self.state.mark_maxed_out();
        }

        Ok(warnings)
    }

    fn add_heat_external_single_pass(
        &mut self,
        tank: &mut Tank,
        env_t_c: f64,
        setpoint_c: f64,
        dt_min: f64,
    ) -> Result<Vec<MapWarning>, ConfigError> {
        let Configuration::External {
            inlet_height,
            outlet_height,
            ..
        } = self.configuration
        else {
            unreachable!("single-pass dispatch only reaches External configurations");
        };
        let target_t_c = setpoint_c.min(self.max_setpoint_c);
        let lo = inlet_height.min(outlet_height).min(tank.n_nodes() - 1);
        let hi = inlet_height.max(outlet_height).min(tank.n_nodes() - 1);

        let mut remaining_min = dt_min;
        let mut all_warnings = Vec::new();
        let mut active_min = 0.0;
        let mut energy_in_kj = 0.0;
        let mut energy_out_kj = 0.0;

        while remaining_min > 1e-9 {
            let outlet_t_c = tank.node_temperatures_c()[outlet_height.min(tank.n_nodes() - 1)];
            if target_t_c <= outlet_t_c + 1e-9 {
                break;
            }

            let (power_kw, cop, warnings) =
                self.evaluate_performance(env_t_c, outlet_t_c, Some(outlet_t_c))?;
            all_warnings.extend(warnings);
            if power_kw * cop <= 0.0 {
                break;
            }

            let region_q_kj: f64 = (lo..=hi)
                .map(|i| {
                    tank.node_capacitance_kj_per_c() * (target_t_c - tank.node_temperatures_c()[i]).max(0.0)
                })
                .sum();
            let available_kj = power_kw * cop * remaining_min * 60.0;
            let dq_kj = available_kj.min(region_q_kj);
            if dq_kj <= 1e-9 {
                break;
            }

            let leftover_kj = tank.add_heat_at_node(lo, dq_kj, target_t_c);
            tank.mix_inversions();
            let absorbed_kj = dq_kj - leftover_kj;
            let consumed_min = (absorbed_kj / (power_kw * cop) / 60.0).min(remaining_min);

            energy_in_kj += power_kw * consumed_min * 60.0;
            energy_out_kj += absorbed_kj;
            active_min += consumed_min;
            remaining_min -= consumed_min;

            if consumed_min <= 1e-9 {
                break;
            }
        }

        self.finish_external_pass(active_min, energy_in_kj, energy_out_kj, dt_min);
        Ok(all_warnings)
    }

    fn add_heat_external_multipass(
        &mut self,
        tank: &mut Tank,
        env_t_c: f64,
        setpoint_c: f64,
        dt_min: f64,
    ) -> Result<Vec<MapWarning>, ConfigError> {
        let Configuration::External {
            outlet_height,
            mp_flow_rate_l_per_min,
            ..
        } = self.configuration
        else {
            unreachable!("multipass dispatch only reaches External configurations");
        };
        let target_t_c = setpoint_c.min(self.max_setpoint_c);
        let outlet_node = outlet_height.min(tank.n_nodes() - 1);
        let node_volume_l = tank.volume_l() / tank.n_nodes() as f64;

        let mut remaining_min = dt_min;
        let mut all_warnings = Vec::new();
        let mut active_min = 0.0;
        let mut energy_in_kj = 0.0;
        let mut energy_out_kj = 0.0;

        while remaining_min > 1e-9 {
            let outlet_t_c = tank.node_temperatures_c()[outlet_node];
            if target_t_c <= outlet_t_c + 1e-9 {
                break;
            }

            let (power_kw, cop, warnings) =
                self.evaluate_performance(env_t_c, outlet_t_c, Some(outlet_t_c))?;
            all_warnings.extend(warnings);
            if power_kw * cop <= 0.0 {
                break;
            }

            let pass_time_min = (node_volume_l / mp_flow_rate_l_per_min).min(remaining_min);
            let dq_kj = power_kw * cop * pass_time_min * 60.0;
            let leftover_kj = tank.add_heat_at_node(outlet_node, dq_kj, target_t_c);
            tank.mix_inversions();

            let absorbed_kj = dq_kj - leftover_kj;
            let consumed_min = (absorbed_kj / (power_kw * cop) / 60.0).min(pass_time_min);

            energy_in_kj += power_kw * consumed_min * 60.0;
            energy_out_kj += absorbed_kj;
            active_min += consumed_min;
            remaining_min -= pass_time_min;

            if consumed_min <= 1e-9 {
                break;
            }
        }

        self.finish_external_pass(active_min, energy_in_kj, energy_out_kj, dt_min);
        Ok(all_warnings)
    }

    fn finish_external_pass(
        &mut self,
        active_min: f64,
        energy_in_kj: f64,
        energy_out_kj: f64,
        dt_min: f64,
    ) {
        let runtime_min = active_min.clamp(0.0, dt_min);
        self.state.accumulate(runtime_min, energy_in_kj, energy_out_kj);
        if runtime_min >= dt_min - 1e-9 && active_min > 0.0 {
            self.state.mark_maxed_out();
        }
    }
}

fn weighted_average(node_temps_c: &[f64], weights: &[f64]) -> f64 {
    let num: f64 = node_temps_c.iter().zip(weights).map(|(t, w)| t * w).sum();
    let den: f64 = weights.iter().sum();
    if den.abs() < f64::EPSILON {
        0.0
    } else {
        num / den
    }
}

/// Converts a specific heat flow rate given in kJ/(min*C) from a flow rate
/// and water's specific heat; exposed for callers deriving a multipass
/// per-pass temperature rise outside this module's loop.
#[must_use]
pub fn flow_capacitance_kj_per_min_c(flow_rate_l_per_min: f64) -> f64 {
    flow_rate_l_per_min * SPECIFIC_HEAT_WATER_KJ_PER_L_C
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance_map::{Axis, Extrapolation, Interpolation};
    use crate::tank::TankConfig;
    use approx::assert_relative_eq;

    fn flat_map(power_kw: f64, cop: f64) -> PerformanceMap {
        let axis_env = Axis::new(vec![-20.0, 50.0], Interpolation::Linear, Extrapolation::Clamp).unwrap();
        let axis_source = Axis::new(vec![0.0, 80.0], Interpolation::Linear, Extrapolation::Clamp).unwrap();
        PerformanceMap::grid_2d(
            axis_env,
            axis_source,
            vec![vec![power_kw; 2]; 2],
            vec![vec![cop; 2]; 2],
        )
        .unwrap()
    }

    fn tank(n: usize, t_c: f64) -> Tank {
        let config = TankConfig::new(n, 315.0, 0.0, 0.0).unwrap();
        Tank::new(&config, t_c).unwrap()
    }

    #[test]
    fn submerged_uses_condensity_directly_as_its_distribution() {
        let mut condensity = vec![0.0; 12];
        condensity[0] = 1.0;
        let t = tank(12, 20.0);
        let c = Condenser::new(
            "hp",
            12,
            &condensity,
            Configuration::Submerged,
            flat_map(0.5, 3.0),
            60.0,
            -100.0,
            100.0,
            0.0,
            1.0,
        )
        .unwrap();
        let dist = c.calc_heat_distribution(&t, 51.7);
        assert_relative_eq!(dist[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn integrated_heat_addition_raises_the_tank_and_caps_at_max_setpoint() {
        let mut t = tank(12, 20.0);
        let mut c = Condenser::new(
            "hp",
            12,
            &vec![1.0; 12],
            Configuration::Submerged,
            flat_map(0.5, 3.0),
            45.0,
            -100.0,
            100.0,
            0.0,
            1.0,
        )
        .unwrap();
        c.add_heat(&mut t, 20.0, 51.7, 600.0).unwrap();
        assert!(t.node_temperatures_c().iter().all(|&v| v <= 45.0 + 1e-6));
        assert!(c.state().energy_out_kj() > 0.0);
    }

    #[test]
    fn low_airflow_derates_cop_but_not_below_the_intercept_floor() {
        let c = Condenser::new(
            "hp",
            12,
            &vec![1.0; 12],
            Configuration::Submerged,
            flat_map(0.5, 3.0),
            60.0,
            -100.0,
            100.0,
            0.0,
            0.5,
        )
        .unwrap();
        let (_, cop, _) = c.evaluate_performance(20.0, 40.0, None).unwrap();
        let expected = 3.0 * (LOW_AIRFLOW_COP_SLOPE * (LOW_AIRFLOW_COP_SCALE * 0.5) + LOW_AIRFLOW_COP_INTERCEPT);
        assert_relative_eq!(cop, expected, epsilon = 1e-9);
    }

    #[test]
    fn external_single_pass_heats_the_coupled_range_toward_target() {
        let mut t = tank(96, 20.0);
        let mut c = Condenser::new(
            "hp",
            96,
            &vec![1.0; 12],
            Configuration::External {
                is_multipass: false,
                inlet_height: 0,
                outlet_height: 95,
                mp_flow_rate_l_per_min: 0.0,
            },
            flat_map(1.0, 3.0),
            66.0,
            -100.0,
            100.0,
            0.0,
            1.0,
        )
        .unwrap();
        c.add_heat(&mut t, 20.0, 65.0, 60.0).unwrap();
        assert!(t.node_temperatures_c()[0] > 20.0);
        assert!(t.node_temperatures_c().iter().all(|&v| v <= 66.0 + 1e-6));
        assert!(c.state().runtime_min() > 0.0);
    }

    #[test]
    fn defrost_map_has_no_effect_outside_its_declared_range() {
        let map = DefrostMap::standard(0.8865);
        assert_relative_eq!(map.derate(30.0), 1.0, epsilon = 1e-9);
    }
}
