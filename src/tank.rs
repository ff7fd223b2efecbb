//! Stratified-tank thermal model.
//!
//! [`Tank`] is a one-dimensional finite-volume model of `n` equal-volume
//! nodes, node 0 at the bottom and node `n - 1` at the top. Temperatures are
//! carried in degrees Celsius, volumes in liters, and energies in kilojoules
//! throughout — the single internal scale config loaders and CLI front ends
//! are expected to convert to and from at their own boundary.
//!
//! Node capacitance `Cn` (kJ/°C) is uniform across nodes and derives from
//! tank volume and water's specific heat. A step mutates the tank in a fixed
//! order — draw advection and losses, then heat addition, then inversion
//! mixing — mirroring [`crate::engine`]'s per-step ordering.

mod conduction;
mod config;
mod draw;
mod error;
mod heat;
mod mixing;

pub use config::TankConfig;
pub use draw::DrawInput;
pub use error::TankError;

/// Specific heat capacity of water, in kJ per liter per degree Celsius.
pub(crate) const SPECIFIC_HEAT_WATER_KJ_PER_L_C: f64 = 4.184;

/// A stratified tank of `n` equal-volume nodes.
#[derive(Debug, Clone)]
pub struct Tank {
    node_temps_c: Vec<f64>,
    volume_l: f64,
    node_capacitance_kj_per_c: f64,
    ua_kw_per_c: f64,
    fittings_ua_kw_per_c: f64,
    primary_inlet_height: usize,
    secondary_inlet_height: Option<usize>,
    mixes_on_draw: bool,
    do_inversion_mixing: bool,
    do_conduction: bool,
    conduction_conductance_kw_per_c: f64,
    has_heat_exchanger: bool,
    heat_exchanger_effectiveness: Option<f64>,
    standby_loss_kj: f64,
}

impl Tank {
    /// Builds a tank at uniform temperature `initial_temp_c` from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TankError::NonFiniteTemperature`] if `initial_temp_c` is NaN
    /// or infinite.
    pub fn new(config: &TankConfig, initial_temp_c: f64) -> Result<Self, TankError> {
        if !initial_temp_c.is_finite() {
            return Err(TankError::NonFiniteTemperature {
                node: 0,
                value: initial_temp_c,
            });
        }

        let n_nodes = config.n_nodes();
        let node_capacitance_kj_per_c =
            config.volume_l() / n_nodes as f64 * SPECIFIC_HEAT_WATER_KJ_PER_L_C;

        Ok(Self {
            node_temps_c: vec![initial_temp_c; n_nodes],
            volume_l: config.volume_l(),
            node_capacitance_kj_per_c,
            ua_kw_per_c: config.ua_kw_per_c(),
            fittings_ua_kw_per_c: config.fittings_ua_kw_per_c(),
            primary_inlet_height: config.primary_inlet_height(),
            secondary_inlet_height: config.secondary_inlet_height(),
            mixes_on_draw: config.mixes_on_draw(),
            do_inversion_mixing: config.do_inversion_mixing(),
            do_conduction: config.do_conduction(),
            conduction_conductance_kw_per_c: config.conduction_conductance_kw_per_c(),
            has_heat_exchanger: config.has_heat_exchanger(),
            heat_exchanger_effectiveness: config.heat_exchanger_effectiveness(),
            standby_loss_kj: 0.0,
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.node_temps_c.len()
    }

    /// Node capacitance, in kJ per degree Celsius, uniform across nodes.
    #[must_use]
    pub fn node_capacitance_kj_per_c(&self) -> f64 {
        self.node_capacitance_kj_per_c
    }

    /// Total tank volume, in liters.
    #[must_use]
    pub fn volume_l(&self) -> f64 {
        self.volume_l
    }

    /// Current node temperatures, bottom (index 0) to top.
    #[must_use]
    pub fn node_temperatures_c(&self) -> &[f64] {
        &self.node_temps_c
    }

    /// Overwrites node temperatures directly, bypassing the draw/heat path.
    ///
    /// Used to seed scenarios (e.g. manually-set inversions for a mixing
    /// test) rather than as part of ordinary simulation.
    ///
    /// # Errors
    ///
    /// Returns [`TankError::InvalidNodeIndex`] if `temps.len()` does not
    /// match [`Tank::n_nodes`], or [`TankError::NonFiniteTemperature`] if any
    /// entry is NaN or infinite.
    pub fn set_node_temperatures_c(&mut self, temps: &[f64]) -> Result<(), TankError> {
        if temps.len() != self.n_nodes() {
            return Err(TankError::InvalidNodeIndex {
                index: temps.len(),
                n: self.n_nodes(),
            });
        }
        for (i, &t) in temps.iter().enumerate() {
            if !t.is_finite() {
                return Err(TankError::NonFiniteTemperature { node: i, value: t });
            }
        }
        self.node_temps_c.copy_from_slice(temps);
        Ok(())
    }

    /// Mean node temperature.
    #[must_use]
    pub fn mean_temperature_c(&self) -> f64 {
        self.node_temps_c.iter().sum::<f64>() / self.n_nodes() as f64
    }

    /// Top-node temperature, the effective outlet temperature on a draw.
    #[must_use]
    pub fn top_temperature_c(&self) -> f64 {
        *self.node_temps_c.last().unwrap_or(&0.0)
    }

    /// Total heat content relative to 0 °C, `Σ Cn·T[i]`.
    #[must_use]
    pub fn heat_content_kj(&self) -> f64 {
        self.node_capacitance_kj_per_c * self.node_temps_c.iter().sum::<f64>()
    }

    /// Standby loss energy recorded by the most recent
    /// [`Tank::advect_draw_and_lose`] call, in kJ.
    #[must_use]
    pub fn standby_loss_kj(&self) -> f64 {
        self.standby_loss_kj
    }

    /// Samples `k` equally-spaced virtual thermocouples across the tank
    /// height, for step-output reporting.
    #[must_use]
    pub fn sample_thermocouples_c(&self, k: usize) -> Vec<f64> {
        if k == 0 {
            return Vec::new();
        }
        let n = self.n_nodes();
        (0..k)
            .map(|i| {
                let frac = (i as f64 + 0.5) / k as f64;
                let idx = ((frac * n as f64).floor() as usize).min(n - 1);
                self.node_temps_c[idx]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_tank(n: usize, t_c: f64) -> Tank {
        let config = TankConfig::new(n, 189.0, 0.0, 0.0).unwrap();
        Tank::new(&config, t_c).unwrap()
    }

    #[test]
    fn heat_content_matches_uniform_temperature() {
        let tank = uniform_tank(12, 20.0);
        let expected = tank.node_capacitance_kj_per_c() * 12.0 * 20.0;
        assert!((tank.heat_content_kj() - expected).abs() < 1e-9);
    }

    #[test]
    fn sample_thermocouples_spans_the_tank() {
        let tank = uniform_tank(12, 40.0);
        let samples = tank.sample_thermocouples_c(4);
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|&t| (t - 40.0).abs() < 1e-9));
    }

    #[test]
    fn rejects_wrong_length_overwrite() {
        let mut tank = uniform_tank(12, 20.0);
        assert!(tank.set_node_temperatures_c(&[1.0, 2.0]).is_err());
    }
}
