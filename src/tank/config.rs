use super::TankError;
use crate::support::constraint::{Constrained, NonNegative, StrictlyPositive};

/// Configuration for constructing a [`super::Tank`].
///
/// All quantities are in the simulation's internal scale (liters, degrees
/// Celsius, kW/°C for conductances). Converting from unit-bearing
/// configuration formats is a concern for the caller, not this crate.
#[derive(Debug, Clone)]
pub struct TankConfig {
    n_nodes: usize,
    volume_l: Constrained<f64, StrictlyPositive>,
    ua_kw_per_c: Constrained<f64, NonNegative>,
    fittings_ua_kw_per_c: Constrained<f64, NonNegative>,
    primary_inlet_height: usize,
    secondary_inlet_height: Option<usize>,
    mixes_on_draw: bool,
    do_inversion_mixing: bool,
    do_conduction: bool,
    conduction_conductance_kw_per_c: f64,
    has_heat_exchanger: bool,
    heat_exchanger_effectiveness: Option<f64>,
}

impl TankConfig {
    /// Builds a configuration for an `n_nodes`-node tank.
    ///
    /// Defaults: inlet at node 0, no secondary inlet, draw mixing and
    /// inversion mixing both on, conduction and a heat exchanger both off.
    /// Use the `with_*` builders to change any of these.
    ///
    /// # Errors
    ///
    /// Returns [`TankError::NodeCountInvalid`] if `n_nodes` is not a positive
    /// multiple of 12, [`TankError::NonPositiveVolume`] if `volume_l` is not
    /// strictly positive, or [`TankError::NegativeConductance`] if either
    /// conductance is negative.
    pub fn new(
        n_nodes: usize,
        volume_l: f64,
        ua_kw_per_c: f64,
        fittings_ua_kw_per_c: f64,
    ) -> Result<Self, TankError> {
        if n_nodes == 0 || n_nodes % 12 != 0 {
            return Err(TankError::NodeCountInvalid { n: n_nodes });
        }
        let volume_l = Constrained::<f64, StrictlyPositive>::new(volume_l)
            .map_err(|_| TankError::NonPositiveVolume)?;
        let ua_kw_per_c = Constrained::<f64, NonNegative>::new(ua_kw_per_c)
            .map_err(|_| TankError::NegativeConductance)?;
        let fittings_ua_kw_per_c = Constrained::<f64, NonNegative>::new(fittings_ua_kw_per_c)
            .map_err(|_| TankError::NegativeConductance)?;

        Ok(Self {
            n_nodes,
            volume_l,
            ua_kw_per_c,
            fittings_ua_kw_per_c,
            primary_inlet_height: 0,
            secondary_inlet_height: None,
            mixes_on_draw: true,
            do_inversion_mixing: true,
            do_conduction: false,
            conduction_conductance_kw_per_c: 0.0,
            has_heat_exchanger: false,
            heat_exchanger_effectiveness: None,
        })
    }

    /// Sets the node index at which the primary draw inlet enters.
    #[must_use]
    pub fn with_primary_inlet_height(mut self, node: usize) -> Self {
        self.primary_inlet_height = node;
        self
    }

    /// Enables a secondary draw inlet at the given node index.
    #[must_use]
    pub fn with_secondary_inlet(mut self, node: usize) -> Self {
        self.secondary_inlet_height = Some(node);
        self
    }

    /// Enables or disables bottom-third averaging on every nonzero draw.
    #[must_use]
    pub fn with_mixes_on_draw(mut self, mixes_on_draw: bool) -> Self {
        self.mixes_on_draw = mixes_on_draw;
        self
    }

    /// Enables or disables automatic inversion mixing after mutations.
    #[must_use]
    pub fn with_inversion_mixing(mut self, do_inversion_mixing: bool) -> Self {
        self.do_inversion_mixing = do_inversion_mixing;
        self
    }

    /// Enables inter-node conduction with the given node-to-node conductance.
    #[must_use]
    pub fn with_conduction(mut self, conductance_kw_per_c: f64) -> Self {
        self.do_conduction = true;
        self.conduction_conductance_kw_per_c = conductance_kw_per_c;
        self
    }

    /// Enables the built-in heat-exchanger draw path with the given
    /// effectiveness, bypassing ordinary node mixing for draws.
    #[must_use]
    pub fn with_heat_exchanger(mut self, effectiveness: f64) -> Self {
        self.has_heat_exchanger = true;
        self.heat_exchanger_effectiveness = Some(effectiveness);
        self
    }

    pub(crate) fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub(crate) fn volume_l(&self) -> f64 {
        self.volume_l.into_inner()
    }

    pub(crate) fn ua_kw_per_c(&self) -> f64 {
        self.ua_kw_per_c.into_inner()
    }

    pub(crate) fn fittings_ua_kw_per_c(&self) -> f64 {
        self.fittings_ua_kw_per_c.into_inner()
    }

    pub(crate) fn primary_inlet_height(&self) -> usize {
        self.primary_inlet_height
    }

    pub(crate) fn secondary_inlet_height(&self) -> Option<usize> {
        self.secondary_inlet_height
    }

    pub(crate) fn mixes_on_draw(&self) -> bool {
        self.mixes_on_draw
    }

    pub(crate) fn do_inversion_mixing(&self) -> bool {
        self.do_inversion_mixing
    }

    pub(crate) fn do_conduction(&self) -> bool {
        self.do_conduction
    }

    pub(crate) fn conduction_conductance_kw_per_c(&self) -> f64 {
        self.conduction_conductance_kw_per_c
    }

    pub(crate) fn has_heat_exchanger(&self) -> bool {
        self.has_heat_exchanger
    }

    pub(crate) fn heat_exchanger_effectiveness(&self) -> Option<f64> {
        self.heat_exchanger_effectiveness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_node_count_not_a_multiple_of_twelve() {
        assert_eq!(
            TankConfig::new(10, 189.0, 0.001, 0.0).unwrap_err(),
            TankError::NodeCountInvalid { n: 10 }
        );
    }

    #[test]
    fn rejects_nonpositive_volume() {
        assert_eq!(
            TankConfig::new(12, 0.0, 0.001, 0.0).unwrap_err(),
            TankError::NonPositiveVolume
        );
    }

    #[test]
    fn rejects_negative_conductance() {
        assert_eq!(
            TankConfig::new(12, 189.0, -0.001, 0.0).unwrap_err(),
            TankError::NegativeConductance
        );
    }
}
