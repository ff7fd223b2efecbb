//! Electric-resistance and heat-pump-condenser heat sources.
//!
//! [`HeatSource`] is a tagged enum over [`Resistance`] and [`Condenser`]
//! rather than a trait object: both variants share [`common::HeatSourceState`]
//! for engagement, lockout, and turn-on/shut-off logic, and keeping them as a
//! closed set lets an [`crate::engine::Engine`] address companions, backups,
//! and followers by plain index into its source list.

mod common;
mod condensity;
mod condenser;
mod error;
mod resistance;

pub use common::{Links, SourceIndex};
pub use condenser::{Condenser, Configuration, DefrostMap, ResistanceDefrost};
pub use error::ConfigError;
pub use resistance::Resistance;

use crate::heating_logic::{EvaluationContext, HeatingLogic};
use crate::performance_map::MapWarning;
use crate::tank::Tank;

/// A resistance element or heat-pump condenser.
#[derive(Debug, Clone)]
pub enum HeatSource {
    Resistance(Resistance),
    Condenser(Condenser),
}

impl HeatSource {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Resistance(r) => r.state().name(),
            Self::Condenser(c) => c.state().name(),
        }
    }

    #[must_use]
    pub fn is_engaged(&self) -> bool {
        match self {
            Self::Resistance(r) => r.state().is_engaged(),
            Self::Condenser(c) => c.state().is_engaged(),
        }
    }

    #[must_use]
    pub fn is_locked_out(&self) -> bool {
        match self {
            Self::Resistance(r) => r.state().is_locked_out(),
            Self::Condenser(c) => c.state().is_locked_out(),
        }
    }

    #[must_use]
    pub fn is_vip(&self) -> bool {
        match self {
            Self::Resistance(r) => r.state().is_vip(),
            Self::Condenser(c) => c.state().is_vip(),
        }
    }

    #[must_use]
    pub fn links(&self) -> Links {
        match self {
            Self::Resistance(r) => r.state().links(),
            Self::Condenser(c) => c.state().links(),
        }
    }

    #[must_use]
    pub fn runtime_min(&self) -> f64 {
        match self {
            Self::Resistance(r) => r.state().runtime_min(),
            Self::Condenser(c) => c.state().runtime_min(),
        }
    }

    #[must_use]
    pub fn energy_in_kj(&self) -> f64 {
        match self {
            Self::Resistance(r) => r.state().energy_in_kj(),
            Self::Condenser(c) => c.state().energy_in_kj(),
        }
    }

    #[must_use]
    pub fn energy_out_kj(&self) -> f64 {
        match self {
            Self::Resistance(r) => r.state().energy_out_kj(),
            Self::Condenser(c) => c.state().energy_out_kj(),
        }
    }

    pub fn engage(&mut self) {
        match self {
            Self::Resistance(r) => r.state_mut().engage(),
            Self::Condenser(c) => c.state_mut().engage(),
        }
    }

    pub fn disengage(&mut self) {
        match self {
            Self::Resistance(r) => r.state_mut().disengage(),
            Self::Condenser(c) => c.state_mut().disengage(),
        }
    }

    pub fn reset_step_accumulators(&mut self) {
        match self {
            Self::Resistance(r) => r.state_mut().reset_step_accumulators(),
            Self::Condenser(c) => c.state_mut().reset_step_accumulators(),
        }
    }

    /// Whether `env_t_c` should lock this source out, recording the result.
    pub fn to_lock_or_unlock(&mut self, env_t_c: f64, tank: &Tank) -> bool {
        match self {
            Self::Resistance(r) => {
                // Resistance elements have no environment-air coupling in
                // the usual sense; their min/max bounds still gate lockout
                // (e.g. a backup element disabled above some tank temperature).
                r.state_mut().to_lock_or_unlock(env_t_c, false)
            }
            Self::Condenser(c) => c.to_lock_or_unlock(env_t_c, tank),
        }
    }

    /// # Errors
    ///
    /// Propagates a turn-on logic evaluation error.
    pub fn should_heat(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, ConfigError> {
        match self {
            Self::Resistance(r) => r.state().should_heat(ctx, scheduled_mains_temp_c),
            Self::Condenser(c) => c.state().should_heat(ctx, scheduled_mains_temp_c),
        }
    }

    /// # Errors
    ///
    /// Propagates a standby logic evaluation error.
    pub fn standby_blocks_start(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, ConfigError> {
        match self {
            Self::Resistance(r) => r.state().standby_blocks_start(ctx, scheduled_mains_temp_c),
            Self::Condenser(c) => c.state().standby_blocks_start(ctx, scheduled_mains_temp_c),
        }
    }

    /// # Errors
    ///
    /// Propagates a shut-off logic evaluation error.
    pub fn shuts_off(
        &self,
        ctx: &EvaluationContext,
        scheduled_mains_temp_c: f64,
    ) -> Result<bool, ConfigError> {
        match self {
            Self::Resistance(r) => r.state().shuts_off(ctx, scheduled_mains_temp_c),
            Self::Condenser(c) => c.state().shuts_off(ctx, scheduled_mains_temp_c),
        }
    }

    pub fn add_turn_on_logic(&mut self, logic: impl Into<HeatingLogic>) {
        match self {
            Self::Resistance(r) => r.state_mut().add_turn_on_logic(logic),
            Self::Condenser(c) => c.state_mut().add_turn_on_logic(logic),
        }
    }

    pub fn add_shut_off_logic(&mut self, logic: impl Into<HeatingLogic>) {
        match self {
            Self::Resistance(r) => r.state_mut().add_shut_off_logic(logic),
            Self::Condenser(c) => c.state_mut().add_shut_off_logic(logic),
        }
    }

    pub fn set_links(&mut self, links: Links) {
        match self {
            Self::Resistance(r) => r.state_mut().set_links(links),
            Self::Condenser(c) => c.state_mut().set_links(links),
        }
    }

    pub fn set_vip(&mut self, is_vip: bool) {
        match self {
            Self::Resistance(r) => r.state_mut().set_vip(is_vip),
            Self::Condenser(c) => c.state_mut().set_vip(is_vip),
        }
    }

    /// Runs this source for `dt_min`, driven by `tank`.
    ///
    /// `max_temp_c` bounds a resistance element (ordinarily its tank's
    /// physical maximum); `env_t_c`/`setpoint_c` are only consulted by
    /// condensers.
    ///
    /// # Errors
    ///
    /// Propagates a performance-map or logic evaluation error.
    pub fn add_heat(
        &mut self,
        tank: &mut Tank,
        env_t_c: f64,
        setpoint_c: f64,
        max_temp_c: f64,
        dt_min: f64,
    ) -> Result<Vec<MapWarning>, ConfigError> {
        match self {
            Self::Resistance(r) => {
                r.add_heat(tank, max_temp_c, dt_min);
                Ok(Vec::new())
            }
            Self::Condenser(c) => c.add_heat(tank, env_t_c, setpoint_c, dt_min),
        }
    }
}

impl From<Resistance> for HeatSource {
    fn from(r: Resistance) -> Self {
        Self::Resistance(r)
    }
}

impl From<Condenser> for HeatSource {
    fn from(c: Condenser) -> Self {
        Self::Condenser(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tank::TankConfig;

    fn tank(n: usize) -> Tank {
        let config = TankConfig::new(n, 189.0, 0.0, 0.0).unwrap();
        Tank::new(&config, 20.0).unwrap()
    }

    #[test]
    fn resistance_variant_delegates_through_the_enum() {
        let mut source: HeatSource =
            Resistance::new("top", 12, 11, 4.5, -100.0, 100.0, 0.0).unwrap().into();
        let mut t = tank(12);
        assert!(!source.is_engaged());
        source.engage();
        assert!(source.is_engaged());
        source.add_heat(&mut t, 20.0, 51.7, 95.0, 10.0).unwrap();
        assert!(source.energy_out_kj() > 0.0);
    }
}
