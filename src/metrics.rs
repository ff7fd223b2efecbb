//! First-hour rating classification and the 24-hour uniform energy factor
//! (UEF) test procedure.
//!
//! Both run a real [`Engine`] through a draw schedule minute by minute and
//! derive their result from its reported energy flows and outlet
//! temperature, rather than re-deriving tank thermodynamics independently.

mod error;

pub use error::MetricsError;

use crate::engine::{Engine, StepInput};
use crate::tank::SPECIFIC_HEAT_WATER_KJ_PER_L_C;

/// DOE first-hour-rating capacity classification, by total liters delivered
/// above the usable-temperature threshold during the first simulated hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstHourRatingClass {
    VerySmall,
    Low,
    Medium,
    High,
}

impl FirstHourRatingClass {
    #[must_use]
    pub fn classify(total_draw_l: f64) -> Self {
        const VERY_SMALL_MAX_L: f64 = 68.0;
        const LOW_MAX_L: f64 = 193.0;
        const MEDIUM_MAX_L: f64 = 284.0;

        if total_draw_l <= VERY_SMALL_MAX_L {
            Self::VerySmall
        } else if total_draw_l <= LOW_MAX_L {
            Self::Low
        } else if total_draw_l <= MEDIUM_MAX_L {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstHourRatingResult {
    pub total_draw_l: f64,
    pub class: FirstHourRatingClass,
}

/// Runs 60 one-minute steps, drawing `draw_rate_l_per_min` of water at
/// `mains_temp_c` each minute as long as the tank's outlet (top-node)
/// temperature stays at or above `usable_temp_c`, and accumulating the
/// total volume delivered while usable.
///
/// Once the outlet drops below `usable_temp_c` the draw stops for the
/// remainder of the hour (recovery continues, but isn't credited).
///
/// # Errors
///
/// Propagates a [`crate::engine::StepError`] from any step.
pub fn first_hour_rating(
    engine: &mut Engine,
    mains_temp_c: f64,
    ambient_temp_c: f64,
    env_temp_c: f64,
    draw_rate_l_per_min: f64,
    usable_temp_c: f64,
) -> Result<FirstHourRatingResult, MetricsError> {
    let mut total_draw_l = 0.0;
    let mut still_usable = true;

    for _ in 0..60 {
        let draw_l = if still_usable && engine.tank().top_temperature_c() >= usable_temp_c {
            draw_rate_l_per_min
        } else {
            still_usable = false;
            0.0
        };

        let draw = crate::tank::DrawInput {
            volume_l: draw_l,
            inlet_temp_c: mains_temp_c,
            ..crate::tank::DrawInput::default()
        };

        let input = StepInput {
            dt_min: 1.0,
            ambient_temp_c,
            env_temp_c,
            mains_temp_c,
            draw,
            ..StepInput::default()
        };
        engine.run_one_step(&input)?;
        total_draw_l += draw_l;
    }

    Ok(FirstHourRatingResult {
        total_draw_l,
        class: FirstHourRatingClass::classify(total_draw_l),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UefResult {
    pub energy_consumed_kj: f64,
    pub energy_delivered_kj: f64,
    pub uef: f64,
}

/// Runs `schedule` (one [`StepInput`] per minute) through `engine`, summing
/// electrical energy consumed by every heat source against thermal energy
/// delivered by draws (volume times the temperature rise above each draw's
/// own inlet), and reports their ratio as the uniform energy factor.
///
/// # Errors
///
/// Returns [`MetricsError::EmptySchedule`] if `schedule` is empty, or
/// propagates a [`crate::engine::StepError`] from any step.
pub fn run_24_hour_uef(engine: &mut Engine, schedule: &[StepInput]) -> Result<UefResult, MetricsError> {
    if schedule.is_empty() {
        return Err(MetricsError::EmptySchedule);
    }

    let mut energy_consumed_kj = 0.0;
    let mut energy_delivered_kj = 0.0;

    for input in schedule {
        let outlet_before_c = engine.tank().top_temperature_c();
        let output = engine.run_one_step(input)?;

        energy_consumed_kj += output.source_energy_in_kj.iter().sum::<f64>();
        energy_delivered_kj +=
            input.draw.volume_l * SPECIFIC_HEAT_WATER_KJ_PER_L_C * (outlet_before_c - input.draw.inlet_temp_c).max(0.0);
        if input.draw.secondary_volume_l > 0.0 {
            energy_delivered_kj += input.draw.secondary_volume_l
                * SPECIFIC_HEAT_WATER_KJ_PER_L_C
                * (outlet_before_c - input.draw.secondary_inlet_temp_c).max(0.0);
        }
    }

    let uef = if energy_consumed_kj > 0.0 {
        energy_delivered_kj / energy_consumed_kj
    } else {
        0.0
    };

    Ok(UefResult {
        energy_consumed_kj,
        energy_delivered_kj,
        uef,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::heat_source::Resistance;
    use crate::heating_logic::{Comparator, HeatingLogic, TemperatureLogic};
    use crate::tank::{Tank, TankConfig};

    fn engine_with_one_resistance() -> Engine {
        let tank_config = TankConfig::new(12, 189.0, 0.0, 0.0).unwrap();
        let tank = Tank::new(&tank_config, 51.7).unwrap();
        let mut resistance = Resistance::new("top", 12, 11, 4.5, -100.0, 100.0, 0.0).unwrap();
        let logic: HeatingLogic = TemperatureLogic::top_third(12, 5.0, Comparator::Greater).into();
        resistance.state_mut().add_turn_on_logic(logic);
        let config = EngineConfig::new(51.7, 99.0);
        Engine::new(tank, vec![resistance.into()], config)
    }

    #[test]
    fn a_full_tank_classifies_above_very_small() {
        let mut engine = engine_with_one_resistance();
        let result = first_hour_rating(&mut engine, 10.0, 20.0, 20.0, 9.46, 40.0).unwrap();
        assert!(result.total_draw_l > 0.0);
    }

    #[test]
    fn uef_rejects_an_empty_schedule() {
        let mut engine = engine_with_one_resistance();
        assert_eq!(run_24_hour_uef(&mut engine, &[]).unwrap_err(), MetricsError::EmptySchedule);
    }

    #[test]
    fn uef_is_positive_for_a_schedule_with_a_draw() {
        let mut engine = engine_with_one_resistance();
        let draw = crate::tank::DrawInput {
            volume_l: 10.0,
            inlet_temp_c: 10.0,
            ..crate::tank::DrawInput::default()
        };
        let schedule = vec![StepInput {
            dt_min: 1.0,
            draw,
            ..StepInput::default()
        }];
        let result = run_24_hour_uef(&mut engine, &schedule).unwrap();
        assert!(result.energy_delivered_kj > 0.0);
    }
}
