use crate::performance_map::MapWarning;
use crate::tank::DrawInput;

use super::dr_mode::DrMode;

/// One minute-resolution step's inputs.
#[derive(Debug, Clone)]
pub struct StepInput {
    pub dt_min: f64,
    pub ambient_temp_c: f64,
    pub env_temp_c: f64,
    pub mains_temp_c: f64,
    pub draw: DrawInput,
    pub dr_mode: DrMode,
}

impl Default for StepInput {
    fn default() -> Self {
        Self {
            dt_min: 1.0,
            ambient_temp_c: 20.0,
            env_temp_c: 20.0,
            mains_temp_c: 10.0,
            draw: DrawInput::default(),
            dr_mode: DrMode::allow(),
        }
    }
}

/// One step's results.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub tank_mean_c: f64,
    pub tank_top_c: f64,
    pub thermocouples_c: Vec<f64>,
    pub standby_loss_kj: f64,
    pub engaged_sources: Vec<usize>,
    pub source_runtime_min: Vec<f64>,
    pub source_energy_in_kj: Vec<f64>,
    pub source_energy_out_kj: Vec<f64>,
    pub warnings: Vec<MapWarning>,
}
