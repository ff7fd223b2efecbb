//! # HPWH Core
//!
//! Simulation core for a stratified-tank heat-pump water heater: a
//! finite-volume tank model coupled to polymorphic heat sources (resistance
//! elements and vapor-compression condensers) driven by declarative heating
//! logic and a minute-resolution dispatcher.
//!
//! ## Crate layout
//!
//! - [`tank`]: Stratified node temperatures, draw advection, mixing,
//!   conduction, and ambient losses.
//! - [`performance_map`]: Multi-axis grid and legacy polynomial
//!   interpolation of heat-source (input power, COP).
//! - [`heat_source`]: The [`heat_source::HeatSource`] enum (resistance and
//!   condenser variants) and their shared engagement/logic state.
//! - [`heating_logic`]: Weighted-region temperature and state-of-charge
//!   turn-on / shut-off predicates.
//! - [`engine`]: The per-step dispatcher ([`engine::Engine::run_one_step`])
//!   that orchestrates the above under demand-response rules.
//! - [`metrics`]: First-hour rating and 24-hour UEF test procedures.
//! - [`support`]: Numeric constraints, resampling, and the
//!   [`support::courier::Courier`] diagnostics interface.
//!
//! This crate is the simulation core only. Loading named presets from a
//! file or database, a command-line front end, and CSV/debug output
//! formatting are the responsibility of external collaborators and are out
//! of scope here.

pub mod engine;
pub mod error;
pub mod heat_source;
pub mod heating_logic;
pub mod metrics;
pub mod performance_map;
pub mod support;
pub mod tank;

pub use engine::{DrMode, Engine, EngineConfig, StepInput, StepOutput};
pub use error::Error;
pub use heat_source::{Condenser, HeatSource, Resistance};
pub use heating_logic::HeatingLogic;
pub use performance_map::PerformanceMap;
pub use tank::{Tank, TankConfig};
