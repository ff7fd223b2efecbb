//! Multi-axis interpolation of heat-source performance.
//!
//! A [`PerformanceMap`] gives `(inputPower, COP)` as a function of
//! environment (evaporator-air) temperature and heat-source (condenser)
//! temperature — two axes for integrated condensers, plus an outlet-water
//! temperature axis for external configurations. [`polynomial::PolynomialMap`]
//! is an alternative, older value source with the same evaluation contract;
//! it converts lazily into a [`PerformanceMap::Grid2D`] via
//! [`polynomial::PolynomialMap::into_grid`] when a grid-based consumer needs
//! axis-wise interpolation/extrapolation policy it doesn't otherwise carry.

mod axis;
mod error;
mod polynomial;

pub use axis::{Axis, Extrapolation, Interpolation};
use axis::interpolate_1d;
pub use error::MapError;
pub use polynomial::{PolynomialMap, PolynomialPoint};

/// A non-fatal condition surfaced while evaluating a [`PerformanceMap`].
///
/// The map itself has no name and no courier; callers (concrete heat
/// sources) attach their own name and forward these to
/// [`crate::support::courier::Courier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapWarning {
    /// An input fell outside the axis's declared breakpoints.
    Extrapolated { axis: &'static str, value: f64 },
    /// Evaluated COP was below 1 but nonnegative.
    LowCop { cop: f64 },
    /// Evaluated COP was negative.
    NegativeCop { cop: f64 },
}

/// Tabulated or fitted heat-source performance.
#[derive(Debug, Clone)]
pub enum PerformanceMap {
    /// Two-axis grid: environment temperature by heat-source temperature.
    /// Used by submerged and wrapped condensers.
    Grid2D {
        axis_env: Axis,
        axis_source: Axis,
        power: Vec<Vec<f64>>,
        cop: Vec<Vec<f64>>,
    },
    /// Three-axis grid, adding an outlet-water-temperature axis. Used by
    /// external condensers.
    Grid3D {
        axis_env: Axis,
        axis_source: Axis,
        axis_outlet: Axis,
        power: Vec<Vec<Vec<f64>>>,
        cop: Vec<Vec<Vec<f64>>>,
    },
    /// A legacy per-environment-temperature quadratic fit.
    Polynomial(PolynomialMap),
}

impl PerformanceMap {
    /// Builds a two-axis grid map.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DimensionMismatch`] if `power`/`cop` dimensions
    /// don't match the axes.
    pub fn grid_2d(
        axis_env: Axis,
        axis_source: Axis,
        power: Vec<Vec<f64>>,
        cop: Vec<Vec<f64>>,
    ) -> Result<Self, MapError> {
        if power.len() != axis_env.len()
            || cop.len() != axis_env.len()
            || power.iter().any(|row| row.len() != axis_source.len())
            || cop.iter().any(|row| row.len() != axis_source.len())
        {
            return Err(MapError::DimensionMismatch);
        }
        Ok(Self::Grid2D {
            axis_env,
            axis_source,
            power,
            cop,
        })
    }

    /// Builds a three-axis grid map for external configurations.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DimensionMismatch`] if `power`/`cop` dimensions
    /// don't match the axes.
    pub fn grid_3d(
        axis_env: Axis,
        axis_source: Axis,
        axis_outlet: Axis,
        power: Vec<Vec<Vec<f64>>>,
        cop: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self, MapError> {
        let dims_ok = |grid: &Vec<Vec<Vec<f64>>>| {
            grid.len() == axis_env.len()
                && grid.iter().all(|plane| {
                    plane.len() == axis_source.len()
                        && plane.iter().all(|row| row.len() == axis_outlet.len())
                })
        };
        if !dims_ok(&power) || !dims_ok(&cop) {
            return Err(MapError::DimensionMismatch);
        }
        Ok(Self::Grid3D {
            axis_env,
            axis_source,
            axis_outlet,
            power,
            cop,
        })
    }

    /// Evaluates `(inputPower, COP)` at the given conditions.
    ///
    /// `outlet_t` is required (and only used) for [`PerformanceMap::Grid3D`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingOutletAxis`] if this is a 3-axis map and
    /// `outlet_t` is `None`.
    pub fn evaluate(
        &self,
        env_t: f64,
        heat_source_t: f64,
        outlet_t: Option<f64>,
    ) -> Result<(f64, f64, Vec<MapWarning>), MapError> {
        let mut warnings = Vec::new();
        let (power, cop) = match self {
            Self::Grid2D {
                axis_env,
                axis_source,
                power,
                cop,
            } => {
                let p = bilinear(axis_env, axis_source, power, env_t, heat_source_t, &mut warnings);
                let c = bilinear(axis_env, axis_source, cop, env_t, heat_source_t, &mut warnings);
                (p, c)
            }
            Self::Grid3D {
                axis_env,
                axis_source,
                axis_outlet,
                power,
                cop,
            } => {
                let outlet_t = outlet_t.ok_or(MapError::MissingOutletAxis)?;
                let p = trilinear(
                    axis_env,
                    axis_source,
                    axis_outlet,
                    power,
                    env_t,
                    heat_source_t,
                    outlet_t,
                    &mut warnings,
                );
                let c = trilinear(
                    axis_env,
                    axis_source,
                    axis_outlet,
                    cop,
                    env_t,
                    heat_source_t,
                    outlet_t,
                    &mut warnings,
                );
                (p, c)
            }
            Self::Polynomial(poly) => poly.evaluate(env_t, heat_source_t),
        };

        if cop < 0.0 {
            warnings.push(MapWarning::NegativeCop { cop });
        } else if cop < 1.0 {
            warnings.push(MapWarning::LowCop { cop });
        }

        Ok((power, cop, warnings))
    }
}

fn bilinear(
    axis_env: &Axis,
    axis_source: &Axis,
    grid: &[Vec<f64>],
    env_t: f64,
    source_t: f64,
    warnings: &mut Vec<MapWarning>,
) -> f64 {
    let mut column = Vec::with_capacity(grid.len());
    for (i, row) in grid.iter().enumerate() {
        let (y, extrapolated) = interpolate_1d(axis_source, row, source_t);
        if i == 0 {
            if let Some(value) = extrapolated {
                warnings.push(MapWarning::Extrapolated {
                    axis: "heat_source",
                    value,
                });
            }
        }
        column.push(y);
    }
    let (y, extrapolated) = interpolate_1d(axis_env, &column, env_t);
    if let Some(value) = extrapolated {
        warnings.push(MapWarning::Extrapolated { axis: "env", value });
    }
    y
}

#[allow(clippy::too_many_arguments)]
fn trilinear(
    axis_env: &Axis,
    axis_source: &Axis,
    axis_outlet: &Axis,
    grid: &[Vec<Vec<f64>>],
    env_t: f64,
    source_t: f64,
    outlet_t: f64,
    warnings: &mut Vec<MapWarning>,
) -> f64 {
    let mut env_column = Vec::with_capacity(grid.len());
    for (i, plane) in grid.iter().enumerate() {
        let mut source_column = Vec::with_capacity(plane.len());
        for (j, row) in plane.iter().enumerate() {
            let (y, extrapolated) = interpolate_1d(axis_outlet, row, outlet_t);
            if i == 0 && j == 0 {
                if let Some(value) = extrapolated {
                    warnings.push(MapWarning::Extrapolated {
                        axis: "outlet",
                        value,
                    });
                }
            }
            source_column.push(y);
        }
        let (y, extrapolated) = interpolate_1d(axis_source, &source_column, source_t);
        if i == 0 {
            if let Some(value) = extrapolated {
                warnings.push(MapWarning::Extrapolated {
                    axis: "heat_source",
                    value,
                });
            }
        }
        env_column.push(y);
    }
    let (y, extrapolated) = interpolate_1d(axis_env, &env_column, env_t);
    if let Some(value) = extrapolated {
        warnings.push(MapWarning::Extrapolated { axis: "env", value });
    }
    y
}
