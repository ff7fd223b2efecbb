use super::{Axis, Extrapolation, Interpolation, MapError, PerformanceMap};

/// One environment-temperature breakpoint of a legacy quadratic performance
/// fit: `inputPower` and `COP` are each `c0 + c1·x + c2·x²` in the
/// heat-source (condenser) temperature `x`.
#[derive(Debug, Clone, Copy)]
pub struct PolynomialPoint {
    pub env_t: f64,
    pub input_power_coeffs: [f64; 3],
    pub cop_coeffs: [f64; 3],
}

/// A legacy per-environment-temperature quadratic performance fit.
///
/// Superseded by [`PerformanceMap::Grid2D`]/[`PerformanceMap::Grid3D`] but
/// kept as an alternative value source with an identical evaluation
/// contract: some presets still encode performance this way. Points are
/// sorted by `env_t` at construction; a single point applies at every
/// environment temperature (no interpolation axis).
#[derive(Debug, Clone)]
pub struct PolynomialMap {
    points: Vec<PolynomialPoint>,
}

impl PolynomialMap {
    /// Builds a polynomial map from its environment-temperature breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyPolynomial`] if `points` is empty.
    pub fn new(mut points: Vec<PolynomialPoint>) -> Result<Self, MapError> {
        if points.is_empty() {
            return Err(MapError::EmptyPolynomial);
        }
        points.sort_by(|a, b| a.env_t.partial_cmp(&b.env_t).unwrap());
        Ok(Self { points })
    }

    /// Evaluates `(inputPower, COP)` at `heat_source_t`, interpolating
    /// between the two environment-temperature breakpoints bracketing
    /// `env_t` (or using the sole point if only one is configured).
    #[must_use]
    pub fn evaluate(&self, env_t: f64, heat_source_t: f64) -> (f64, f64) {
        if self.points.len() == 1 {
            let p = &self.points[0];
            return (
                quadratic(p.input_power_coeffs, heat_source_t),
                quadratic(p.cop_coeffs, heat_source_t),
            );
        }

        let n = self.points.len();
        if env_t <= self.points[0].env_t {
            let p = &self.points[0];
            return (
                quadratic(p.input_power_coeffs, heat_source_t),
                quadratic(p.cop_coeffs, heat_source_t),
            );
        }
        if env_t >= self.points[n - 1].env_t {
            let p = &self.points[n - 1];
            return (
                quadratic(p.input_power_coeffs, heat_source_t),
                quadratic(p.cop_coeffs, heat_source_t),
            );
        }

        let hi = self
            .points
            .iter()
            .position(|p| p.env_t >= env_t)
            .unwrap_or(n - 1);
        let lo = hi - 1;
        let (lo_p, hi_p) = (&self.points[lo], &self.points[hi]);
        let frac = (env_t - lo_p.env_t) / (hi_p.env_t - lo_p.env_t);

        let lo_power = quadratic(lo_p.input_power_coeffs, heat_source_t);
        let hi_power = quadratic(hi_p.input_power_coeffs, heat_source_t);
        let lo_cop = quadratic(lo_p.cop_coeffs, heat_source_t);
        let hi_cop = quadratic(hi_p.cop_coeffs, heat_source_t);

        (
            lo_power + (hi_power - lo_power) * frac,
            lo_cop + (hi_cop - lo_cop) * frac,
        )
    }

    /// Converts this polynomial fit into a [`PerformanceMap::Grid2D`] by
    /// evaluating it at each environment breakpoint crossed with
    /// `heat_source_breakpoints`.
    ///
    /// Grid-based consumers (anything that needs axis-wise interpolation or
    /// extrapolation policy rather than the polynomial's fixed behavior)
    /// call this to get a grid lazily, without the map owner needing to
    /// carry both representations.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::AxisTooShort`] if fewer than two breakpoints are
    /// given for either axis, and propagates axis construction errors.
    pub fn into_grid(self, heat_source_breakpoints: Vec<f64>) -> Result<PerformanceMap, MapError> {
        let env_breakpoints: Vec<f64> = self.points.iter().map(|p| p.env_t).collect();
        let env_breakpoints = if env_breakpoints.len() < 2 {
            // A single-point polynomial applies uniformly; duplicate the
            // breakpoint with an offset so the grid axis is well-formed.
            vec![env_breakpoints[0] - 1.0, env_breakpoints[0] + 1.0]
        } else {
            env_breakpoints
        };

        let axis_env = Axis::new(env_breakpoints.clone(), Interpolation::Linear, Extrapolation::Linear)?;
        let axis_source = Axis::new(
            heat_source_breakpoints.clone(),
            Interpolation::Cubic,
            Extrapolation::Linear,
        )?;

        let mut power = Vec::with_capacity(env_breakpoints.len());
        let mut cop = Vec::with_capacity(env_breakpoints.len());
        for &env_t in &env_breakpoints {
            let mut power_row = Vec::with_capacity(heat_source_breakpoints.len());
            let mut cop_row = Vec::with_capacity(heat_source_breakpoints.len());
            for &source_t in &heat_source_breakpoints {
                let (p, c) = self.evaluate(env_t, source_t);
                power_row.push(p);
                cop_row.push(c);
            }
            power.push(power_row);
            cop.push(cop_row);
        }

        Ok(PerformanceMap::Grid2D {
            axis_env,
            axis_source,
            power,
            cop,
        })
    }
}

fn quadratic(coeffs: [f64; 3], x: f64) -> f64 {
    coeffs[0] + coeffs[1] * x + coeffs[2] * x * x
}
