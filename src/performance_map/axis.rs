use super::MapError;

/// Per-axis interpolation method between declared breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Piecewise-linear between adjacent breakpoints.
    Linear,
    /// Catmull-Rom cubic through the two bracketing breakpoints and their
    /// neighbors, falling back to linear at the ends of the axis.
    Cubic,
}

/// Per-axis policy for values outside the declared breakpoint range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extrapolation {
    /// Continue the line formed by the two outermost breakpoints.
    Linear,
    /// Hold the value at the nearest breakpoint.
    Clamp,
}

/// A strictly increasing set of breakpoints with an interpolation and
/// extrapolation policy.
#[derive(Debug, Clone)]
pub struct Axis {
    pub(super) breakpoints: Vec<f64>,
    pub(super) interpolation: Interpolation,
    pub(super) extrapolation: Extrapolation,
}

impl Axis {
    /// Builds an axis from breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::AxisTooShort`] if fewer than two breakpoints are
    /// given, or [`MapError::AxisNotMonotonic`] if they are not strictly
    /// increasing.
    pub fn new(
        breakpoints: Vec<f64>,
        interpolation: Interpolation,
        extrapolation: Extrapolation,
    ) -> Result<Self, MapError> {
        if breakpoints.len() < 2 {
            return Err(MapError::AxisTooShort);
        }
        if !breakpoints.windows(2).all(|w| w[1] > w[0]) {
            return Err(MapError::AxisNotMonotonic);
        }
        Ok(Self {
            breakpoints,
            interpolation,
            extrapolation,
        })
    }

    /// Number of breakpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// True if the axis has no breakpoints (never true after [`Axis::new`]
    /// succeeds; kept for the `len`/`is_empty` pairing clippy expects).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    #[must_use]
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }
}

/// Interpolates `values` (one per breakpoint of `axis`) at `x`, returning the
/// result and, if `x` fell outside the breakpoint range, the value it was
/// evaluated at for warning purposes.
pub(super) fn interpolate_1d(axis: &Axis, values: &[f64], x: f64) -> (f64, Option<f64>) {
    let bp = &axis.breakpoints;
    let n = bp.len();

    if x < bp[0] {
        let y = match axis.extrapolation {
            Extrapolation::Clamp => values[0],
            Extrapolation::Linear => linear_at(bp[0], values[0], bp[1], values[1], x),
        };
        return (y, Some(x));
    }
    if x > bp[n - 1] {
        let y = match axis.extrapolation {
            Extrapolation::Clamp => values[n - 1],
            Extrapolation::Linear => linear_at(bp[n - 2], values[n - 2], bp[n - 1], values[n - 1], x),
        };
        return (y, Some(x));
    }

    let segment = match bp.binary_search_by(|v| v.partial_cmp(&x).unwrap()) {
        Ok(idx) => return (values[idx], None),
        Err(idx) => idx - 1,
    };

    let y = match axis.interpolation {
        Interpolation::Linear => linear_at(
            bp[segment],
            values[segment],
            bp[segment + 1],
            values[segment + 1],
            x,
        ),
        Interpolation::Cubic => cubic_at(bp, values, segment, x),
    };
    (y, None)
}

fn linear_at(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn cubic_at(bp: &[f64], values: &[f64], segment: usize, x: f64) -> f64 {
    let n = bp.len();
    let i1 = segment;
    let i2 = segment + 1;
    let i0 = if i1 == 0 { i1 } else { i1 - 1 };
    let i3 = if i2 == n - 1 { i2 } else { i2 + 1 };

    if i0 == i1 || i2 == i3 {
        return linear_at(bp[i1], values[i1], bp[i2], values[i2], x);
    }

    let t = (x - bp[i1]) / (bp[i2] - bp[i1]);
    catmull_rom(values[i0], values[i1], values[i2], values[i3], t)
}

fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}
