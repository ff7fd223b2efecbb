//! Condensity-derived shrinkage and thermal-distribution shape.

use crate::support::resample::{find_lowest_nonzero, normalize};

/// Fixed logistic offset used by [`calc_thermal_distribution`]: 5 degrees
/// Fahrenheit expressed in Celsius degrees.
pub const THERMAL_DIST_OFFSET_C: f64 = 5.0 / 1.8;

const SHRINKAGE_ALPHA: f64 = 1.0;
const SHRINKAGE_BETA: f64 = 2.0;

/// Derives a condenser's thermal "shrinkage" scale from its condensity
/// distribution: an entropy-like spread measure, normalized against a
/// 12-node reference so a condensity concentrated at a single node yields a
/// small shrinkage and a broadly spread one yields a larger one.
#[must_use]
pub fn calc_shrinkage_c(condensity: &[f64]) -> f64 {
    let condentropy: f64 = condensity
        .iter()
        .filter(|&&d| d > 0.0)
        .map(|&d| -d * d.ln())
        .sum();
    let standard_condentropy = condentropy - (condensity.len() as f64 / 12.0).ln();
    SHRINKAGE_ALPHA + standard_condentropy * SHRINKAGE_BETA
}

/// Index of the lowest tank node a condensity distribution thermally
/// couples with.
#[must_use]
pub fn find_lowest_node(condensity: &[f64]) -> usize {
    find_lowest_nonzero(condensity)
}

/// The logistic expit underlying [`calc_thermal_distribution`]: approaches 1
/// well below `offset` and 0 well above it.
fn expit(x: f64, offset: f64) -> f64 {
    1.0 / (1.0 + (x - offset).exp())
}

/// Computes a wrapped condenser's heat-distribution shape: a logistic
/// function of each node's height above the lowest coupled node, scaled by
/// `shrinkage_c`, modulated by how far each node sits below setpoint.
///
/// Zero below `lowest_node`; normalized to sum to 1.
#[must_use]
pub fn calc_thermal_distribution(
    node_temps_c: &[f64],
    setpoint_c: f64,
    shrinkage_c: f64,
    lowest_node: usize,
) -> Vec<f64> {
    let n = node_temps_c.len();
    let mut dist = vec![0.0; n];
    if lowest_node >= n {
        return dist;
    }

    let t_lowest = node_temps_c[lowest_node];
    for (i, dist_i) in dist.iter_mut().enumerate().skip(lowest_node) {
        let shape = expit(
            (node_temps_c[i] - t_lowest) / shrinkage_c,
            THERMAL_DIST_OFFSET_C,
        );
        *dist_i = (shape * (setpoint_c - node_temps_c[i])).max(0.0);
    }

    // Every coupled node is already at or above setpoint: nothing for the
    // logistic shape to prefer, but the source still needs somewhere to put
    // its heat. Fall back to a uniform distribution across all nodes rather
    // than returning all-zero.
    if dist.iter().sum::<f64>() <= 0.0 {
        return vec![1.0 / n as f64; n];
    }

    normalize(&mut dist, 1e-6);
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn concentrated_condensity_has_unit_shrinkage() {
        let mut condensity = vec![0.0; 12];
        condensity[0] = 1.0;
        assert_relative_eq!(calc_shrinkage_c(&condensity), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn lowest_node_skips_leading_zero_weights() {
        let mut condensity = vec![0.0; 12];
        condensity[3] = 0.5;
        condensity[4] = 0.5;
        assert_eq!(find_lowest_node(&condensity), 3);
    }

    #[test]
    fn thermal_distribution_sums_to_one_and_is_zero_below_lowest_node() {
        let temps: Vec<f64> = (0..12).map(|i| 20.0 + i as f64 * 2.0).collect();
        let dist = calc_thermal_distribution(&temps, 51.7, 1.0, 3);
        assert_relative_eq!(dist.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
        assert!(dist[..3].iter().all(|&w| w == 0.0));
    }

    #[test]
    fn thermal_distribution_falls_back_to_uniform_when_every_node_is_at_or_above_setpoint() {
        let temps = vec![60.0; 12];
        let dist = calc_thermal_distribution(&temps, 51.7, 1.0, 0);
        assert_relative_eq!(dist.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
        for &w in &dist {
            assert_relative_eq!(w, 1.0 / 12.0, epsilon = 1e-9);
        }
    }
}
