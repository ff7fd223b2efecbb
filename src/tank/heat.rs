use super::Tank;

impl Tank {
    /// Raises temperatures starting at `node` (inclusive) and upward,
    /// absorbing up to `dq_kj`, never exceeding `max_temp_c` at any node.
    ///
    /// Returns the unabsorbed remainder, which is always `>= 0`.
    #[must_use]
    pub fn add_heat_at_node(&mut self, node: usize, dq_kj: f64, max_temp_c: f64) -> f64 {
        self.add_heat_from(node, dq_kj, max_temp_c)
    }

    /// As [`Tank::add_heat_at_node`] but starts strictly above `node`.
    #[must_use]
    pub fn add_heat_above_node(&mut self, node: usize, dq_kj: f64, max_temp_c: f64) -> f64 {
        self.add_heat_from(node + 1, dq_kj, max_temp_c)
    }

    fn add_heat_from(&mut self, start: usize, dq_kj: f64, max_temp_c: f64) -> f64 {
        let n = self.n_nodes();
        if start >= n || dq_kj <= 0.0 {
            return dq_kj.max(0.0);
        }

        let mut remaining = dq_kj;
        for t in &mut self.node_temps_c[start..] {
            if remaining <= 0.0 {
                break;
            }
            let headroom_kj = (max_temp_c - *t).max(0.0) * self.node_capacitance_kj_per_c;
            let applied = remaining.min(headroom_kj);
            *t += applied / self.node_capacitance_kj_per_c;
            remaining -= applied;
        }
        remaining.max(0.0)
    }

    /// Deposits `dq_kj` of heat across the tank in proportion to
    /// `distribution` (a nonnegative weight per node, need not be
    /// pre-normalized), never exceeding `max_temp_c` at any node.
    ///
    /// Weight is iteratively redistributed away from nodes that saturate at
    /// `max_temp_c` so the full `dq_kj` is absorbed whenever there is
    /// headroom anywhere under the distribution's support. Returns the
    /// unabsorbed remainder.
    #[must_use]
    pub fn add_heat_distributed(&mut self, distribution: &[f64], dq_kj: f64, max_temp_c: f64) -> f64 {
        let n = self.n_nodes();
        assert_eq!(distribution.len(), n, "distribution length must match node count");

        let mut weights = distribution.to_vec();
        let mut remaining = dq_kj;

        loop {
            let total_weight: f64 = weights.iter().sum();
            if total_weight <= 0.0 || remaining <= 1e-12 {
                break;
            }

            let shares: Vec<f64> = weights
                .iter()
                .map(|w| remaining * w / total_weight)
                .collect();

            let mut saturated_any = false;
            for i in 0..n {
                if shares[i] <= 0.0 {
                    continue;
                }
                let headroom_kj =
                    (max_temp_c - self.node_temps_c[i]).max(0.0) * self.node_capacitance_kj_per_c;
                if shares[i] >= headroom_kj {
                    self.node_temps_c[i] += headroom_kj / self.node_capacitance_kj_per_c;
                    remaining -= headroom_kj;
                    weights[i] = 0.0;
                    saturated_any = true;
                }
            }

            if !saturated_any {
                for (i, &share) in shares.iter().enumerate() {
                    if share > 0.0 {
                        self.node_temps_c[i] += share / self.node_capacitance_kj_per_c;
                    }
                }
                remaining = 0.0;
            }
        }

        remaining.max(0.0)
    }

    /// If the tank has a built-in heat exchanger, computes the outlet
    /// temperature an inlet stream would see via effectiveness-NTU transfer
    /// against the tank mean, bypassing ordinary node mixing.
    #[must_use]
    pub fn heat_exchanger_outlet_c(&self, inlet_temp_c: f64) -> Option<f64> {
        let effectiveness = self.heat_exchanger_effectiveness?;
        let mean = self.mean_temperature_c();
        Some(inlet_temp_c + effectiveness * (mean - inlet_temp_c))
    }

    /// True if the tank was configured with a built-in heat exchanger.
    #[must_use]
    pub fn has_heat_exchanger(&self) -> bool {
        self.has_heat_exchanger
    }
}
