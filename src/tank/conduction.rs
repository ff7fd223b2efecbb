use super::Tank;

impl Tank {
    /// Explicit inter-node conduction: each node exchanges heat with its
    /// immediate neighbors at `conduction_conductance_kw_per_c`.
    ///
    /// The caller is responsible for choosing a `dt_min` small enough to
    /// keep the explicit scheme stable (Fourier number `Fo = k·dt /
    /// Cn ≤ 0.5`); in debug builds this is checked and will panic rather
    /// than silently produce an oscillating profile.
    pub(super) fn apply_conduction(&mut self, dt_min: f64) {
        let n = self.n_nodes();
        if n < 2 {
            return;
        }

        let dt_s = dt_min * 60.0;
        let k = self.conduction_conductance_kw_per_c;
        debug_assert!(
            k * dt_s / self.node_capacitance_kj_per_c <= 0.5,
            "conduction step violates Fourier-number stability bound"
        );

        let old = self.node_temps_c.clone();
        for i in 0..n {
            let mut flux_kj = 0.0;
            if i > 0 {
                flux_kj += k * (old[i - 1] - old[i]) * dt_s;
            }
            if i + 1 < n {
                flux_kj += k * (old[i + 1] - old[i]) * dt_s;
            }
            self.node_temps_c[i] += flux_kj / self.node_capacitance_kj_per_c;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tank::{DrawInput, TankConfig};

    #[test]
    fn conduction_smooths_a_hot_node_without_changing_total_energy() {
        let config = TankConfig::new(12, 189.0, 0.0, 0.0)
            .unwrap()
            .with_inversion_mixing(false)
            .with_conduction(0.01);
        let mut tank = crate::tank::Tank::new(&config, 20.0).unwrap();
        let mut temps = vec![20.0; 12];
        temps[6] = 60.0;
        tank.set_node_temperatures_c(&temps).unwrap();
        let before = tank.heat_content_kj();

        tank.advect_draw_and_lose(DrawInput::default(), 20.0, 1.0)
            .unwrap();

        assert!(tank.node_temperatures_c()[6] < 60.0);
        assert!(tank.node_temperatures_c()[5] > 20.0);
        assert!((tank.heat_content_kj() - before).abs() < 1e-6);
    }
}
