use super::{Tank, TankError};

/// Inputs to [`Tank::advect_draw_and_lose`].
///
/// A secondary inlet (e.g. a tempering valve) is optional; leave
/// `secondary_volume_l` at 0 to omit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawInput {
    /// Volume drawn through the primary inlet, in liters.
    pub volume_l: f64,
    /// Primary inlet water temperature, in °C.
    pub inlet_temp_c: f64,
    /// Volume drawn through the secondary inlet, in liters.
    pub secondary_volume_l: f64,
    /// Secondary inlet water temperature, in °C.
    pub secondary_inlet_temp_c: f64,
}

impl Tank {
    /// Applies one step's draw, inlet mixing, standby loss, and (if enabled)
    /// inter-node conduction.
    ///
    /// Order: the lower of the two inlets is advected first; the higher
    /// second. If [`TankConfig::with_mixes_on_draw`](super::TankConfig::with_mixes_on_draw)
    /// is set and a nonzero primary draw occurred, the bottom third of the
    /// tank is then averaged toward itself. Standby loss and conduction are
    /// applied last, and inversion mixing runs at the end if enabled.
    ///
    /// # Errors
    ///
    /// Returns [`TankError::NegativeDraw`] if either draw volume is negative.
    pub fn advect_draw_and_lose(
        &mut self,
        draw: DrawInput,
        ambient_temp_c: f64,
        dt_min: f64,
    ) -> Result<(), TankError> {
        if draw.volume_l < 0.0 {
            return Err(TankError::NegativeDraw {
                volume: draw.volume_l,
            });
        }
        if draw.secondary_volume_l < 0.0 {
            return Err(TankError::NegativeDraw {
                volume: draw.secondary_volume_l,
            });
        }

        let primary = (self.primary_inlet_height, draw.volume_l, draw.inlet_temp_c);
        let secondary = self
            .secondary_inlet_height
            .map(|h| (h, draw.secondary_volume_l, draw.secondary_inlet_temp_c));

        let (first, second) = match secondary {
            Some(sec) if sec.0 < primary.0 => (sec, Some(primary)),
            Some(sec) => (primary, Some(sec)),
            None => (primary, None),
        };

        self.apply_inlet(first.0, first.1, first.2);
        if let Some(second) = second {
            self.apply_inlet(second.0, second.1, second.2);
        }

        if self.mixes_on_draw && draw.volume_l > 0.0 {
            self.mix_bottom_third();
        }

        self.apply_standby_loss(ambient_temp_c, dt_min);

        if self.do_conduction {
            self.apply_conduction(dt_min);
        }

        if self.do_inversion_mixing {
            self.mix_inversions();
        }

        Ok(())
    }

    /// Shifts the column above `height` upward by the fractional number of
    /// nodes drawn, filling from the bottom with `inlet_temp_c`.
    fn apply_inlet(&mut self, height: usize, volume_l: f64, inlet_temp_c: f64) {
        if volume_l <= 0.0 || height >= self.n_nodes() {
            return;
        }

        let node_volume_l = self.volume_l / self.n_nodes() as f64;
        let shift = volume_l / node_volume_l;
        let whole = shift.floor() as usize;
        let frac = shift - whole as f64;

        let old = self.node_temps_c.clone();
        let n = self.n_nodes();
        for i in height..n {
            let rel = i - height;
            self.node_temps_c[i] = if rel < whole {
                inlet_temp_c
            } else {
                let src = rel - whole;
                let below = if src == 0 {
                    inlet_temp_c
                } else {
                    old[height + src - 1]
                };
                old[height + src] * (1.0 - frac) + below * frac
            };
        }
    }

    fn mix_bottom_third(&mut self) {
        let n = self.n_nodes();
        let third = (n / 3).max(1);
        let avg = self.node_temps_c[..third].iter().sum::<f64>() / third as f64;
        for t in &mut self.node_temps_c[..third] {
            *t += (avg - *t) / 3.0;
        }
    }

    fn apply_standby_loss(&mut self, ambient_temp_c: f64, dt_min: f64) {
        let mean = self.mean_temperature_c();
        let total_ua_kw_per_c = self.ua_kw_per_c + self.fittings_ua_kw_per_c;
        let dt_s = dt_min * 60.0;
        let loss_kj = (mean - ambient_temp_c) * total_ua_kw_per_c * dt_s;

        let n = self.n_nodes() as f64;
        let per_node_drop_c = loss_kj / n / self.node_capacitance_kj_per_c;
        for t in &mut self.node_temps_c {
            *t -= per_node_drop_c;
        }
        self.standby_loss_kj = loss_kj;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tank::TankConfig;
    use approx::assert_relative_eq;

    fn tank(n: usize, ua: f64) -> Tank {
        let config = TankConfig::new(n, 189.0, ua, 0.0).unwrap();
        Tank::new(&config, 20.0).unwrap()
    }

    #[test]
    fn full_volume_draw_replaces_every_node() {
        let mut t = tank(12, 0.0);
        let draw = DrawInput {
            volume_l: 189.0,
            inlet_temp_c: 10.0,
            ..Default::default()
        };
        t.advect_draw_and_lose(draw, 20.0, 1.0).unwrap();
        assert!(t
            .node_temperatures_c()
            .iter()
            .all(|&temp| (temp - 10.0).abs() < 1e-6));
    }

    #[test]
    fn small_draw_blends_bottom_node_only() {
        let mut t = tank(12, 0.0);
        let node_volume = 189.0 / 12.0;
        let draw = DrawInput {
            volume_l: node_volume * 0.5,
            inlet_temp_c: 10.0,
            ..Default::default()
        };
        t.advect_draw_and_lose(draw, 20.0, 1.0).unwrap();
        let temps = t.node_temperatures_c();
        assert_relative_eq!(temps[0], 15.0, epsilon = 1e-6);
        assert!((temps[11] - 20.0).abs() < 1e-6);
    }

    #[test]
    fn negative_draw_is_rejected() {
        let mut t = tank(12, 0.0);
        let draw = DrawInput {
            volume_l: -1.0,
            ..Default::default()
        };
        assert!(t.advect_draw_and_lose(draw, 20.0, 1.0).is_err());
    }

    #[test]
    fn standby_loss_cools_a_hot_tank_toward_ambient() {
        let mut t = tank(12, 0.01);
        t.set_node_temperatures_c(&[40.0; 12]).unwrap();
        t.advect_draw_and_lose(DrawInput::default(), 20.0, 60.0)
            .unwrap();
        assert!(t.mean_temperature_c() < 40.0);
        assert!(t.standby_loss_kj() > 0.0);
    }

    #[test]
    fn adiabatic_draw_conserves_energy_with_inlet_swap() {
        let mut t = tank(12, 0.0);
        let before = t.heat_content_kj();
        let draw = DrawInput {
            volume_l: 189.0,
            inlet_temp_c: 20.0,
            ..Default::default()
        };
        t.advect_draw_and_lose(draw, 20.0, 1.0).unwrap();
        assert_relative_eq!(t.heat_content_kj(), before, epsilon = 1e-6);
    }
}
