use super::Tank;

impl Tank {
    /// Merges adjacent inverted layers (a cooler layer below a hotter one)
    /// by mass-weighted average, repeating until the column is
    /// non-decreasing from bottom to top.
    ///
    /// Called after every mutation that can introduce an inversion: draws,
    /// heat addition, and extra node-power deposits. Since every node has
    /// equal mass, a mass-weighted average over a merged run is a plain
    /// average, which preserves `Σ Cn·T` exactly.
    pub fn mix_inversions(&mut self) {
        loop {
            let mut merged_any = false;
            let mut i = 0;
            while i + 1 < self.node_temps_c.len() {
                if self.node_temps_c[i] > self.node_temps_c[i + 1] {
                    let mut j = i + 1;
                    let mut sum = self.node_temps_c[i] + self.node_temps_c[i + 1];
                    let mut count = 2usize;
                    while j + 1 < self.node_temps_c.len()
                        && sum / count as f64 > self.node_temps_c[j + 1]
                    {
                        j += 1;
                        sum += self.node_temps_c[j];
                        count += 1;
                    }
                    let avg = sum / count as f64;
                    for t in &mut self.node_temps_c[i..=j] {
                        *t = avg;
                    }
                    merged_any = true;
                    i = j + 1;
                } else {
                    i += 1;
                }
            }
            if !merged_any {
                break;
            }
        }
    }

    /// True if the column is non-decreasing from bottom to top within
    /// `tolerance_c`.
    #[must_use]
    pub fn is_monotone(&self, tolerance_c: f64) -> bool {
        self.node_temps_c
            .windows(2)
            .all(|w| w[0] <= w[1] + tolerance_c)
    }
}
