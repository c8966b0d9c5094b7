use rand::Rng;

/// Floor applied to every efficiency at creation and after mutation.
pub const MIN_EFFICIENCY: f64 = 0.1;

/// Foraging efficiency, the only heritable trait.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Genetics {
    pub efficiency: f64,
}

impl Genetics {
    pub fn new(efficiency: f64) -> Self {
        Genetics {
            efficiency: efficiency.max(MIN_EFFICIENCY),
        }
    }

    /// Seed genotype: uniform draw in `[min, max]`, scaled by the species'
    /// specialization factor.
    pub fn new_random(rng: &mut impl Rng, min: f64, max: f64, scale: f64) -> Self {
        let drawn = rng.random_range(min..=max);
        Genetics::new(drawn * scale)
    }

    /// Offspring genotype: `parent + uniform(-rate, rate)`, floor-clamped.
    pub fn mutate(&self, rng: &mut impl Rng, rate: f64) -> Self {
        let delta = if rate > 0.0 {
            rng.random_range(-rate..=rate)
        } else {
            0.0
        };
        Genetics::new(self.efficiency + delta)
    }
}
