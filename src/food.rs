/// One unit of the shared resource substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub amount: f64,
    pub age: u32,
}

impl Food {
    pub fn new(amount: f64) -> Self {
        Food {
            amount: amount.max(0.0),
            age: 0,
        }
    }

    pub fn is_expired(&self, expiration_age: u32) -> bool {
        self.age > expiration_age
    }
}

/// Regenerating, decaying resource pool shared by every being.
///
/// Foraging draws against a per-tick budget taken from `total_available`;
/// the units themselves only leave the pool by expiring.
#[derive(Debug, Clone, Default)]
pub struct FoodPool {
    units: Vec<Food>,
    expiration_age: u32,
}

impl FoodPool {
    pub fn new(expiration_age: u32) -> Self {
        FoodPool {
            units: Vec::new(),
            expiration_age,
        }
    }

    /// Appends `rate` fresh units, each worth `rate`.
    pub fn generate(&mut self, rate: u32) {
        self.units.extend((0..rate).map(|_| Food::new(f64::from(rate))));
    }

    /// Ages every unit by one tick, then drops the ones past expiration.
    pub fn age_and_expire(&mut self) {
        for food in &mut self.units {
            food.age += 1;
        }
        let expiration_age = self.expiration_age;
        self.units.retain(|f| !f.is_expired(expiration_age));
    }

    pub fn total_available(&self) -> f64 {
        self.units.iter().map(|f| f.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Food] {
        &self.units
    }
}
