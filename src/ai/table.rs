use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;

/// Half-width of the range fresh entries are drawn from.
pub const INIT_SPREAD: f64 = 0.2;

/// Sparse value table that fills unseen entries on first read.
///
/// Fresh entries get a uniform value in (-0.2, 0.2) drawn from the caller's
/// RNG, so unvisited actions do not all tie at zero and seeded runs repeat.
#[derive(Debug, Clone)]
pub struct ValueTable<K> {
    values: HashMap<K, f64>,
}

impl<K: Hash + Eq + Copy> ValueTable<K> {
    pub fn new() -> Self {
        ValueTable {
            values: HashMap::new(),
        }
    }

    /// Read an entry, initialising it at random if it was never seen.
    pub fn get_or_init<R: Rng>(&mut self, key: K, rng: &mut R) -> f64 {
        *self
            .values
            .entry(key)
            .or_insert_with(|| rng.random_range(-INIT_SPREAD..INIT_SPREAD))
    }

    /// Read an entry without initialising it.
    pub fn get(&self, key: &K) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn set(&mut self, key: K, value: f64) {
        self.values.insert(key, value);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Get total number of values stored
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &f64)> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K: Hash + Eq + Copy> Default for ValueTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_read_initialises_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut table = ValueTable::new();
        for key in 0..500u32 {
            let v = table.get_or_init(key, &mut rng);
            assert!(v > -INIT_SPREAD && v < INIT_SPREAD, "value {v} out of range");
        }
        assert_eq!(table.len(), 500);
    }

    #[test]
    fn test_second_read_is_stable() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut table = ValueTable::new();
        let first = table.get_or_init(7u32, &mut rng);
        let second = table.get_or_init(7u32, &mut rng);
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_plain_get_does_not_insert() {
        let mut table: ValueTable<u32> = ValueTable::new();
        assert_eq!(table.get(&3), None);
        assert!(table.is_empty());
        table.set(3, 0.5);
        assert_eq!(table.get(&3), Some(0.5));
        assert!(table.contains(&3));
    }

    #[test]
    fn test_same_seed_same_values() {
        let mut a = ValueTable::new();
        let mut b = ValueTable::new();
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        for key in 0..20u32 {
            assert_eq!(a.get_or_init(key, &mut rng_a), b.get_or_init(key, &mut rng_b));
        }
    }
}
