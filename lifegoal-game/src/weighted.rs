//! Weighted random selection shared by the wheel, dice board and campaign
//! generator.
use rand::Rng;

/// Pick one entry with probability proportional to its weight.
///
/// Returns `None` when the table is empty or every weight is zero.
/// Zero-weight entries are never selected.
pub fn choose_weighted<'a, T, R>(entries: &'a [(T, u32)], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    choose_weighted_index(entries.iter().map(|(_, weight)| *weight), rng)
        .and_then(|idx| entries.get(idx))
        .map(|(value, _)| value)
}

/// Index-returning variant used when callers keep weights alongside richer
/// records.
pub fn choose_weighted_index<I, R>(weights: I, rng: &mut R) -> Option<usize>
where
    I: IntoIterator<Item = u32>,
    I::IntoIter: Clone,
    R: Rng + ?Sized,
{
    let weights = weights.into_iter();
    let total_weight: u64 = weights.clone().map(u64::from).sum();
    if total_weight == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total_weight);
    let mut current = 0u64;
    for (idx, weight) in weights.enumerate() {
        current += u64::from(weight);
        if roll < current {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn empty_and_zero_tables_pick_nothing() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let empty: [(char, u32); 0] = [];
        assert!(choose_weighted(&empty, &mut rng).is_none());
        assert!(choose_weighted(&[('a', 0), ('b', 0)], &mut rng).is_none());
    }

    #[test]
    fn zero_weight_entries_are_never_selected() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let table = [('a', 0), ('b', 5), ('c', 0)];
        for _ in 0..500 {
            assert_eq!(choose_weighted(&table, &mut rng), Some(&'b'));
        }
    }

    #[test]
    fn selection_respects_weights_over_many_trials() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
        let table = [("common", 70), ("rare", 25), ("epic", 5)];
        let mut counts = [0u32; 3];
        let trials = 20_000;
        for _ in 0..trials {
            let idx = match choose_weighted(&table, &mut rng) {
                Some(&"common") => 0,
                Some(&"rare") => 1,
                Some(_) => 2,
                None => panic!("non-empty table"),
            };
            counts[idx] += 1;
        }
        let share = |count: u32| f64::from(count) / f64::from(trials);
        assert!((share(counts[0]) - 0.70).abs() < 0.02, "{counts:?}");
        assert!((share(counts[1]) - 0.25).abs() < 0.02, "{counts:?}");
        assert!((share(counts[2]) - 0.05).abs() < 0.01, "{counts:?}");
    }
}
