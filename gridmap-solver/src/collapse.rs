use bitvec::prelude::*;
use gridmap_rules::TileCatalog;
use rand::Rng;

/// Draws one rule from a candidate set by weighted roulette.
///
/// Non-joker candidates are preferred whenever any are present. Negative
/// weights count as zero. If the pool's total weight is zero the catalog
/// joker is returned, or the first pool entry when there is no joker.
/// Otherwise a value `u` is drawn uniformly from `[0, total)` and the first
/// entry, in catalog order, whose cumulative weight reaches `u` wins.
///
/// Returns `None` only for an empty candidate set. The draw consumes exactly
/// one value from `rng` when the total weight is positive and none otherwise.
pub fn collapse<R: Rng + ?Sized>(
    candidates: &BitSlice,
    catalog: &TileCatalog,
    rng: &mut R,
) -> Option<usize> {
    let non_joker: Vec<usize> = candidates
        .iter_ones()
        .filter(|&i| !catalog.rule(i).is_joker)
        .collect();
    let pool = if non_joker.is_empty() {
        candidates.iter_ones().collect()
    } else {
        non_joker
    };
    let first = *pool.first()?;

    let weight_of = |i: usize| catalog.rule(i).weight.max(0.0);
    let total: f32 = pool.iter().map(|&i| weight_of(i)).sum();
    if total <= 0.0 {
        return Some(catalog.joker_index().unwrap_or(first));
    }

    let threshold = rng.gen_range(0.0..total);
    let mut accumulated = 0.0;
    for &index in &pool {
        accumulated += weight_of(index);
        if threshold <= accumulated {
            return Some(index);
        }
    }
    pool.last().copied()
}
