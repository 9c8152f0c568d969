//! Weighted random niche selection
//!
//! Niches with fewer posts are more likely to be picked, so coverage evens
//! out over time. A niche's weight is `max(max_count, 1) - count + 1`.

use crate::{GenerationError, Result};
use infobytes_common::models::Niche;
use infobytes_common::store::SqliteStore;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Pick one niche, favouring those with fewer posts
///
/// `counts` maps niche id to post count; missing ids count as zero.
/// Returns `None` only for an empty slice.
pub fn select_weighted<'a, R: Rng + ?Sized>(
    niches: &'a [Niche],
    counts: &HashMap<String, i64>,
    rng: &mut R,
) -> Option<&'a Niche> {
    let first = niches.first()?;

    let count_of = |n: &Niche| counts.get(&n.id).copied().unwrap_or(0).max(0);
    let max_count = niches.iter().map(count_of).max().unwrap_or(0).max(1);

    let weights: Vec<i64> = niches.iter().map(|n| max_count - count_of(n) + 1).collect();
    let total: i64 = weights.iter().sum();

    let mut r = rng.gen::<f64>() * total as f64;
    for (niche, weight) in niches.iter().zip(&weights) {
        r -= *weight as f64;
        if r <= 0.0 {
            return Some(niche);
        }
    }

    Some(first)
}

/// Resolve the niche for one generation run
///
/// A requested id must name an active niche. Without one, an active niche is
/// drawn with [`select_weighted`].
pub async fn pick_niche(store: &SqliteStore, requested: Option<&str>) -> Result<Niche> {
    if let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) {
        return store
            .active_niche(id)
            .await?
            .ok_or_else(|| GenerationError::NotFound(id.to_string()));
    }

    let niches = store.active_niches().await?;
    if niches.is_empty() {
        return Err(GenerationError::NoNiches);
    }
    let counts = store.post_counts_by_niche().await?;

    let niche = select_weighted(&niches, &counts, &mut rand::thread_rng())
        .cloned()
        .ok_or(GenerationError::NoNiches)?;
    debug!(niche = %niche.id, "Weighted niche selection");
    Ok(niche)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infobytes_common::models::Market;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn niche(id: &str) -> Niche {
        Niche {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            avg_cpc: 1.0,
            keywords: None,
            market: Market::Global,
            is_active: true,
            created_at: String::new(),
            post_count: None,
        }
    }

    fn counts(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(select_weighted(&[], &HashMap::new(), &mut rng).is_none());
    }

    #[test]
    fn test_zero_draw_picks_first() {
        // StepRng(0, 0) always yields 0.0 as f64
        let niches = vec![niche("a"), niche("b")];
        let mut rng = StepRng::new(0, 0);
        let picked = select_weighted(&niches, &HashMap::new(), &mut rng).unwrap();
        assert_eq!(picked.id, "a");
    }

    #[test]
    fn test_niche_with_most_posts_has_weight_one() {
        // max_count = 9: weights a=10, b=1
        let niches = vec![niche("a"), niche("b")];
        let counts = counts(&[("a", 0), ("b", 9)]);
        let mut rng = StdRng::seed_from_u64(42);

        let picks_b = (0..2000)
            .filter(|_| select_weighted(&niches, &counts, &mut rng).unwrap().id == "b")
            .count();
        // Expected about 2000 / 11
        assert!(picks_b > 80 && picks_b < 320, "b picked {} times", picks_b);
    }

    #[test]
    fn test_equal_counts_are_uniform() {
        let niches = vec![niche("a"), niche("b"), niche("c")];
        let counts = counts(&[("a", 4), ("b", 4), ("c", 4)]);
        let mut rng = StdRng::seed_from_u64(7);

        let mut seen: HashMap<String, usize> = HashMap::new();
        for _ in 0..3000 {
            let id = select_weighted(&niches, &counts, &mut rng).unwrap().id.clone();
            *seen.entry(id).or_default() += 1;
        }
        for id in ["a", "b", "c"] {
            let n = seen.get(id).copied().unwrap_or(0);
            assert!(n > 800 && n < 1200, "{} picked {} times", id, n);
        }
    }
}
