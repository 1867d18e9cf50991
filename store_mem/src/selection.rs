//! Coin selection over available outputs.
//!
//! Prefer the smallest single output that covers the target, so large
//! outputs stay intact and no extra inputs are spent. Failing that,
//! accumulate from the largest down until the target is met.

use forge_types::Amount;

/// Pick indices into `candidates` (values) whose sum covers `target`.
///
/// Returns `None` when even the full set falls short. Ties keep candidate
/// order, so selection is deterministic for a given insertion order.
pub fn select(candidates: &[Amount], target: Amount) -> Option<Vec<usize>> {
    if target.is_zero() {
        return Some(Vec::new());
    }

    let single = candidates
        .iter()
        .enumerate()
        .filter(|(_, v)| **v >= target)
        .min_by_key(|(_, v)| **v)
        .map(|(i, _)| i);
    if let Some(i) = single {
        return Some(vec![i]);
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|a, b| candidates[*b].cmp(&candidates[*a]));

    let mut picked = Vec::new();
    let mut total = Amount::ZERO;
    for i in order {
        picked.push(i);
        total = total.saturating_add(candidates[i]);
        if total >= target {
            return Some(picked);
        }
    }
    None
}
