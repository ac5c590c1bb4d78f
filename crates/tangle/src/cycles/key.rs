//! Canonical cycle keys.
//!
//! A cycle `[b, c, a, b]` is the same cycle as `[a, b, c, a]`. Rotating the
//! open sequence so that the smallest module comes first and joining with
//! `->` gives a key shared by every rotation: `a->b->c`.

use crate::domain::ModuleId;

/// Rotates a closed cycle so it starts at its smallest module.
///
/// Input and output are closed (`first == last`). Sequences shorter than
/// two nodes are returned unchanged.
#[must_use]
pub fn canonicalize(closed: &[ModuleId]) -> Vec<ModuleId> {
    if closed.len() < 2 {
        return closed.to_vec();
    }
    let open = &closed[..closed.len() - 1];
    let start = open
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(i, _)| i);

    let mut rotated: Vec<ModuleId> = open[start..].iter().chain(&open[..start]).cloned().collect();
    if let Some(first) = rotated.first().cloned() {
        rotated.push(first);
    }
    rotated
}

/// Canonical key of a closed cycle.
///
/// # Examples
///
/// ```
/// use tangle::cycles::key::cycle_key;
/// use tangle::domain::ModuleId;
///
/// let cycle: Vec<ModuleId> = ["b", "c", "a", "b"].into_iter().map(ModuleId::from).collect();
/// assert_eq!(cycle_key(&cycle), "a->b->c");
/// ```
#[must_use]
pub fn cycle_key(closed: &[ModuleId]) -> String {
    let canonical = canonicalize(closed);
    let open = &canonical[..canonical.len().saturating_sub(1)];
    open.iter().map(ModuleId::as_str).collect::<Vec<_>>().join("->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<ModuleId> {
        names.iter().map(|n| ModuleId::from(*n)).collect()
    }

    #[test]
    fn rotation_starts_at_smallest() {
        let rotated = canonicalize(&ids(&["c", "a", "b", "c"]));
        assert_eq!(rotated, ids(&["a", "b", "c", "a"]));
    }

    #[test]
    fn direction_matters() {
        assert_ne!(
            cycle_key(&ids(&["a", "b", "c", "a"])),
            cycle_key(&ids(&["a", "c", "b", "a"]))
        );
    }

    proptest! {
        #[test]
        fn every_rotation_shares_a_key(names in prop::collection::hash_set("[a-z]{1,3}", 2..7), shift in 0usize..7) {
            let open: Vec<ModuleId> = names.into_iter().map(ModuleId::from).collect();
            let n = open.len();
            let mut closed = open.clone();
            closed.push(open[0].clone());

            let mut rotated: Vec<ModuleId> = (0..n).map(|i| open[(i + shift) % n].clone()).collect();
            rotated.push(rotated[0].clone());

            prop_assert_eq!(cycle_key(&closed), cycle_key(&rotated));
        }
    }
}
