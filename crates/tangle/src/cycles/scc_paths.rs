//! Bounded cycle extraction inside one strongly connected component.
//!
//! From each member `s` in ascending order, a depth-first search walks only
//! members larger than `s` and records every return to `s`. A cycle is thus
//! found exactly once, from its smallest node.

use super::SearchOutcome;

/// Extracts up to `cap` cycles from `component`.
///
/// `component` must be sorted ascending; `succ` is the whole graph's
/// successor lists. Paths never grow past `depth_cap` nodes. The cap is
/// reported as hit only when a cycle beyond it exists.
#[must_use]
pub fn component_cycles(
    succ: &[Vec<usize>],
    component: &[usize],
    cap: usize,
    depth_cap: usize,
) -> SearchOutcome {
    let mut in_component = vec![false; succ.len()];
    for &v in component {
        in_component[v] = true;
    }

    let mut outcome = SearchOutcome::default();
    let mut on_path = vec![false; succ.len()];
    let mut path: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for &start in component {
        path.push(start);
        on_path[start] = true;
        frames.push((start, 0));

        while let Some(top) = frames.len().checked_sub(1) {
            let (v, slot) = frames[top];
            let Some(&w) = succ[v].get(slot) else {
                frames.pop();
                if let Some(done) = path.pop() {
                    on_path[done] = false;
                }
                continue;
            };
            frames[top].1 += 1;

            if !in_component[w] || w < start || (on_path[w] && w != start) {
                continue;
            }
            if w == start {
                if outcome.cycles.len() == cap {
                    outcome.cap_hit = true;
                    return outcome;
                }
                outcome.cycles.push(path.clone());
                continue;
            }
            if path.len() >= depth_cap {
                outcome.depth_pruned = true;
                continue;
            }
            path.push(w);
            on_path[w] = true;
            frames.push((w, 0));
        }
    }
    outcome
}
