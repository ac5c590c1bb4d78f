//! Johnson's elementary circuit enumeration, without recursion.
//!
//! For each start node `s` in ascending order the search is restricted to
//! the strongly connected component containing `s` in the subgraph of nodes
//! `>= s`. Blocked flags and the `B` lists are index-addressed vectors; the
//! circuit search runs on an explicit frame stack and unblocking uses a
//! work list.
//!
//! A frame whose extension was refused by the depth cap is treated as if it
//! had closed a circuit, so its node is unblocked on return. Without this a
//! pruned node could stay blocked and hide shorter circuits through it.

use super::SearchOutcome;
use super::tarjan::strongly_connected;

struct Frame {
    node: usize,
    slot: usize,
    found: bool,
}

/// Enumerates elementary cycles, stopping after `cap`.
///
/// Cycles are returned open, starting at their smallest node. The cap is
/// reported as hit only when a cycle beyond it exists.
#[must_use]
pub fn elementary_cycles(succ: &[Vec<usize>], cap: usize, depth_cap: usize) -> SearchOutcome {
    let n = succ.len();
    let mut outcome = SearchOutcome::default();
    let mut blocked = vec![false; n];
    let mut b_lists: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_scope = vec![false; n];

    for start in 0..n {
        let restricted: Vec<Vec<usize>> = succ
            .iter()
            .enumerate()
            .map(|(v, list)| {
                if v < start {
                    Vec::new()
                } else {
                    list.iter().copied().filter(|&w| w >= start).collect()
                }
            })
            .collect();
        let Some(component) = strongly_connected(&restricted)
            .into_iter()
            .find(|c| c.binary_search(&start).is_ok())
        else {
            continue;
        };

        for &v in &component {
            in_scope[v] = true;
            blocked[v] = false;
            b_lists[v].clear();
        }

        let complete = circuits_from(
            start,
            succ,
            &in_scope,
            &mut blocked,
            &mut b_lists,
            &mut outcome,
            cap,
            depth_cap,
        );

        for &v in &component {
            in_scope[v] = false;
        }
        if !complete {
            break;
        }
    }
    outcome
}

/// Runs the circuit search from `start`. Returns false once the cap is hit.
#[allow(clippy::too_many_arguments)]
fn circuits_from(
    start: usize,
    succ: &[Vec<usize>],
    in_scope: &[bool],
    blocked: &mut [bool],
    b_lists: &mut [Vec<usize>],
    outcome: &mut SearchOutcome,
    cap: usize,
    depth_cap: usize,
) -> bool {
    let mut path = vec![start];
    blocked[start] = true;
    let mut frames = vec![Frame {
        node: start,
        slot: 0,
        found: false,
    }];

    while let Some(top) = frames.len().checked_sub(1) {
        let v = frames[top].node;
        if let Some(&w) = succ[v].get(frames[top].slot) {
            frames[top].slot += 1;
            if !in_scope[w] {
                continue;
            }
            if w == start {
                if outcome.cycles.len() == cap {
                    outcome.cap_hit = true;
                    return false;
                }
                outcome.cycles.push(path.clone());
                frames[top].found = true;
            } else if !blocked[w] {
                if path.len() >= depth_cap {
                    outcome.depth_pruned = true;
                    frames[top].found = true;
                    continue;
                }
                path.push(w);
                blocked[w] = true;
                frames.push(Frame {
                    node: w,
                    slot: 0,
                    found: false,
                });
            }
            continue;
        }

        let Some(done) = frames.pop() else { break };
        if done.found {
            unblock(done.node, blocked, b_lists);
        } else {
            for &w in &succ[done.node] {
                if in_scope[w] && !b_lists[w].contains(&done.node) {
                    b_lists[w].push(done.node);
                }
            }
        }
        path.pop();
        if done.found {
            if let Some(parent) = frames.last_mut() {
                parent.found = true;
            }
        }
    }
    true
}

fn unblock(node: usize, blocked: &mut [bool], b_lists: &mut [Vec<usize>]) {
    blocked[node] = false;
    let mut work = std::mem::take(&mut b_lists[node]);
    while let Some(w) = work.pop() {
        if blocked[w] {
            blocked[w] = false;
            work.append(&mut b_lists[w]);
        }
    }
}
