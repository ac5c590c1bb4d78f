//! Iterative Tarjan strongly connected components.
//!
//! Node state lives in index-addressed vectors; the recursion of the
//! textbook algorithm is replaced by an explicit stack of
//! `(node, next successor slot)` frames, so stack usage is bounded by the
//! heap rather than the thread stack.

/// Components of size greater than one, each sorted ascending.
///
/// `succ[v]` lists the successors of node `v`. Components are returned in
/// ascending order of their smallest node.
#[must_use]
pub fn strongly_connected(succ: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = succ.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut low = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, usize)> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        index[root] = Some(next_index);
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(top) = frames.len().checked_sub(1) {
            let (v, slot) = frames[top];
            if let Some(&w) = succ[v].get(slot) {
                frames[top].1 += 1;
                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        low[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        frames.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => low[v] = low[v].min(w_index),
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if Some(low[v]) == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                if component.len() > 1 {
                    component.sort_unstable();
                    components.push(component);
                }
            }
        }
    }

    components.sort_unstable_by_key(|c| c[0]);
    components
}
