//! Strongly-connected components of a dependency graph.
//!
//! The traversal is the stack-depth variant of Tarjan's algorithm also used by
//! DeRemer and Pennello's `Digraph` procedure: every node on the stack is
//! labelled with its depth, the label is lowered to the smallest depth
//! reachable from it, and a node whose label survives the traversal of its
//! successors is the root of a component.

use std::cmp;

/// Compute the strongly-connected components of the graph with the nodes
/// `0..num_nodes` and the edges `x -> y` for each `y` in `successors(x)`.
///
/// Components are returned dependencies first: if `x` has an edge into `y`
/// and they belong to different components, the component of `y` precedes
/// the component of `x`. Within a component, nodes keep ascending order.
pub fn components<F, I>(num_nodes: usize, successors: F) -> Vec<Vec<usize>>
where
    F: Fn(usize) -> I,
    I: IntoIterator<Item = usize>,
{
    let mut scc = Scc {
        successors,
        n: vec![0usize; num_nodes],
        stack: vec![],
        components: vec![],
    };
    for x in 0..num_nodes {
        if scc.n[x] == 0 {
            scc.traverse(x);
        }
    }
    scc.components
}

struct Scc<F> {
    successors: F,
    n: Vec<usize>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl<F, I> Scc<F>
where
    F: Fn(usize) -> I,
    I: IntoIterator<Item = usize>,
{
    fn traverse(&mut self, x: usize) {
        self.stack.push(x);
        let d = self.stack.len();
        self.n[x] = d;

        for y in (self.successors)(x) {
            if self.n[y] == 0 {
                self.traverse(y);
            }
            self.n[x] = cmp::min(self.n[x], self.n[y]);
        }

        if self.n[x] != d {
            return;
        }

        let mut component = vec![];
        while let Some(s) = self.stack.pop() {
            // finished nodes never lower the label of a later node
            self.n[s] = usize::MAX;
            component.push(s);
            if s == x {
                break;
            }
        }
        component.sort_unstable();
        self.components.push(component);
    }
}
