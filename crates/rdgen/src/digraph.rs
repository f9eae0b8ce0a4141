//! Propagation of set-valued functions along a relation (DeRemer & Pennello).

use crate::types::Map;
use indexmap::map::Slice;
use std::{cmp, hash::Hash};

pub trait Set {
    fn union_with(&mut self, other: &Self);
}

impl<T> Set for crate::types::Set<T>
where
    T: Clone + Eq + Hash,
{
    fn union_with(&mut self, other: &Self) {
        self.extend(other.iter().cloned())
    }
}

/// Calculate the smallest `F` such that `F(x) ⊇ result(x)` and
/// `F(x) ⊇ F(y)` for every `y` in `relation(x)`.
///
/// Keys of `relation` and of its values that are missing from `result`
/// are ignored.
pub fn digraph<K, T>(result: &mut Map<K, T>, relation: &Map<K, Vec<K>>)
where
    K: Eq + Hash,
    T: Set,
{
    let mut edges = vec![Vec::new(); result.len()];
    for (x, ys) in relation {
        let Some(x) = result.get_index_of(x) else {
            continue;
        };
        edges[x].extend(ys.iter().filter_map(|y| result.get_index_of(y)));
    }
    let len = result.len();
    Digraph {
        result: result.as_mut_slice(),
        edges: &edges[..],
        n: vec![0usize; len],
        stack: vec![],
    }
    .run()
}

struct Digraph<'a, K, T> {
    result: &'a mut Slice<K, T>,
    edges: &'a [Vec<usize>],
    n: Vec<usize>,
    stack: Vec<usize>,
}

impl<K, T> Digraph<'_, K, T>
where
    T: Set,
{
    fn run(&mut self) {
        for x in 0..self.edges.len() {
            if self.n[x] == 0 {
                self.traverse(x);
            }
        }
    }

    fn traverse(&mut self, x: usize) {
        self.stack.push(x);
        let d = self.stack.len();
        self.n[x] = d;

        let edges = self.edges;
        for &y in &edges[x] {
            if self.n[y] == 0 {
                self.traverse(y);
            }
            self.n[x] = cmp::min(self.n[x], self.n[y]);

            if x != y {
                // F(x) <- F(x) \cup F(y)
                let (slot, added) = get_two_mut(&mut *self.result, x, y);
                slot.union_with(added);
            }
        }

        if self.n[x] != d {
            return;
        }

        while let Some(s) = self.stack.pop() {
            self.n[s] = usize::MAX;
            if s == x {
                break;
            }
            // F(s) <- F(x)
            let (slot, added) = get_two_mut(&mut *self.result, s, x);
            slot.union_with(added);
        }
    }
}

fn get_two_mut<K, V>(slice: &mut Slice<K, V>, x: usize, y: usize) -> (&mut V, &mut V) {
    debug_assert!(
        x != y && cmp::max(x, y) < slice.len(),
        "index condition not satisfied"
    );
    let i = (x + y) / 2 + 1;
    let (a, b) = slice.split_at_mut(i);
    if x < y {
        (&mut a[x], &mut b[y - i])
    } else {
        (&mut b[x - i], &mut a[y])
    }
}
