use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::NodeId;

#[derive(Debug, Clone)]
struct Entry {
    priority: f64,
    seq: u64,
    node: NodeId,
}

// Reversed so that BinaryHeap (a max-heap) pops the smallest priority,
// and among equal priorities the earliest push.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Min-priority queue of node ids.
///
/// Pops the global minimum; ties go to the entry pushed first. This is the
/// order a list re-sorted (stably) before every pop would produce.
/// Entries are never updated in place: a node whose priority drops is
/// pushed again and the stale entry stays until popped.
#[derive(Debug, Clone, Default)]
pub struct MinQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl MinQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, priority: f64) {
        self.heap.push(Entry {
            priority,
            seq: self.next_seq,
            node,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<(NodeId, f64)> {
        self.heap.pop().map(|e| (e.node, e.priority))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Iterates entries (stale ones included) in pop order.
impl<'a> IntoIterator for &'a MinQueue {
    type Item = &'a NodeId;
    type IntoIter = std::vec::IntoIter<&'a NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        let mut entries: Vec<&Entry> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries
            .into_iter()
            .map(|e| &e.node)
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_minimum_first() {
        let mut q = MinQueue::new();
        q.push("c".into(), 3.0);
        q.push("a".into(), 1.0);
        q.push("b".into(), 2.0);
        assert_eq!(q.pop(), Some(("a".to_string(), 1.0)));
        assert_eq!(q.pop(), Some(("b".to_string(), 2.0)));
        assert_eq!(q.pop(), Some(("c".to_string(), 3.0)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut q = MinQueue::new();
        for id in ["x", "y", "z"] {
            q.push(id.into(), 5.0);
        }
        q.push("w".into(), f64::INFINITY);
        q.push("v".into(), 5.0);
        let order: Vec<NodeId> = std::iter::from_fn(|| q.pop().map(|(n, _)| n)).collect();
        assert_eq!(order, vec!["x", "y", "z", "v", "w"]);
    }

    #[test]
    fn test_stale_entries_kept() {
        let mut q = MinQueue::new();
        q.push("a".into(), 10.0);
        q.push("a".into(), 4.0);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(("a".to_string(), 4.0)));
        assert_eq!(q.pop(), Some(("a".to_string(), 10.0)));
        assert!(q.is_empty());
    }

    #[test]
    fn test_iteration_matches_pop_order() {
        let mut q = MinQueue::new();
        q.push("b".into(), 2.0);
        q.push("a".into(), 1.0);
        q.push("d".into(), 2.0);
        q.push("c".into(), f64::INFINITY);
        let snapshot: Vec<&NodeId> = (&q).into_iter().collect();
        assert_eq!(snapshot, vec!["a", "b", "d", "c"]);
        // iterating does not consume
        assert_eq!(q.len(), 4);
    }
}
