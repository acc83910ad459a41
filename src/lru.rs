//! Recency ordering for LRU eviction.
//!
//! An arena-backed doubly-linked list of keys: front is the most recently
//! used, back is the least recently used and therefore the next eviction
//! victim. Nodes live in a `generational_arena::Arena`, so each entry can
//! hold its node's `Index` as a stable handle and be repositioned or removed
//! in O(1) without scanning.
//!
//! The list stores keys only. Byte accounting is the cache's concern; the
//! list's sole job is order.

use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node {
    key: String,
    next: Option<Index>,
    prev: Option<Index>,
}

/// Doubly-linked recency list. Front = MRU, back = LRU.
#[derive(Debug)]
pub(crate) struct RecencyList {
    nodes: Arena<Node>,
    head: Option<Index>,
    tail: Option<Index>,
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyList {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            head: None,
            tail: None,
        }
    }

    // Detach a node from its neighbors without touching the arena.
    fn unlink(&mut self, index: Index) {
        let node = &self.nodes[index];
        let prev_idx = node.prev;
        let next_idx = node.next;

        if let Some(prev) = prev_idx {
            self.nodes[prev].next = next_idx;
        } else {
            // Unlinking the head.
            self.head = next_idx;
        }

        if let Some(next) = next_idx {
            self.nodes[next].prev = prev_idx;
        } else {
            // Unlinking the tail.
            self.tail = prev_idx;
        }
    }

    // Make an already-allocated node the new head.
    fn push_front_node(&mut self, index: Index) {
        let old_head = self.head;
        self.nodes[index].next = old_head;
        self.nodes[index].prev = None;
        self.head = Some(index);

        if let Some(old_head) = old_head {
            self.nodes[old_head].prev = Some(index);
        }

        if self.tail.is_none() {
            self.tail = Some(index);
        }
    }

    /// Insert a new key at the front and return its handle.
    pub fn push_front(&mut self, key: String) -> Index {
        let index = self.nodes.insert(Node {
            key,
            next: None,
            prev: None,
        });
        self.push_front_node(index);
        index
    }

    /// Move the node behind `index` to the front (mark most recently used).
    pub fn move_to_front(&mut self, index: Index) {
        if self.head == Some(index) || !self.nodes.contains(index) {
            return;
        }
        self.unlink(index);
        self.push_front_node(index);
    }

    /// Remove the node behind `index`, returning its key.
    pub fn remove(&mut self, index: Index) -> Option<String> {
        if !self.nodes.contains(index) {
            return None;
        }
        self.unlink(index);
        self.nodes.remove(index).map(|node| node.key)
    }

    /// Remove and return the least-recently-used key.
    pub fn pop_back(&mut self) -> Option<String> {
        let tail = self.tail?;
        self.remove(tail)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    // Order of keys from front (MRU) to back (LRU), for tests.
    #[cfg(test)]
    pub(crate) fn keys_as_vec(&self) -> Vec<String> {
        let mut keys = Vec::new();
        let mut current = self.head;
        while let Some(index) = current {
            keys.push(self.nodes[index].key.clone());
            current = self.nodes[index].next;
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_is_empty() {
        let list = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.keys_as_vec().is_empty());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();
        list.push_front("a".to_string());
        list.push_front("b".to_string());
        list.push_front("c".to_string());

        assert_eq!(list.len(), 3);
        assert_eq!(list.keys_as_vec(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();
        let a = list.push_front("a".to_string());
        list.push_front("b".to_string());
        list.push_front("c".to_string());

        list.move_to_front(a);
        assert_eq!(list.keys_as_vec(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_move_head_to_front_is_noop() {
        let mut list = RecencyList::new();
        list.push_front("a".to_string());
        let b = list.push_front("b".to_string());

        list.move_to_front(b);
        assert_eq!(list.keys_as_vec(), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back_returns_lru() {
        let mut list = RecencyList::new();
        list.push_front("a".to_string());
        list.push_front("b".to_string());
        list.push_front("c".to_string());

        assert_eq!(list.pop_back(), Some("a".to_string()));
        assert_eq!(list.pop_back(), Some("b".to_string()));
        assert_eq!(list.pop_back(), Some("c".to_string()));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_from_middle() {
        let mut list = RecencyList::new();
        list.push_front("a".to_string());
        let b = list.push_front("b".to_string());
        list.push_front("c".to_string());

        assert_eq!(list.remove(b), Some("b".to_string()));
        assert_eq!(list.keys_as_vec(), vec!["c", "a"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_stale_handle_is_none() {
        let mut list = RecencyList::new();
        let a = list.push_front("a".to_string());

        assert_eq!(list.remove(a), Some("a".to_string()));
        // Handle no longer refers to a live node.
        assert_eq!(list.remove(a), None);
    }

    #[test]
    fn test_remove_single_element_resets_ends() {
        let mut list = RecencyList::new();
        let a = list.push_front("a".to_string());
        list.remove(a);

        assert!(list.is_empty());
        // A fresh push must still work with empty head/tail.
        list.push_front("b".to_string());
        assert_eq!(list.keys_as_vec(), vec!["b"]);
        assert_eq!(list.pop_back(), Some("b".to_string()));
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::new();
        list.push_front("a".to_string());
        list.push_front("b".to_string());

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop_back(), None);
    }
}
