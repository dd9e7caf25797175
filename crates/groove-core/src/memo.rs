use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// A memoization cell keyed by node identity, with a manual invalidation
/// hook.
///
/// The core declares cache keys; the external tree owner decides when to
/// invalidate and does so through [`MemoMap::clear`]. Recomputation producing
/// an equal value is always acceptable, so lookups hand out clones.
#[derive(Debug, Default)]
pub struct MemoMap<K, V> {
    map: RefCell<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> MemoMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        self.map.borrow_mut().insert(key, value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    /// Drop everything. Called on the owner's "tree changed" signal.
    pub fn clear(&self) {
        self.map.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_clear() {
        let memo: MemoMap<u32, String> = MemoMap::new();
        assert_eq!(memo.get(&1), None);
        memo.insert(1, "one".to_string());
        assert_eq!(memo.get(&1).as_deref(), Some("one"));
        memo.clear();
        assert!(memo.is_empty());
    }
}
