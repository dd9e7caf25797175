use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;

/// Depth cap for chained type computations. A computation that would recurse
/// past this is treated as "not computable this pass" and left uncached so
/// the next analysis can retry.
pub const MAX_TYPE_RECURSION_DEPTH: u32 = 7;

/// An explicit in-flight-computation set keyed by node identity.
///
/// A re-entrant request for a key already in flight returns `None` (the
/// "unknown, not yet known" sentinel) instead of recursing. The guard also
/// reports whether a computation was re-entered while it ran, so callers only
/// memoize results that were computed without re-entrancy.
#[derive(Debug, Default)]
pub struct RecursionGuard<K> {
    in_flight: RefCell<HashSet<K>>,
    reentered: RefCell<HashSet<K>>,
}

impl<K: Eq + Hash + Clone> RecursionGuard<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: RefCell::new(HashSet::new()),
            reentered: RefCell::new(HashSet::new()),
        }
    }

    /// Run `f` under the guard.
    ///
    /// Returns `None` if `key` is already in flight. Otherwise returns
    /// `Some((value, clean))` where `clean` is false if a re-entrant request
    /// for `key` occurred while `f` ran; such values must not be cached.
    pub fn enter<T>(&self, key: K, f: impl FnOnce() -> T) -> Option<(T, bool)> {
        if self.in_flight.borrow().contains(&key) {
            self.reentered.borrow_mut().insert(key);
            return None;
        }

        self.in_flight.borrow_mut().insert(key.clone());
        let value = f();
        self.in_flight.borrow_mut().remove(&key);
        let clean = !self.reentered.borrow_mut().remove(&key);
        Some((value, clean))
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.in_flight.borrow().len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentrant_request_returns_sentinel() {
        let guard = RecursionGuard::new();
        let (value, clean) = guard
            .enter(1u32, || {
                // The nested request for the same key must short-circuit.
                assert!(guard.enter(1u32, || unreachable!("recursed")).is_none());
                42
            })
            .expect("outer call is not re-entrant");
        assert_eq!(value, 42);
        assert!(!clean, "re-entered computations must not be cached");
    }

    #[test]
    fn independent_keys_are_clean() {
        let guard = RecursionGuard::new();
        let (_, clean) = guard.enter(1u32, || ()).expect("not in flight");
        assert!(clean);
        let (_, clean) = guard
            .enter(2u32, || {
                let (_, inner_clean) = guard.enter(3u32, || ()).expect("distinct key");
                assert!(inner_clean);
            })
            .expect("not in flight");
        assert!(clean);
    }
}
