//! A thread-safe wrapper around [`InvertedIndex`], locking every operation through
//! [`RwGate`]. Returned collections are owned snapshots, never live aliases into the
//! locked state, so callers are free to use them after the lock is released.

use std::cell::UnsafeCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::index::{InvertedIndex, SearchResult};
use crate::rwlock::RwGate;

/// Wraps [`InvertedIndex`] behind a reader/writer lock. Every read (`search`, the
/// getters, serialization inputs) holds the read lock for its full duration; every
/// mutation (`add`, `add_all`) holds the write lock.
pub struct LockedIndex {
    gate: RwGate,
    inner: UnsafeCell<InvertedIndex>,
}

// SAFETY: all access to `inner` goes through `gate`, which enforces exclusive write
// access and shared-only read access across threads.
unsafe impl Sync for LockedIndex {}
unsafe impl Send for LockedIndex {}

impl Default for LockedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LockedIndex {
    pub fn new() -> Self {
        LockedIndex { gate: RwGate::new(), inner: UnsafeCell::new(InvertedIndex::new()) }
    }

    pub fn add(&self, term: &str, location: &str, position: u32) {
        self.gate.acquire_write();
        // SAFETY: the write lock is held for the duration of this access.
        unsafe { (*self.inner.get()).add(term, location, position) };
        self.gate.release_write().expect("write lock released by non-owner");
    }

    /// Merge a private, unsynchronized local index (built by one crawl/parse task)
    /// into the shared index in a single write-lock critical section.
    pub fn add_all(&self, other: &InvertedIndex) {
        self.gate.acquire_write();
        unsafe { (*self.inner.get()).add_all(other) };
        self.gate.release_write().expect("write lock released by non-owner");
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.read(|idx| idx.has_term(term))
    }

    pub fn has_location(&self, term: &str, location: &str) -> bool {
        self.read(|idx| idx.has_location(term, location))
    }

    pub fn has_position(&self, term: &str, location: &str, position: u32) -> bool {
        self.read(|idx| idx.has_position(term, location, position))
    }

    pub fn num_terms(&self) -> usize {
        self.read(|idx| idx.num_terms())
    }

    pub fn num_locations(&self, term: &str) -> usize {
        self.read(|idx| idx.num_locations(term))
    }

    pub fn num_positions(&self, term: &str, location: &str) -> usize {
        self.read(|idx| idx.num_positions(term, location))
    }

    pub fn search(&self, query: &[String], exact: bool) -> Vec<SearchResult> {
        self.read(|idx| idx.search(query.iter().map(String::as_str), exact))
    }

    /// An owned, defensive copy of the index's full term structure, taken under the
    /// read lock — safe to serialize or iterate after the lock is released.
    pub fn snapshot_terms(&self) -> BTreeMap<String, BTreeMap<String, BTreeSet<u32>>> {
        self.read(|idx| idx.terms().clone())
    }

    /// An owned, defensive copy of the location→count map.
    pub fn snapshot_counts(&self) -> BTreeMap<String, u32> {
        self.read(|idx| idx.counts().clone())
    }

    fn read<T>(&self, f: impl FnOnce(&InvertedIndex) -> T) -> T {
        self.gate.acquire_read();
        // SAFETY: the read lock is held for the duration of this access; writers are
        // excluded while any reader holds the gate.
        let result = f(unsafe { &*self.inner.get() });
        self.gate.release_read();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_writers_never_lose_positions() {
        let index = Arc::new(LockedIndex::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    let mut local = InvertedIndex::new();
                    local.add("term", "loc", i + 1);
                    index.add_all(&local);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(index.num_positions("term", "loc"), 8);
        assert_eq!(index.snapshot_counts()["loc"], 8);
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let index = LockedIndex::new();
        index.add("a", "x", 1);
        let snapshot = index.snapshot_terms();
        index.add("b", "y", 1);
        assert!(snapshot.contains_key("a"));
        assert!(!snapshot.contains_key("b"));
    }

    #[test]
    fn search_reflects_committed_state() {
        let index = LockedIndex::new();
        index.add("hello", "/a.txt", 1);
        index.add("hello", "/a.txt", 2);
        let results = index.search(&["hello".to_string()], true);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].query_count, 2);
        let no_matches = index.search(&["nonexistent".to_string()], true);
        assert!(no_matches.is_empty());
    }

    #[test]
    fn readers_run_concurrently_while_no_writer_is_active() {
        let index = Arc::new(LockedIndex::new());
        index.add("x", "loc", 1);
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let index = Arc::clone(&index);
                let concurrent = Arc::clone(&concurrent);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    index.read(|_| {
                        let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(10));
                        concurrent.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(max_seen.load(Ordering::SeqCst) > 1);
    }
}
