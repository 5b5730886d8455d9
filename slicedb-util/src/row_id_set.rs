//! Per-table deduplicating set of [`RowId`]s.
//!
//! Backed by a sorted array behind a mutex rather than a hash set: dump
//! workloads insert millions of ids in sorted bursts, and a flat integer
//! array is far smaller than a hash set of boxed integers.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::row_id::RowId;

/// A monotonically growing, duplicate-free, sorted set of row ids for a
/// single table.
///
/// `add` is safe to call concurrently; concurrent calls on the *same* set
/// are serialized by an internal mutex and each sees a consistent,
/// deduplicated view of novelty. Concurrent calls on *different* sets never
/// contend with each other.
#[derive(Default)]
pub struct RowIdSet {
    sorted: Mutex<Vec<RowId>>,
}

impl RowIdSet {
    pub fn new() -> Self {
        RowIdSet {
            sorted: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of distinct ids admitted so far.
    pub fn len(&self) -> usize {
        self.sorted.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds candidate ids (in any order, possibly with duplicates) and
    /// returns the subset that was not already present, preserving the
    /// input order of first occurrence.
    pub fn add(&self, candidates: &[RowId]) -> Vec<RowId> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut guard = self.sorted.lock().unwrap();

        let mut seen_in_batch = HashSet::with_capacity(candidates.len());
        let mut novel = Vec::with_capacity(candidates.len());
        for &id in candidates {
            if !seen_in_batch.insert(id) {
                continue;
            }
            if guard.binary_search(&id).is_err() {
                novel.push(id);
            }
        }

        if novel.is_empty() {
            return novel;
        }

        guard.extend_from_slice(&novel);
        guard.sort_unstable();
        guard.dedup();

        novel
    }

    /// Returns true if `id` has already been admitted.
    pub fn contains(&self, id: RowId) -> bool {
        self.sorted.lock().unwrap().binary_search(&id).is_ok()
    }

    /// A snapshot of all admitted ids, in sorted order.
    pub fn snapshot(&self) -> Vec<RowId> {
        self.sorted.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn ids(values: &[u64]) -> Vec<RowId> {
        values
            .iter()
            .map(|&v| RowId::from_packed(v, "t").unwrap())
            .collect()
    }

    #[test]
    fn returns_only_novel_ids_in_input_order() {
        let set = RowIdSet::new();
        let first = set.add(&ids(&[3, 1, 2]));
        assert_eq!(first, ids(&[3, 1, 2]));

        let second = set.add(&ids(&[1, 4, 2, 5]));
        assert_eq!(second, ids(&[4, 5]));
    }

    #[test]
    fn dedups_within_a_single_batch() {
        let set = RowIdSet::new();
        let novel = set.add(&ids(&[1, 1, 2, 2, 3]));
        assert_eq!(novel, ids(&[1, 2, 3]));
    }

    #[test]
    fn total_admitted_matches_distinct_count() {
        let set = RowIdSet::new();
        set.add(&ids(&[1, 2, 3]));
        set.add(&ids(&[2, 3, 4]));
        set.add(&ids(&[4, 5]));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn concurrent_adds_on_same_set_stay_deduplicated() {
        let set = Arc::new(RowIdSet::new());
        let mut handles = Vec::new();
        for batch in 0..8u64 {
            let set = Arc::clone(&set);
            handles.push(thread::spawn(move || {
                let batch_ids: Vec<RowId> = (0..1000)
                    .map(|i| RowId::from_packed(i, "t").unwrap())
                    .collect();
                let _ = batch;
                set.add(&batch_ids)
            }));
        }
        let mut total_novel = 0;
        for h in handles {
            total_novel += h.join().unwrap().len();
        }
        // 8 threads race to add the same 1000 ids; exactly 1000 should win.
        assert_eq!(total_novel, 1000);
        assert_eq!(set.len(), 1000);
    }
}
