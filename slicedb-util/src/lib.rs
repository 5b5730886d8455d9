//! Miscellaneous utilities shared by every crate in the slice-db workspace:
//! the packed row id type, the per-table dedup set it feeds, the LIFO
//! parallelism semaphore, and the cancel-on-first-error task join primitive.

mod row_id;
mod row_id_set;
mod semaphore;
mod task_join;

pub use row_id::{RowId, ROW_ID_BITS};
pub use row_id_set::RowIdSet;
pub use semaphore::{LifoPermit, LifoSemaphore};
pub use task_join::TaskJoin;

/// Upper bound on the number of row ids in a single [`TableSegment`]
/// (`slicedb_schema::TableSegment`), so per-task memory and downstream
/// stream sizes stay bounded.
pub const MAX_SEGMENT_ROWS: usize = 250_000;

/// Splits a slice of novel row ids into chunks of at most
/// [`MAX_SEGMENT_ROWS`], preserving order — the partitioning step shared by
/// every discovery query in the traversal engine.
pub fn partition_into_segments<T: Clone>(ids: &[T]) -> Vec<Vec<T>> {
    ids.chunks(MAX_SEGMENT_ROWS).map(|c| c.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_respect_the_cap() {
        let ids: Vec<u32> = (0..(MAX_SEGMENT_ROWS * 2 + 10) as u32).collect();
        let segments = partition_into_segments(&ids);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), MAX_SEGMENT_ROWS);
        assert_eq!(segments[1].len(), MAX_SEGMENT_ROWS);
        assert_eq!(segments[2].len(), 10);
    }
}
