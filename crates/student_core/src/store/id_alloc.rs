//! In-process identifier allocator for the volatile backend.

use super::{StoreError, StoreResult};
use crate::model::student::StudentId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing ids, starting at 1.
///
/// Concurrent callers always receive pairwise distinct values with no gaps.
/// Once `StudentId::MAX` has been handed out every further call fails.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn starting_after(start: StudentId) -> Self {
        Self {
            last: AtomicU64::new(start),
        }
    }

    pub fn next(&self) -> StoreResult<StudentId> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| StoreError::IdsExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::IdAllocator;
    use crate::store::StoreError;
    use std::collections::BTreeSet;
    use std::thread;

    #[test]
    fn first_id_is_one_and_ids_increase() {
        let alloc = IdAllocator::new();
        assert_eq!(alloc.next().unwrap(), 1);
        assert_eq!(alloc.next().unwrap(), 2);
    }

    #[test]
    fn top_of_range_fails_instead_of_wrapping() {
        let alloc = IdAllocator::starting_after(u64::MAX - 1);
        assert_eq!(alloc.next().unwrap(), u64::MAX);
        assert!(matches!(alloc.next(), Err(StoreError::IdsExhausted)));
        assert!(matches!(alloc.next(), Err(StoreError::IdsExhausted)));
    }

    #[test]
    fn concurrent_calls_produce_contiguous_distinct_ids() {
        let alloc = IdAllocator::new();
        let ids: Vec<u64> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| (0..250).map(|_| alloc.next().unwrap()).collect::<Vec<_>>())
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        let unique: BTreeSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 2000);
        assert_eq!(unique.into_iter().collect::<Vec<_>>(), (1..=2000).collect::<Vec<_>>());
    }
}
