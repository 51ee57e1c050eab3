use alloc::sync::Arc;
use alloc::vec::Vec;

use rayon::ThreadPool;
use rayon::prelude::*;

use crate::batch::Batch;
use crate::batch::Collect;
use crate::batch::FlatCollect;
use crate::batch::Reject;
use crate::batch::Select;
use crate::batch::TableBatch;
use crate::error::Result;
use crate::hash_table::HashTable;
use crate::strategy_set::StrategySet;

/// Batches scanned as independent tasks on a [`rayon`] thread pool.
///
/// The batches borrow their table for `'p`, so the table cannot be mutated
/// while a parallel scan is possible. Each batch is handed to one task; no
/// state is shared between tasks except the closure passed in.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use unified_set::UnifiedSet;
///
/// let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
/// let set: UnifiedSet<u32> = (0..1000).collect();
///
/// let parallel = set.as_parallel(&pool, 64).unwrap();
/// assert_eq!(parallel.count(|&&n| n % 2 == 0), 500);
/// assert!(parallel.any_satisfy(|&&n| n == 999));
/// # }
/// ```
pub struct ParallelIterable<'p, B> {
    pool: &'p ThreadPool,
    batches: Vec<B>,
}

impl<'p, B> ParallelIterable<'p, B> {
    fn with_batches<C>(self, wrap: impl FnMut(B) -> C) -> ParallelIterable<'p, C> {
        ParallelIterable {
            pool: self.pool,
            batches: self.batches.into_iter().map(wrap).collect(),
        }
    }

    /// Number of batches, i.e. tasks per scan.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

impl<'p, B> ParallelIterable<'p, B>
where
    B: Batch + Sync,
    B::Item: Send,
{
    /// Calls `f` with every value, from many threads at once.
    pub fn for_each<F>(&self, f: F)
    where
        F: Fn(B::Item) + Sync + Send,
    {
        self.pool
            .install(|| self.batches.par_iter().for_each(|batch| batch.for_each(&f)));
    }

    /// Returns `true` if any value matches. Tasks stop early once one does.
    pub fn any_satisfy<P>(&self, predicate: P) -> bool
    where
        P: Fn(&B::Item) -> bool + Sync + Send,
    {
        self.pool.install(|| {
            self.batches
                .par_iter()
                .any(|batch| batch.any_satisfy(&predicate))
        })
    }

    /// Returns `true` if every value matches.
    pub fn all_satisfy<P>(&self, predicate: P) -> bool
    where
        P: Fn(&B::Item) -> bool + Sync + Send,
    {
        self.pool.install(|| {
            self.batches
                .par_iter()
                .all(|batch| batch.all_satisfy(&predicate))
        })
    }

    /// Some value that matches; which one is unspecified when several do.
    pub fn detect<P>(&self, predicate: P) -> Option<B::Item>
    where
        P: Fn(&B::Item) -> bool + Sync + Send,
    {
        self.pool.install(|| {
            self.batches
                .par_iter()
                .find_map_any(|batch| batch.detect(&predicate))
        })
    }

    /// Number of values that match.
    pub fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&B::Item) -> bool + Sync + Send,
    {
        self.pool.install(|| {
            self.batches
                .par_iter()
                .map(|batch| batch.count(&predicate))
                .sum()
        })
    }

    /// Every value, batch by batch in slot order.
    pub fn to_vec(&self) -> Vec<B::Item> {
        let chunks: Vec<Vec<B::Item>> = self.pool.install(|| {
            self.batches
                .par_iter()
                .map(|batch| {
                    let mut values = Vec::new();
                    batch.for_each(|value| values.push(value));
                    values
                })
                .collect()
        });
        chunks.into_iter().flatten().collect()
    }
}

impl<'p, B> ParallelIterable<'p, B>
where
    B: Batch,
{
    /// Only the values matching `predicate`. Nothing runs until a scan.
    pub fn select<P>(self, predicate: P) -> ParallelIterable<'p, Select<B, P>>
    where
        P: Fn(&B::Item) -> bool,
    {
        let predicate = Arc::new(predicate);
        self.with_batches(|batch| Select::shared(batch, Arc::clone(&predicate)))
    }

    /// Only the values not matching `predicate`.
    pub fn reject<P>(self, predicate: P) -> ParallelIterable<'p, Reject<B, P>>
    where
        P: Fn(&B::Item) -> bool,
    {
        let predicate = Arc::new(predicate);
        self.with_batches(|batch| Reject::shared(batch, Arc::clone(&predicate)))
    }

    /// Every value mapped through `function`.
    pub fn collect<F, U>(self, function: F) -> ParallelIterable<'p, Collect<B, F>>
    where
        F: Fn(B::Item) -> U,
    {
        let function = Arc::new(function);
        self.with_batches(|batch| Collect::shared(batch, Arc::clone(&function)))
    }

    /// Every item of the iterables `function` returns.
    pub fn flat_collect<F, I>(self, function: F) -> ParallelIterable<'p, FlatCollect<B, F>>
    where
        F: Fn(B::Item) -> I,
        I: IntoIterator,
    {
        let function = Arc::new(function);
        self.with_batches(|batch| FlatCollect::shared(batch, Arc::clone(&function)))
    }
}

impl<T> HashTable<T>
where
    T: Sync,
{
    /// Splits the table into batches of `batch_size` slots to be scanned on
    /// `pool`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBatchSize`](crate::Error::InvalidBatchSize) when
    /// `batch_size` is zero. Nothing is scheduled in that case.
    pub fn as_parallel<'a>(
        &'a self,
        pool: &'a ThreadPool,
        batch_size: usize,
    ) -> Result<ParallelIterable<'a, TableBatch<'a, T>>> {
        Ok(ParallelIterable {
            pool,
            batches: self.split(batch_size)?.collect(),
        })
    }
}

impl<T, H> StrategySet<T, H>
where
    T: Sync,
{
    /// Splits the set into batches of `batch_size` slots to be scanned on
    /// `pool`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBatchSize`](crate::Error::InvalidBatchSize) when
    /// `batch_size` is zero.
    pub fn as_parallel<'a>(
        &'a self,
        pool: &'a ThreadPool,
        batch_size: usize,
    ) -> Result<ParallelIterable<'a, TableBatch<'a, T>>> {
        self.table.as_parallel(pool, batch_size)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::sync::atomic::AtomicUsize;
    use core::sync::atomic::Ordering;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rayon::ThreadPoolBuilder;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::Error;
    use crate::UnifiedSet;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    fn numbers(n: u32) -> UnifiedSet<u32, SipHashBuilder> {
        (0..n).collect()
    }

    #[test]
    fn batches_visit_every_element_once() {
        let pool = pool();
        let set = numbers(1000);

        for batch_size in [1, 7, 64, 1000, usize::MAX] {
            let parallel = set.as_parallel(&pool, batch_size).unwrap();
            assert_eq!(parallel.batch_count(), set.capacity().div_ceil(batch_size));

            let mut seen: Vec<u32> = parallel.to_vec().into_iter().copied().collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..1000).collect::<Vec<_>>(), "batch size {batch_size}");

            let visits = AtomicUsize::new(0);
            parallel.for_each(|_| {
                visits.fetch_add(1, Ordering::Relaxed);
            });
            assert_eq!(visits.into_inner(), 1000);
        }
    }

    #[test]
    fn to_vec_keeps_slot_order() {
        let pool = pool();
        let set = numbers(300);
        let sequential: Vec<u32> = set.iter().copied().collect();
        let parallel: Vec<u32> = set
            .as_parallel(&pool, 16)
            .unwrap()
            .to_vec()
            .into_iter()
            .copied()
            .collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn predicates_match_sequential_answers() {
        let pool = pool();
        let set = numbers(500);
        let parallel = set.as_parallel(&pool, 32).unwrap();

        for target in [0, 250, 499, 500, 10_000] {
            assert_eq!(
                parallel.any_satisfy(|&&n| n == target),
                set.iter().any(|&n| n == target)
            );
            assert_eq!(
                parallel.all_satisfy(|&&n| n != target),
                set.iter().all(|&n| n != target)
            );
        }

        assert_eq!(parallel.count(|&&n| n % 5 == 0), 100);
        assert!(parallel.detect(|&&n| n > 400).is_some_and(|&n| n > 400));
        assert_eq!(parallel.detect(|&&n| n > 500), None);
    }

    #[test]
    fn lazy_adapters() {
        let pool = pool();
        let set = numbers(100);
        let parallel = set.as_parallel(&pool, 8).unwrap();
        let batches = parallel.batch_count();

        let labels = parallel
            .select(|&&n| n < 10)
            .collect(|&n| n.to_string())
            .flat_collect(|label: String| label.into_bytes());
        assert_eq!(labels.batch_count(), batches);

        let mut bytes = labels.to_vec();
        bytes.sort_unstable();
        let mut expected: Vec<u8> = (0..10).flat_map(|n: u32| n.to_string().into_bytes()).collect();
        expected.sort_unstable();
        assert_eq!(bytes, expected);

        let odd = set.as_parallel(&pool, 8).unwrap().reject(|&&n| n % 2 == 0);
        assert_eq!(odd.count(|_| true), 50);
    }

    #[test]
    fn zero_batch_size_fails_immediately() {
        let pool = pool();
        let set = numbers(10);
        assert!(matches!(
            set.as_parallel(&pool, 0),
            Err(Error::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn empty_set_scans_nothing() {
        let pool = pool();
        let set = numbers(0);
        let parallel = set.as_parallel(&pool, 4).unwrap();
        assert!(!parallel.any_satisfy(|_| true));
        assert!(parallel.all_satisfy(|_| false));
        assert!(parallel.to_vec().is_empty());
    }
}
