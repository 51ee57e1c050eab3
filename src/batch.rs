use alloc::sync::Arc;
use core::iter::FusedIterator;
use core::ops::ControlFlow;
use core::ops::Range;

use crate::error::Error;
use crate::error::Result;
use crate::hash_table::HashTable;
use crate::strategy_set::StrategySet;

/// A read-only run of values that can be scanned on its own.
///
/// Batches only ever read. The scan methods take `&self`, so one batch can be
/// scanned any number of times, and the adapters ([`select`], [`collect`],
/// ...) wrap a batch without touching its values until it is scanned.
///
/// [`select`]: Batch::select
/// [`collect`]: Batch::collect
pub trait Batch: Sized {
    /// The values the batch yields.
    type Item;

    /// Feeds every value to `f` until it breaks.
    fn try_for_each<R, F>(&self, f: F) -> ControlFlow<R>
    where
        F: FnMut(Self::Item) -> ControlFlow<R>;

    /// Calls `f` with every value.
    fn for_each(&self, mut f: impl FnMut(Self::Item)) {
        let _ = self.try_for_each(|item| {
            f(item);
            ControlFlow::<()>::Continue(())
        });
    }

    /// Returns `true` if any value matches, stopping at the first one.
    fn any_satisfy(&self, mut predicate: impl FnMut(&Self::Item) -> bool) -> bool {
        self.try_for_each(|item| {
            if predicate(&item) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    /// Returns `true` if every value matches, stopping at the first miss.
    fn all_satisfy(&self, mut predicate: impl FnMut(&Self::Item) -> bool) -> bool {
        !self.any_satisfy(|item| !predicate(item))
    }

    /// The first value that matches.
    fn detect(&self, mut predicate: impl FnMut(&Self::Item) -> bool) -> Option<Self::Item> {
        match self.try_for_each(|item| {
            if predicate(&item) {
                ControlFlow::Break(item)
            } else {
                ControlFlow::Continue(())
            }
        }) {
            ControlFlow::Break(item) => Some(item),
            ControlFlow::Continue(()) => None,
        }
    }

    /// Number of values that match.
    fn count(&self, mut predicate: impl FnMut(&Self::Item) -> bool) -> usize {
        let mut count = 0;
        self.for_each(|item| {
            if predicate(&item) {
                count += 1;
            }
        });
        count
    }

    /// Only the values matching `predicate`.
    fn select<P>(self, predicate: P) -> Select<Self, P>
    where
        P: Fn(&Self::Item) -> bool,
    {
        Select::shared(self, Arc::new(predicate))
    }

    /// Only the values not matching `predicate`.
    fn reject<P>(self, predicate: P) -> Reject<Self, P>
    where
        P: Fn(&Self::Item) -> bool,
    {
        Reject::shared(self, Arc::new(predicate))
    }

    /// Every value mapped through `function`.
    fn collect<F, U>(self, function: F) -> Collect<Self, F>
    where
        F: Fn(Self::Item) -> U,
    {
        Collect::shared(self, Arc::new(function))
    }

    /// Every item of the iterables `function` returns, in order.
    fn flat_collect<F, I>(self, function: F) -> FlatCollect<Self, F>
    where
        F: Fn(Self::Item) -> I,
        I: IntoIterator,
    {
        FlatCollect::shared(self, Arc::new(function))
    }
}

/// A contiguous half-open range of a table's slots.
///
/// Created by [`HashTable::split`] and [`StrategySet::split`].
pub struct TableBatch<'a, T> {
    table: &'a HashTable<T>,
    start: usize,
    end: usize,
}

impl<T> Clone for TableBatch<'_, T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            start: self.start,
            end: self.end,
        }
    }
}

impl<T> core::fmt::Debug for TableBatch<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TableBatch")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl<T> TableBatch<'_, T> {
    /// The slot indices this batch covers.
    pub fn slots(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl<'a, T> Batch for TableBatch<'a, T> {
    type Item = &'a T;

    fn try_for_each<R, F>(&self, f: F) -> ControlFlow<R>
    where
        F: FnMut(Self::Item) -> ControlFlow<R>,
    {
        self.table.values_in(self.start..self.end).try_for_each(f)
    }
}

/// Consecutive [`TableBatch`]es of a fixed number of slots; the last one is
/// truncated to the table's capacity.
///
/// A clone continues from the same batch; calling `split` again starts over.
pub struct Split<'a, T> {
    table: &'a HashTable<T>,
    batch_size: usize,
    next_start: usize,
}

impl<T> Clone for Split<'_, T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            batch_size: self.batch_size,
            next_start: self.next_start,
        }
    }
}

impl<'a, T> Iterator for Split<'a, T> {
    type Item = TableBatch<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let capacity = self.table.capacity();
        if self.next_start >= capacity {
            return None;
        }

        let start = self.next_start;
        let end = start.saturating_add(self.batch_size).min(capacity);
        self.next_start = end;
        Some(TableBatch {
            table: self.table,
            start,
            end,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .table
            .capacity()
            .saturating_sub(self.next_start)
            .div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Split<'_, T> {}

impl<T> FusedIterator for Split<'_, T> {}

impl<T> HashTable<T> {
    /// Divides the slots into batches of `batch_size` slots.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBatchSize`] when `batch_size` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::batch::Batch;
    /// # use unified_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// for n in 0..10u64 {
    ///     table.insert_unique(n, n, |&n| n);
    /// }
    ///
    /// let batches: Vec<_> = table.split(5).unwrap().collect();
    /// assert_eq!(batches.len(), table.capacity().div_ceil(5));
    ///
    /// let total: usize = batches.iter().map(|batch| batch.count(|_| true)).sum();
    /// assert_eq!(total, 10);
    /// ```
    pub fn split(&self, batch_size: usize) -> Result<Split<'_, T>> {
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize(batch_size));
        }
        Ok(Split {
            table: self,
            batch_size,
            next_start: 0,
        })
    }
}

impl<T, H> StrategySet<T, H> {
    /// Divides the set's slots into batches of `batch_size` slots.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBatchSize`] when `batch_size` is zero.
    pub fn split(&self, batch_size: usize) -> Result<Split<'_, T>> {
        self.table.split(batch_size)
    }
}

/// Values of a batch that match a predicate.
pub struct Select<B, P> {
    batch: B,
    predicate: Arc<P>,
}

impl<B, P> Select<B, P> {
    pub(crate) fn shared(batch: B, predicate: Arc<P>) -> Self {
        Self { batch, predicate }
    }
}

impl<B, P> Batch for Select<B, P>
where
    B: Batch,
    P: Fn(&B::Item) -> bool,
{
    type Item = B::Item;

    fn try_for_each<R, F>(&self, mut f: F) -> ControlFlow<R>
    where
        F: FnMut(Self::Item) -> ControlFlow<R>,
    {
        self.batch.try_for_each(|item| {
            if (self.predicate)(&item) {
                f(item)
            } else {
                ControlFlow::Continue(())
            }
        })
    }
}

/// Values of a batch that do not match a predicate.
pub struct Reject<B, P> {
    batch: B,
    predicate: Arc<P>,
}

impl<B, P> Reject<B, P> {
    pub(crate) fn shared(batch: B, predicate: Arc<P>) -> Self {
        Self { batch, predicate }
    }
}

impl<B, P> Batch for Reject<B, P>
where
    B: Batch,
    P: Fn(&B::Item) -> bool,
{
    type Item = B::Item;

    fn try_for_each<R, F>(&self, mut f: F) -> ControlFlow<R>
    where
        F: FnMut(Self::Item) -> ControlFlow<R>,
    {
        self.batch.try_for_each(|item| {
            if (self.predicate)(&item) {
                ControlFlow::Continue(())
            } else {
                f(item)
            }
        })
    }
}

/// Values of a batch mapped through a function.
pub struct Collect<B, F> {
    batch: B,
    function: Arc<F>,
}

impl<B, F> Collect<B, F> {
    pub(crate) fn shared(batch: B, function: Arc<F>) -> Self {
        Self { batch, function }
    }
}

impl<B, F, U> Batch for Collect<B, F>
where
    B: Batch,
    F: Fn(B::Item) -> U,
{
    type Item = U;

    fn try_for_each<R, G>(&self, mut f: G) -> ControlFlow<R>
    where
        G: FnMut(Self::Item) -> ControlFlow<R>,
    {
        self.batch.try_for_each(|item| f((self.function)(item)))
    }
}

/// The flattened iterables a function returns for each value of a batch.
pub struct FlatCollect<B, F> {
    batch: B,
    function: Arc<F>,
}

impl<B, F> FlatCollect<B, F> {
    pub(crate) fn shared(batch: B, function: Arc<F>) -> Self {
        Self { batch, function }
    }
}

impl<B, F, I> Batch for FlatCollect<B, F>
where
    B: Batch,
    F: Fn(B::Item) -> I,
    I: IntoIterator,
{
    type Item = I::Item;

    fn try_for_each<R, G>(&self, mut f: G) -> ControlFlow<R>
    where
        G: FnMut(Self::Item) -> ControlFlow<R>,
    {
        self.batch
            .try_for_each(|item| (self.function)(item).into_iter().try_for_each(&mut f))
    }
}
