use thiserror::Error;

/// Result type used by fallible set and table operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by the table, its cursor and the batch splitter.
///
/// Every variant describes a caller mistake. The table is never left in a
/// modified state when one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The load factor was NaN, not positive, or greater than one.
    #[error("load factor must be in (0, 1], got {0}")]
    InvalidLoadFactor(f32),

    /// The requested capacity cannot be rounded up to a power of two.
    #[error("capacity overflow: cannot hold {0} elements")]
    CapacityOverflow(usize),

    /// Batches must cover at least one slot.
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// A section index outside `0..count`, or zero sections.
    #[error("section {index} is out of range for {count} sections")]
    InvalidSection {
        /// Requested section.
        index: usize,
        /// Number of sections the table was divided into.
        count: usize,
    },

    /// `next()` was called on a cursor that already yielded every element.
    #[error("next() called, but the cursor is exhausted")]
    CursorExhausted,

    /// `remove()` was called without a preceding `next()`, or twice for the
    /// same element.
    #[error("next() must be called as many times as remove()")]
    NothingToRemove,
}
