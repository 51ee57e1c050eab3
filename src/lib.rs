#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used when none is given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder when neither `foldhash` nor `std` is enabled. It does not
        /// implement `BuildHasher`; pass a hasher builder explicitly.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}

/// Fixed-size slot ranges of a table and the batch operations run over them.
pub mod batch;

mod error;

mod external_trait_impls;

/// A hash set whose elements use their own `Hash` and `Eq`.
pub mod hash_set;

pub mod hash_table;

/// Hashing strategies: pluggable hash and equality for sets.
pub mod strategy;

/// A hash set parameterized by a [`HashingStrategy`].
pub mod strategy_set;

pub use error::Error;
pub use error::Result;
#[cfg(feature = "rayon")]
pub use external_trait_impls::rayon::ParallelIterable;
pub use hash_set::UnifiedSet;
pub use hash_table::HashTable;
pub use hash_table::LoadFactor;
pub use strategy::HashingStrategy;
pub use strategy_set::StrategySet;

/// Creates a [`UnifiedSet`] holding the given elements.
///
/// Duplicates are collapsed; the set is sized for the number of arguments.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use unified_set::unified_set;
///
/// let set = unified_set![1, 2, 3, 2];
/// assert_eq!(set.len(), 3);
/// assert!(set.contains(&2));
///
/// let empty: unified_set::UnifiedSet<u8> = unified_set![];
/// assert!(empty.is_empty());
/// # }
/// ```
#[macro_export]
macro_rules! unified_set {
    () => {
        $crate::UnifiedSet::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let values = [$($value),+];
        let mut set = $crate::UnifiedSet::with_capacity(values.len());
        set.add_all(values);
        set
    }};
}
