use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::hash_table::Iter;
use crate::strategy::HashingStrategy;
use crate::strategy::Native;
use crate::strategy_set::StrategySet;

/// A hash set of elements compared by their own `Hash` and `Eq`.
///
/// `UnifiedSet<T, S>` is a [`StrategySet`] using the [`Native`] strategy
/// with hasher builder `S`. Elements sit directly in a power-of-two slot
/// array; elements whose hashes collide share one slot through a packed chain
/// of three-element nodes, so no per-element node is allocated.
///
/// # Performance Characteristics
///
/// - **Memory**: one slot per `1 / load_factor` elements; collisions allocate
///   one chain node per three colliding elements.
/// - **Growth**: doubles when the element count would exceed
///   `capacity × load_factor`.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use unified_set::UnifiedSet;
///
/// let mut set = UnifiedSet::new();
/// set.insert("a");
/// set.insert("b");
/// assert!(!set.insert("a"));
/// assert_eq!(set.len(), 2);
/// # }
/// ```
pub type UnifiedSet<T, S = DefaultHashBuilder> = StrategySet<T, Native<S>>;

impl<T, S> StrategySet<T, Native<S>> {
    /// Creates an empty set hashing with `hash_builder`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use unified_set::UnifiedSet;
    ///
    /// let set: UnifiedSet<i32, _> = UnifiedSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_strategy(Native::new(hash_builder))
    }

    /// Creates a set that holds `capacity` elements without growing.
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_strategy(capacity, Native::new(hash_builder))
    }

    /// Creates a set that holds `capacity` elements at `load_factor` without
    /// growing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLoadFactor`](crate::Error::InvalidLoadFactor) unless
    /// `load_factor` is in `(0, 1]`.
    pub fn with_capacity_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Result<Self> {
        Self::with_capacity_load_factor_and_strategy(
            capacity,
            load_factor,
            Native::new(hash_builder),
        )
    }

    /// The set's hasher builder.
    pub fn hasher(&self) -> &S {
        self.strategy.hash_builder()
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<T> StrategySet<T, Native<DefaultHashBuilder>> {
    /// Creates an empty set with 16 slots, room for 12 elements at the
    /// default load factor of 0.75.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use unified_set::UnifiedSet;
    ///
    /// let set: UnifiedSet<i32> = UnifiedSet::new();
    /// assert_eq!(set.capacity(), 16);
    /// assert_eq!(set.load_factor(), 0.75);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a set that holds `capacity` elements without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use unified_set::UnifiedSet;
    ///
    /// let set: UnifiedSet<i32> = UnifiedSet::with_capacity(100);
    /// // ceil(100 / 0.75) = 134, rounded up to a power of two.
    /// assert_eq!(set.capacity(), 256);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates a set that holds `capacity` elements at `load_factor` without
    /// growing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLoadFactor`](crate::Error::InvalidLoadFactor) unless
    /// `load_factor` is in `(0, 1]`.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_capacity_load_factor_and_hasher(
            capacity,
            load_factor,
            DefaultHashBuilder::default(),
        )
    }
}

impl<T, H> StrategySet<T, H>
where
    H: HashingStrategy<T>,
{
    /// Returns `true` if `self` and `other` have no elements in common.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use unified_set::unified_set;
    ///
    /// let a = unified_set![1, 2];
    /// let mut b = unified_set![3, 4];
    /// assert!(a.is_disjoint(&b));
    ///
    /// b.insert(2);
    /// assert!(!a.is_disjoint(&b));
    /// # }
    /// ```
    pub fn is_disjoint(&self, other: &Self) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if `other` contains every element of `self`.
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if `self` contains every element of `other`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Iterates the elements of `self`, then the elements of `other` missing
    /// from `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use unified_set::unified_set;
    ///
    /// let a = unified_set![1, 2];
    /// let b = unified_set![2, 3];
    ///
    /// let union: Vec<_> = a.union(&b).copied().collect();
    /// assert_eq!(union.len(), 3);
    /// # }
    /// ```
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, T, H> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            other_set: self,
        }
    }

    /// Iterates the elements present in both sets, scanning the smaller one.
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, T, H> {
        if self.len() <= other.len() {
            Intersection {
                iter: self.iter(),
                other,
            }
        } else {
            Intersection {
                iter: other.iter(),
                other: self,
            }
        }
    }

    /// Iterates the elements of `self` missing from `other`.
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, T, H> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Iterates the elements present in exactly one of the sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use unified_set::unified_set;
    ///
    /// let a = unified_set![1, 2];
    /// let b = unified_set![2, 3];
    ///
    /// let mut sym_diff: Vec<_> = a.symmetric_difference(&b).copied().collect();
    /// sym_diff.sort();
    /// assert_eq!(sym_diff, [1, 3]);
    /// # }
    /// ```
    pub fn symmetric_difference<'a>(&'a self, other: &'a Self) -> SymmetricDifference<'a, T, H> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, H> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    other_set: &'a StrategySet<T, H>,
}

impl<'a, T, H> Iterator for Union<'a, T, H>
where
    H: HashingStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.other_set.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, H> {
    iter: Iter<'a, T>,
    other: &'a StrategySet<T, H>,
}

impl<'a, T, H> Iterator for Intersection<'a, T, H>
where
    H: HashingStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, H> {
    iter: Iter<'a, T>,
    other: &'a StrategySet<T, H>,
}

impl<'a, T, H> Iterator for Difference<'a, T, H>
where
    H: HashingStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, H> {
    iter: core::iter::Chain<Difference<'a, T, H>, Difference<'a, T, H>>,
}

impl<'a, T, H> Iterator for SymmetricDifference<'a, T, H>
where
    H: HashingStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::Error;

    #[derive(Clone, Debug)]
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

    #[test]
    fn test_default_and_with_hasher() {
        let set: UnifiedSet<i32, SipHashBuilder> = UnifiedSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 16);
        assert_eq!(set.load_factor(), 0.75);

        let set2 = UnifiedSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
        assert_eq!(set2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let set = UnifiedSet::<i32, _>::with_capacity_and_hasher(100, SipHashBuilder::default());
        assert_eq!(set.capacity(), 256);
        assert!(set.is_empty());

        let set2 = UnifiedSet::<i32, _>::with_capacity_and_hasher(0, SipHashBuilder::default());
        assert_eq!(set2.capacity(), 1);
    }

    #[test]
    fn test_with_capacity_and_load_factor() {
        let set = UnifiedSet::<i32, _>::with_capacity_load_factor_and_hasher(
            10,
            0.5,
            SipHashBuilder::default(),
        )
        .unwrap();
        assert_eq!(set.capacity(), 32);
        assert_eq!(set.load_factor(), 0.5);

        for bad in [0.0, -0.5, 1.5, f32::NAN] {
            let result = UnifiedSet::<i32, _>::with_capacity_load_factor_and_hasher(
                10,
                bad,
                SipHashBuilder::default(),
            );
            assert!(matches!(result, Err(Error::InvalidLoadFactor(_))), "{bad}");
        }
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(set.contains(&1));

        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&1));

        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_grows_on_fourth_insert() {
        let mut set = UnifiedSet::<i32, _>::with_capacity_load_factor_and_hasher(
            3,
            0.75,
            SipHashBuilder::default(),
        )
        .unwrap();
        assert_eq!(set.capacity(), 4);

        for n in 1..=3 {
            set.insert(n);
        }
        assert_eq!(set.capacity(), 4);

        set.insert(4);
        assert_eq!(set.capacity(), 8);
        for n in 1..=4 {
            assert!(set.contains(&n));
        }
    }

    #[test]
    fn test_remove() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        assert!(set.remove(&2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(!set.contains(&2));
        assert!(set.contains(&3));

        assert!(!set.remove(&2));
        assert!(!set.remove(&4));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_take() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);

        assert_eq!(set.take(&1), Some(1));
        assert_eq!(set.len(), 1);
        assert!(!set.contains(&1));
        assert!(set.contains(&2));

        assert_eq!(set.take(&1), None);
        assert_eq!(set.take(&3), None);
    }

    #[test]
    fn test_get_and_put() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(42);

        assert_eq!(set.get(&42), Some(&42));
        assert_eq!(set.get(&1), None);

        assert_eq!(*set.put(42), 42);
        assert_eq!(*set.put(7), 7);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);
        let capacity = set.capacity();

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), capacity);
        assert!(!set.contains(&1));
        assert!(!set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_reserve() {
        let mut set = UnifiedSet::<i32, _>::with_hasher(SipHashBuilder::default());
        set.reserve(1000);
        assert!(set.capacity() as f32 * set.load_factor() >= 1000.0);
    }

    #[test]
    fn test_iter() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let values: Vec<i32> = set.iter().copied().collect();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&1));
        assert!(values.contains(&2));
        assert!(values.contains(&3));
        assert_eq!(set.iter().len(), 3);
    }

    #[test]
    fn test_into_iterator() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let values: Vec<i32> = (&set).into_iter().copied().collect();
        assert_eq!(values.len(), 3);

        let mut owned: Vec<i32> = set.into_iter().collect();
        owned.sort_unstable();
        assert_eq!(owned, vec![1, 2, 3]);
    }

    #[test]
    fn test_drain() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let drained: Vec<i32> = set.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(set.is_empty());

        assert!(drained.contains(&1));
        assert!(drained.contains(&2));
        assert!(drained.contains(&3));
    }

    #[test]
    fn test_cursor_removes_everything() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());
        set.add_all(0..200);

        let mut removed = 0;
        let mut cursor = set.cursor();
        while cursor.has_next() {
            cursor.next().unwrap();
            cursor.remove().unwrap();
            removed += 1;
        }
        assert_eq!(removed, 200);
        assert!(set.is_empty());
        set.table.check_invariants();
    }

    #[test]
    fn test_multiple_insertions() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());

        for i in 0..100 {
            assert!(set.insert(i));
        }

        assert_eq!(set.len(), 100);

        for i in 0..100 {
            assert!(set.contains(&i));
        }

        for i in 0..100 {
            assert!(!set.insert(i));
        }

        assert_eq!(set.len(), 100);
        set.table.check_invariants();
    }

    #[test]
    fn test_collision_handling() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());

        for i in 0..1000 {
            assert!(set.insert(i));
        }

        assert_eq!(set.len(), 1000);

        for i in 0..1000 {
            assert!(set.contains(&i));
        }

        for i in (0..1000).step_by(2) {
            assert!(set.remove(&i));
        }

        assert_eq!(set.len(), 500);
        set.table.check_invariants();

        for i in (1..1000).step_by(2) {
            assert!(set.contains(&i));
        }

        for i in (0..1000).step_by(2) {
            assert!(!set.contains(&i));
        }
    }

    #[test]
    fn test_trim_to_size_preserves_elements() {
        let mut set = UnifiedSet::with_capacity_and_hasher(2000, SipHashBuilder::default());
        set.add_all(0..10);
        assert!(set.trim_to_size());
        assert_eq!(set.capacity(), 16);
        assert!(!set.trim_to_size());
        for n in 0..10 {
            assert!(set.contains(&n));
        }
        set.table.check_invariants();
    }

    #[test]
    fn test_string_values() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert("hello".to_string()));
        assert!(set.insert("world".to_string()));
        assert!(set.insert("rust".to_string()));

        assert!(set.contains(&"hello".to_string()));
        assert!(set.contains(&"world".to_string()));
        assert!(set.contains(&"rust".to_string()));
        assert!(!set.contains(&"missing".to_string()));

        assert_eq!(set.len(), 3);

        assert!(!set.insert("hello".to_string()));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_option_elements() {
        let mut set: UnifiedSet<Option<String>, SipHashBuilder> = UnifiedSet::default();
        assert!(set.insert(None));
        assert!(set.insert(Some("x".to_string())));
        assert!(!set.insert(None));
        assert!(set.contains(&None));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_complex_values() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());

        let vec1 = vec![1, 2, 3];
        let vec2 = vec![4, 5, 6];
        let vec3 = vec![1, 2, 3];

        assert!(set.insert(vec1.clone()));
        assert!(set.insert(vec2.clone()));
        assert!(!set.insert(vec3));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&vec1));
        assert!(set.contains(&vec2));
    }

    #[test]
    fn test_edge_cases() {
        let mut set = UnifiedSet::<i32, _>::with_hasher(SipHashBuilder::default());

        assert!(!set.remove(&1));
        assert_eq!(set.take(&1), None);
        assert_eq!(set.get(&1), None);
        assert_eq!(set.first(), None);
        assert_eq!(set.last(), None);

        set.clear();
        assert!(set.is_empty());

        assert_eq!(set.iter().count(), 0);
        assert_eq!(set.drain().count(), 0);
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set = UnifiedSet::with_hasher(SipHashBuilder::default());

        for _ in 0..10 {
            for i in 0..50 {
                assert!(set.insert(i));
            }
            assert_eq!(set.len(), 50);

            for i in 0..50 {
                assert!(set.remove(&i));
            }
            assert!(set.is_empty());
        }
        set.table.check_invariants();
    }

    #[test]
    fn test_numeric_types() {
        let mut u8_set = UnifiedSet::with_hasher(SipHashBuilder::default());
        let mut u64_set = UnifiedSet::with_hasher(SipHashBuilder::default());
        let mut i32_set = UnifiedSet::with_hasher(SipHashBuilder::default());

        for i in 0u8..=255u8 {
            u8_set.insert(i);
        }
        assert_eq!(u8_set.len(), 256);

        for i in 0u64..100u64 {
            u64_set.insert(i * 1_000_000_000);
        }
        assert_eq!(u64_set.len(), 100);

        for i in -50i32..50i32 {
            i32_set.insert(i);
        }
        assert_eq!(i32_set.len(), 100);
    }

    #[test]
    fn test_clone_and_equality() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.add_all(["x".to_string(), "y".to_string()]);

        let mut b = a.clone();
        assert_eq!(a, b);

        b.insert("z".to_string());
        assert_ne!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_is_disjoint() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);
        a.insert(3);

        let mut b = UnifiedSet::with_hasher(a.hasher().clone());
        b.insert(4);
        b.insert(5);
        b.insert(6);

        assert!(a.is_disjoint(&b));
        assert!(b.is_disjoint(&a));

        b.insert(2);
        assert!(!a.is_disjoint(&b));
        assert!(!b.is_disjoint(&a));
    }

    #[test]
    fn test_is_subset_and_superset() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);

        let mut b = UnifiedSet::with_hasher(a.hasher().clone());
        b.insert(1);
        b.insert(2);
        b.insert(3);

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(a.is_subset(&a));

        assert!(b.is_superset(&a));
        assert!(!a.is_superset(&b));
    }

    #[test]
    fn test_union() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);
        a.insert(3);

        let mut b = UnifiedSet::with_hasher(a.hasher().clone());
        b.insert(3);
        b.insert(4);
        b.insert(5);

        let mut union: Vec<_> = a.union(&b).copied().collect();
        union.sort_unstable();
        assert_eq!(union, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_intersection() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);
        a.insert(3);

        let mut b = UnifiedSet::with_hasher(a.hasher().clone());
        b.insert(2);
        b.insert(3);
        b.insert(4);

        let intersection: Vec<_> = a.intersection(&b).copied().collect();
        assert_eq!(intersection.len(), 2);
        assert!(intersection.contains(&2));
        assert!(intersection.contains(&3));
    }

    #[test]
    fn test_difference() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);
        a.insert(3);

        let mut b = UnifiedSet::with_hasher(a.hasher().clone());
        b.insert(2);
        b.insert(3);
        b.insert(4);

        let difference: Vec<_> = a.difference(&b).copied().collect();
        assert_eq!(difference, vec![1]);
    }

    #[test]
    fn test_symmetric_difference() {
        let mut a = UnifiedSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);
        a.insert(3);

        let mut b = UnifiedSet::with_hasher(a.hasher().clone());
        b.insert(2);
        b.insert(3);
        b.insert(4);

        let sym_diff: Vec<_> = a.symmetric_difference(&b).copied().collect();
        assert_eq!(sym_diff.len(), 2);
        assert!(sym_diff.contains(&1));
        assert!(sym_diff.contains(&4));
    }

    #[test]
    fn test_from_iterator_and_extend() {
        let mut set: UnifiedSet<String, SipHashBuilder> =
            ["a", "b", "a"].into_iter().map(String::from).collect();
        assert_eq!(set.len(), 2);

        set.extend(vec!["c".to_string(), "b".to_string()]);
        assert_eq!(set.len(), 3);
    }

    #[cfg(any(feature = "std", feature = "foldhash"))]
    #[test]
    fn test_macro() {
        let set = crate::unified_set![3, 1, 3, 2];
        assert_eq!(set.len(), 3);
        assert!(set.contains(&1));

        let empty: UnifiedSet<u8> = crate::unified_set![];
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 16);
    }
}
