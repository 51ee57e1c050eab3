use core::fmt::Debug;
use core::mem;

use crate::error::Result;
use crate::hash_table::Cursor;
use crate::hash_table::Drain;
use crate::hash_table::Entry;
use crate::hash_table::ExtractIf;
use crate::hash_table::HashTable;
use crate::hash_table::IntoIter;
use crate::hash_table::Iter;
use crate::strategy::HashingStrategy;

/// A hash set whose hashing and equality come from a [`HashingStrategy`]
/// instead of the element's own `Hash` and `Eq`.
///
/// Elements live in a [`HashTable`]: a power-of-two slot array where
/// colliding elements share a packed collision chain. The table doubles when
/// an insertion would take it past `capacity × load_factor`.
///
/// [`UnifiedSet`](crate::UnifiedSet) is this type with the [`Native`]
/// strategy.
///
/// [`Native`]: crate::strategy::Native
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use unified_set::StrategySet;
/// use unified_set::strategy::CaseInsensitive;
///
/// let mut names = StrategySet::with_strategy(<CaseInsensitive>::default());
/// assert!(names.insert("Ab"));
/// assert!(!names.insert("aB"));
/// assert_eq!(names.len(), 1);
/// assert_eq!(names.get(&"AB"), Some(&"Ab"));
/// # }
/// ```
#[derive(Clone)]
pub struct StrategySet<T, H> {
    pub(crate) table: HashTable<T>,
    pub(crate) strategy: H,
}

impl<T, H> PartialEq for StrategySet<T, H>
where
    H: HashingStrategy<T>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, H> Eq for StrategySet<T, H> where H: HashingStrategy<T> {}

impl<T, H> Debug for StrategySet<T, H>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, H> StrategySet<T, H> {
    /// Creates an empty set with the default capacity and load factor.
    pub fn with_strategy(strategy: H) -> Self {
        Self::from_parts(HashTable::new(), strategy)
    }

    /// Creates a set that holds `capacity` elements without growing.
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: H) -> Self {
        Self::from_parts(HashTable::with_capacity(capacity), strategy)
    }

    /// Creates a set that holds `capacity` elements at `load_factor` without
    /// growing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLoadFactor`](crate::Error::InvalidLoadFactor) unless
    /// `load_factor` is in `(0, 1]`.
    pub fn with_capacity_load_factor_and_strategy(
        capacity: usize,
        load_factor: f32,
        strategy: H,
    ) -> Result<Self> {
        Ok(Self::from_parts(
            HashTable::with_capacity_and_load_factor(capacity, load_factor)?,
            strategy,
        ))
    }

    pub(crate) fn from_parts(table: HashTable<T>, strategy: H) -> Self {
        Self { table, strategy }
    }

    /// The strategy deciding hashing and equality.
    pub fn strategy(&self) -> &H {
        &self.strategy
    }

    /// The table backing the set, for inspection.
    pub fn table(&self) -> &HashTable<T> {
        &self.table
    }

    /// Number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of slots in the underlying table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// The configured load factor.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Removes every element, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the table when it is more than twice as large as the elements
    /// need. Returns `true` if it was rebuilt.
    pub fn trim_to_size(&mut self) -> bool {
        self.table.trim_to_size()
    }

    /// Iterates in slot order, chained elements in chain order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.table.iter()
    }

    /// Removes and yields every element, keeping the capacity.
    pub fn drain(&mut self) -> Drain<'_, T> {
        self.table.drain()
    }

    /// A cursor that can remove the element it last returned.
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        self.table.cursor()
    }

    /// Keeps only the elements for which `f` returns `true`.
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Removes and yields the elements for which `f` returns `true`.
    pub fn extract_if<F>(&mut self, f: F) -> ExtractIf<'_, T, F>
    where
        F: FnMut(&T) -> bool,
    {
        self.table.extract_if(f)
    }

    /// The first element in iteration order.
    pub fn first(&self) -> Option<&T> {
        self.table.first()
    }

    /// The last element in iteration order.
    pub fn last(&self) -> Option<&T> {
        self.table.last()
    }

    /// Calls `f` with every element and its position in iteration order.
    pub fn for_each_with_index(&self, mut f: impl FnMut(&T, usize)) {
        for (index, value) in self.iter().enumerate() {
            f(value, index);
        }
    }

    /// Visits the elements in one of `section_count` equal slot ranges.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSection`](crate::Error::InvalidSection) when
    /// `section_index >= section_count`.
    pub fn batch_for_each(
        &self,
        section_index: usize,
        section_count: usize,
        f: impl FnMut(&T),
    ) -> Result<()> {
        self.table.batch_for_each(section_index, section_count, f)
    }
}

impl<T, H> StrategySet<T, H>
where
    H: HashingStrategy<T>,
{
    /// Adds `value`. Returns `false`, leaving the set unchanged, if an equal
    /// element is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let strategy = &self.strategy;
        match self.table.entry(
            strategy.hash(&value),
            |v| strategy.equals(v, &value),
            |v| strategy.hash(v),
        ) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Returns the stored element equal to `value`, inserting `value` first if
    /// there is none.
    ///
    /// Useful for interning: every caller gets the same canonical element.
    pub fn put(&mut self, value: T) -> &T {
        let strategy = &self.strategy;
        match self.table.entry(
            strategy.hash(&value),
            |v| strategy.equals(v, &value),
            |v| strategy.hash(v),
        ) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(value),
        }
    }

    /// Adds `value`, replacing and returning an equal element if present.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let strategy = &self.strategy;
        match self.table.entry(
            strategy.hash(&value),
            |v| strategy.equals(v, &value),
            |v| strategy.hash(v),
        ) {
            Entry::Occupied(mut entry) => Some(mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Returns `true` if an element equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// The stored element equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.table.find(self.strategy.hash(value), |v| {
            self.strategy.equals(v, value)
        })
    }

    /// Removes the element equal to `value`. Returns whether one was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the element equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let strategy = &self.strategy;
        self.table
            .remove(strategy.hash(value), |v| strategy.equals(v, value))
    }

    /// Makes room for `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new slot count overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(error) = self.try_reserve(additional) {
            panic!("{error}");
        }
    }

    /// Makes room for `additional` more elements, reporting overflow instead
    /// of panicking.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let strategy = &self.strategy;
        self.table.reserve(additional, |v| strategy.hash(v))
    }

    fn push_unique(&mut self, value: T) {
        let strategy = &self.strategy;
        self.table
            .insert_unique(strategy.hash(&value), value, |v| strategy.hash(v));
    }

    /// Adds every value, growing once up front for the iterator's lower size
    /// bound. Returns `true` if the set changed.
    pub fn add_all<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter();
        self.reserve(values.size_hint().0);

        let before = self.len();
        for value in values {
            self.insert(value);
        }
        self.len() != before
    }

    /// Adds clones of the elements of `other` that are not yet present.
    /// Returns `true` if the set changed.
    pub fn add_all_set(&mut self, other: &Self) -> bool
    where
        T: Clone,
    {
        self.reserve(other.len());

        let strategy = &self.strategy;
        let mut changed = false;
        for value in other.iter() {
            if let Entry::Vacant(entry) = self.table.entry(
                strategy.hash(value),
                |v| strategy.equals(v, value),
                |v| strategy.hash(v),
            ) {
                entry.insert(value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Removes every element equal to one of `values`. Returns `true` if the
    /// set changed.
    pub fn remove_all<'a, I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let before = self.len();
        for value in values {
            self.remove(value);
        }
        self.len() != before
    }

    /// Keeps only the elements equal to one of `values`. Returns `true` if the
    /// set changed.
    pub fn retain_all<'a, I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let values = values.into_iter();
        let strategy = &self.strategy;

        let mut wanted: HashTable<&T> = HashTable::with_capacity(values.size_hint().0);
        for value in values {
            if let Entry::Vacant(entry) = wanted.entry(
                strategy.hash(value),
                |&v| strategy.equals(v, value),
                |&v| strategy.hash(v),
            ) {
                entry.insert(value);
            }
        }

        let before = self.table.len();
        self.table.retain(|value| {
            wanted
                .find(strategy.hash(value), |&v| strategy.equals(v, value))
                .is_some()
        });
        self.table.len() != before
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Builder-style [`remove`](Self::remove).
    pub fn without(mut self, value: &T) -> Self {
        self.remove(value);
        self
    }

    fn empty_like(&self) -> Self
    where
        H: Clone,
    {
        Self::from_parts(self.table.empty_like(), self.strategy.clone())
    }

    /// A new set, with this set's strategy and load factor, of the elements
    /// matching `predicate`.
    pub fn select(&self, mut predicate: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
        H: Clone,
    {
        let mut selected = self.empty_like();
        for value in self.iter().filter(|v| predicate(v)) {
            selected.push_unique(value.clone());
        }
        selected
    }

    /// A new set of the elements not matching `predicate`.
    pub fn reject(&self, mut predicate: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
        H: Clone,
    {
        self.select(|v| !predicate(v))
    }

    /// Splits clones of the elements into those matching `predicate` and the
    /// rest.
    pub fn partition(&self, mut predicate: impl FnMut(&T) -> bool) -> (Self, Self)
    where
        T: Clone,
        H: Clone,
    {
        let mut selected = self.empty_like();
        let mut rejected = self.empty_like();
        for value in self.iter() {
            if predicate(value) {
                selected.push_unique(value.clone());
            } else {
                rejected.push_unique(value.clone());
            }
        }
        (selected, rejected)
    }
}

impl<T, H> Default for StrategySet<T, H>
where
    H: Default,
{
    fn default() -> Self {
        Self::with_strategy(H::default())
    }
}

impl<T, H> FromIterator<T> for StrategySet<T, H>
where
    H: HashingStrategy<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.add_all(iter);
        set
    }
}

impl<T, H> Extend<T> for StrategySet<T, H>
where
    H: HashingStrategy<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<'a, T, H> Extend<&'a T> for StrategySet<T, H>
where
    T: Copy + 'a,
    H: HashingStrategy<T>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.add_all(iter.into_iter().copied());
    }
}

impl<T, H> IntoIterator for StrategySet<T, H> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, T, H> IntoIterator for &'a StrategySet<T, H> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
