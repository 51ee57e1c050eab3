use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;
use core::slice;

use crate::error::Error;
use crate::error::Result;

mod chain;

use chain::ChainIter;
use chain::ChainNode;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Element capacity of a default-constructed table. The default table
/// allocates twice this many slots.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// Mixes the higher bits of `hash` into the low bits used for slot selection.
#[inline(always)]
fn spread(hash: u64) -> u64 {
    let h = hash ^ (hash >> 20) ^ (hash >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}

#[cold]
#[inline(never)]
fn corrupted() -> ! {
    panic!("possible corruption through unsynchronized concurrent modification")
}

/// Fraction of the slots that may be occupied before the table grows.
///
/// Always in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LoadFactor(f32);

impl LoadFactor {
    /// Validates `value`, rejecting NaN, non-positive values and values above
    /// one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::Error;
    /// # use unified_set::LoadFactor;
    /// #
    /// assert_eq!(LoadFactor::new(0.5).map(LoadFactor::get), Ok(0.5));
    /// assert_eq!(LoadFactor::new(0.0), Err(Error::InvalidLoadFactor(0.0)));
    /// assert!(LoadFactor::new(f32::NAN).is_err());
    /// ```
    pub fn new(value: f32) -> Result<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidLoadFactor(value))
        }
    }

    /// Returns the load factor as a plain `f32`.
    pub fn get(self) -> f32 {
        self.0
    }

    fn max_size(self, slots: usize) -> usize {
        (slots as f64 * f64::from(self.0)) as usize
    }

    fn slots_for(self, elements: usize) -> f64 {
        elements as f64 / f64::from(self.0)
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self(DEFAULT_LOAD_FACTOR)
    }
}

impl TryFrom<f32> for LoadFactor {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Capacity {
    slots: usize,
}

impl Capacity {
    /// Smallest slot count whose maximum size reaches `elements`.
    fn for_elements(elements: usize, load_factor: LoadFactor) -> Result<Self> {
        Self::from_wanted(load_factor.slots_for(elements).ceil(), elements)
    }

    /// Sizing used when a known number of elements is about to be added on
    /// top of an existing table or stream.
    fn for_growth(elements: usize, load_factor: LoadFactor) -> Result<Self> {
        Self::from_wanted(load_factor.slots_for(elements).floor() + 1.0, elements)
    }

    fn from_wanted(wanted: f64, elements: usize) -> Result<Self> {
        if wanted >= (isize::MAX as usize >> 1) as f64 {
            return Err(Error::CapacityOverflow(elements));
        }
        let slots = (wanted as usize)
            .max(1)
            .checked_next_power_of_two()
            .ok_or(Error::CapacityOverflow(elements))?;
        Ok(Self { slots })
    }

    fn doubled(self) -> Self {
        let slots = self
            .slots
            .checked_mul(2)
            .unwrap_or_else(|| panic!("{}", Error::CapacityOverflow(self.slots)));
        Self { slots }
    }

    #[inline(always)]
    fn mask(self) -> usize {
        self.slots - 1
    }
}

/// Where a stored element lives: its slot and, for chained slots, the
/// position inside the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Location {
    index: usize,
    chain: Option<usize>,
}

impl Location {
    fn single(index: usize) -> Self {
        Self { index, chain: None }
    }

    fn chained(index: usize, position: usize) -> Self {
        Self {
            index,
            chain: Some(position),
        }
    }
}

enum Slot<V> {
    Empty,
    Single(V),
    Chain(Box<ChainNode<V>>),
}

impl<V> Slot<V> {
    fn len(&self) -> usize {
        match self {
            Slot::Empty => 0,
            Slot::Single(_) => 1,
            Slot::Chain(node) => node.len(),
        }
    }

    /// Moves every element out of the slot, in chain order.
    fn drain_into(self, mut f: impl FnMut(V)) {
        match self {
            Slot::Empty => {}
            Slot::Single(value) => f(value),
            Slot::Chain(node) => node.into_values(f),
        }
    }
}

fn empty_slots<V>(capacity: Capacity) -> Result<Vec<Slot<V>>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity.slots)
        .map_err(|_| Error::CapacityOverflow(capacity.slots))?;
    slots.resize_with(capacity.slots, || Slot::Empty);
    Ok(slots)
}

/// Inspection data for a [`HashTable`].
///
/// Only compiled with `cfg(test)` or the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of elements allowed before the table grows
    pub max_size: usize,
    /// Total number of slots allocated
    pub total_slots: usize,
    /// Slots holding exactly one element inline
    pub single_slots: usize,
    /// Slots holding a collision chain
    pub chained_slots: usize,
    /// Chain nodes allocated across all chains
    pub chain_nodes: usize,
    /// Number of elements in the longest chain
    pub longest_chain: usize,
    /// Configured load factor
    pub load_factor: f32,
    /// Slot utilization ((single_slots + chained_slots) / total_slots)
    pub slot_utilization: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Unified Set Debug Statistics ===");
        println!(
            "Population: {}/{} (load factor {:.2})",
            self.populated, self.max_size, self.load_factor
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization)",
            self.single_slots + self.chained_slots,
            self.total_slots,
            self.slot_utilization * 100.0
        );
        println!(
            "Chains: {} slots, {} nodes, longest {} elements",
            self.chained_slots, self.chain_nodes, self.longest_chain
        );
    }
}

/// A hash table of power-of-two slots where each slot is empty, holds one
/// element inline, or owns a collision chain.
///
/// `HashTable<V>` does not know how to hash or compare its values. Every
/// lookup takes the value's hash and an equality predicate, and operations
/// that may rehash take a `hasher` closure that recomputes the hash of a
/// stored value.
///
/// ## Layout
///
/// The slot for a hash is `spread(hash) & (capacity - 1)`. Colliding elements
/// are kept in a chain of nodes with four inline positions each; the chain is
/// always densely packed, so removal moves the chain's last element into the
/// hole.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use unified_set::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_capacity(100);
/// let hasher = |p: &Person| hash_id(p.id);
///
/// match table.entry(hash_id(123), |p: &Person| p.id == 123, hasher) {
///     unified_set::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     unified_set::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.len(), 1);
/// ```
pub struct HashTable<V> {
    slots: Vec<Slot<V>>,
    occupied: usize,
    max_size: usize,
    load_factor: LoadFactor,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let layout: Vec<alloc::string::String> = self
            .slots
            .chunks(16)
            .map(|row| {
                row.iter()
                    .map(|slot| match slot {
                        Slot::Empty => alloc::string::String::from(".."),
                        other => alloc::format!("{:02}", other.len()),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        f.debug_struct("HashTable")
            .field("occupied", &self.occupied)
            .field("max_size", &self.max_size)
            .field("capacity", &self.slots.len())
            .field("load_factor", &self.load_factor.get())
            .field("slots", &layout)
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Empty => Slot::Empty,
                Slot::Single(value) => Slot::Single(value.clone()),
                Slot::Chain(node) => Slot::Chain(node.copy()),
            })
            .collect();

        Self {
            slots,
            occupied: self.occupied,
            max_size: self.max_size,
            load_factor: self.load_factor,
        }
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Slot::Chain(node) = slot {
                node.unlink();
            }
        }
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with room for [`DEFAULT_INITIAL_CAPACITY`]
    /// elements at the default load factor (16 slots).
    pub fn new() -> Self {
        let capacity = Capacity {
            slots: DEFAULT_INITIAL_CAPACITY << 1,
        };
        Self::from_capacity(capacity, LoadFactor::default())
            .unwrap_or_else(|error| panic!("{error}"))
    }

    /// Creates a table that can hold `capacity` elements at the default load
    /// factor without growing.
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.max_size() >= 100);
    /// assert!(table.capacity().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    /// Creates a table that can hold `capacity` elements at `load_factor`
    /// without growing. The slot count is the next power of two of
    /// `ceil(capacity / load_factor)`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLoadFactor`] unless `load_factor` is in `(0, 1]`, and
    /// [`Error::CapacityOverflow`] if the slot count cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::with_capacity_and_load_factor(3, 0.75).unwrap();
    /// assert_eq!(table.capacity(), 4);
    /// assert_eq!(table.max_size(), 3);
    ///
    /// assert!(HashTable::<u32>::with_capacity_and_load_factor(3, 1.5).is_err());
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        let load_factor = LoadFactor::new(load_factor)?;
        Self::from_capacity(Capacity::for_elements(capacity, load_factor)?, load_factor)
    }

    /// Table sized for reading `elements` values from a stream: room for
    /// `floor(elements / load_factor) + 1` slots, never fewer than
    /// [`DEFAULT_INITIAL_CAPACITY`].
    pub(crate) fn presized(elements: usize, load_factor: LoadFactor) -> Result<Self> {
        let capacity = Capacity::for_growth(elements, load_factor)?;
        let capacity = Capacity {
            slots: capacity.slots.max(DEFAULT_INITIAL_CAPACITY),
        };
        Self::from_capacity(capacity, load_factor)
    }

    /// An empty table of the default 16 slots with this table's load factor.
    pub(crate) fn empty_like(&self) -> Self {
        let capacity = Capacity {
            slots: DEFAULT_INITIAL_CAPACITY << 1,
        };
        Self::from_capacity(capacity, self.load_factor)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    fn from_capacity(capacity: Capacity, load_factor: LoadFactor) -> Result<Self> {
        Ok(Self {
            slots: empty_slots(capacity)?,
            occupied: 0,
            max_size: load_factor.max_size(capacity.slots),
            load_factor,
        })
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of elements the table holds before it grows:
    /// `floor(capacity × load_factor)`.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the configured load factor.
    pub fn load_factor(&self) -> f32 {
        self.load_factor.get()
    }

    #[inline(always)]
    fn index(&self, hash: u64) -> usize {
        spread(hash) as usize & (self.slots.len() - 1)
    }

    fn locate(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<Location> {
        if self.occupied == 0 {
            return None;
        }

        let index = self.index(hash);
        match &self.slots[index] {
            Slot::Empty => None,
            Slot::Single(value) => eq(value).then_some(Location::single(index)),
            Slot::Chain(node) => node
                .position(eq)
                .map(|position| Location::chained(index, position)),
        }
    }

    fn value_at(&self, location: Location) -> &V {
        match (&self.slots[location.index], location.chain) {
            (Slot::Single(value), None) => value,
            (Slot::Chain(node), Some(position)) => {
                node.get(position).unwrap_or_else(|| corrupted())
            }
            _ => corrupted(),
        }
    }

    fn value_at_mut(&mut self, location: Location) -> &mut V {
        match (&mut self.slots[location.index], location.chain) {
            (Slot::Single(value), None) => value,
            (Slot::Chain(node), Some(position)) => {
                node.get_mut(position).unwrap_or_else(|| corrupted())
            }
            _ => corrupted(),
        }
    }

    /// Appends `value` to slot `index` without comparing it to what is already
    /// there. Does not touch `occupied`.
    fn place(&mut self, index: usize, value: V) -> Location {
        let slot = &mut self.slots[index];
        let (filled, location) = match mem::replace(slot, Slot::Empty) {
            Slot::Empty => (Slot::Single(value), Location::single(index)),
            Slot::Single(existing) => (
                Slot::Chain(Box::new(ChainNode::pair(existing, value))),
                Location::chained(index, 1),
            ),
            Slot::Chain(mut node) => {
                let position = node.push(value);
                (Slot::Chain(node), Location::chained(index, position))
            }
        };
        *slot = filled;
        location
    }

    /// Removes the element at `location`, pulling the chain's last element
    /// into its place.
    fn take_at(&mut self, location: Location) -> V {
        let slot = &mut self.slots[location.index];
        let (value, rest) = match (mem::replace(slot, Slot::Empty), location.chain) {
            (Slot::Single(value), None) => (value, Slot::Empty),
            (Slot::Chain(node), Some(position)) => {
                let (value, rest) = node.remove(position);
                (value, rest.map_or(Slot::Empty, Slot::Chain))
            }
            _ => corrupted(),
        };
        *slot = rest;
        self.occupied -= 1;
        value
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use unified_set::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table
    ///     .entry(hash_u64(42), |&n: &u64| n == 42, |&n| hash_u64(n))
    ///     .or_insert(42);
    ///
    /// assert_eq!(table.find(hash_u64(42), |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(hash_u64(99), |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.locate(hash, eq).map(|location| self.value_at(location))
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// Changing the value in a way that changes its hash or equality leaves it
    /// unreachable until the next rehash.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let location = self.locate(hash, eq)?;
        Some(self.value_at_mut(location))
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// `hasher` recomputes the hash of a stored value and is only called if
    /// inserting into a vacant entry makes the table grow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use unified_set::hash_table::Entry;
    /// # use unified_set::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// let hasher = |s: &String| hash_str(s);
    ///
    /// match table.entry(hash_str("hello"), |s: &String| s == "hello", hasher) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// let existing = table
    ///     .entry(hash_str("hello"), |s: &String| s == "hello", hasher)
    ///     .or_insert("other".to_string());
    /// assert_eq!(existing, "hello");
    /// ```
    pub fn entry<H>(&mut self, hash: u64, eq: impl Fn(&V) -> bool, hasher: H) -> Entry<'_, V, H>
    where
        H: Fn(&V) -> u64,
    {
        match self.locate(hash, eq) {
            Some(location) => Entry::Occupied(OccupiedEntry {
                table: self,
                location,
            }),
            None => Entry::Vacant(VacantEntry {
                table: self,
                hash,
                hasher,
            }),
        }
    }

    /// Inserts `value` without checking whether an equal value is present.
    ///
    /// Only use this when the caller knows the value is absent, e.g. when
    /// copying from another table with the same equality.
    pub fn insert_unique(&mut self, hash: u64, value: V, hasher: impl Fn(&V) -> u64) -> &mut V {
        if self.occupied >= self.max_size {
            self.grow(hasher);
        }
        let location = self.place(self.index(hash), value);
        self.occupied += 1;
        self.value_at_mut(location)
    }

    /// Removes and returns the value matching `hash` and `eq`.
    ///
    /// A chained value is replaced by the last value of its chain, so the
    /// chain stays packed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::hash_table::HashTable;
    /// #
    /// // Every value lands in the same slot.
    /// let mut table = HashTable::with_capacity(10);
    /// for n in 0..6u64 {
    ///     table.insert_unique(7, n, |_| 7);
    /// }
    ///
    /// assert_eq!(table.remove(7, |&n| n == 2), Some(2));
    /// assert_eq!(table.remove(7, |&n| n == 2), None);
    /// assert_eq!(table.len(), 5);
    /// table.check_invariants();
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let location = self.locate(hash, eq)?;
        Some(self.take_at(location))
    }

    /// Removes all values, keeping the capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if let Slot::Chain(node) = slot {
                node.unlink();
            }
            *slot = Slot::Empty;
        }
        self.occupied = 0;
    }

    fn grow(&mut self, hasher: impl Fn(&V) -> u64) {
        let required = self.occupied + 1;
        let mut capacity = Capacity {
            slots: self.slots.len(),
        }
        .doubled();
        while self.load_factor.max_size(capacity.slots) < required {
            capacity = capacity.doubled();
        }
        if let Err(error) = self.rehash(capacity, hasher) {
            panic!("{error}");
        }
    }

    /// Moves every value into a fresh slot array, re-indexing each from its
    /// recomputed hash. Values are appended without equality checks.
    fn rehash(&mut self, capacity: Capacity, hasher: impl Fn(&V) -> u64) -> Result<()> {
        let old = mem::replace(&mut self.slots, empty_slots(capacity)?);
        self.max_size = self.load_factor.max_size(capacity.slots);

        let mask = capacity.mask();
        for slot in old {
            slot.drain_into(|value| {
                let index = spread(hasher(&value)) as usize & mask;
                self.place(index, value);
            });
        }
        Ok(())
    }

    /// Makes room for `additional` more values without growing again.
    ///
    /// When `len() + additional` exceeds [`max_size`](Self::max_size), the
    /// table is rebuilt once at the next power of two of
    /// `floor((len() + additional) / load_factor) + 1` slots.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityOverflow`] if that slot count cannot be allocated. The
    /// table is unchanged in that case.
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&V) -> u64) -> Result<()> {
        let required = self
            .occupied
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow(additional))?;
        if required <= self.max_size {
            return Ok(());
        }

        let mut capacity = Capacity::for_growth(required, self.load_factor)?;
        while self.load_factor.max_size(capacity.slots) < required {
            capacity = capacity.doubled();
        }
        self.rehash(capacity, hasher)
    }

    /// Shrinks the slot array when it is more than twice as large as needed.
    ///
    /// The new capacity divides the old one, so every value moves to
    /// `old_index & (new_capacity - 1)` and no hashing is needed. Returns
    /// `true` if the table was rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1000);
    /// for n in 0..10u64 {
    ///     table.insert_unique(n, n, |&n| n);
    /// }
    ///
    /// assert!(table.trim_to_size());
    /// assert_eq!(table.capacity(), 16);
    /// assert!(!table.trim_to_size());
    /// assert_eq!(table.find(3, |&n| n == 3), Some(&3));
    /// ```
    pub fn trim_to_size(&mut self) -> bool {
        let needed = self.load_factor.slots_for(self.occupied).ceil() as usize;
        if self.slots.len() <= needed.saturating_mul(2) {
            return false;
        }

        let capacity = Capacity {
            slots: needed.max(1).next_power_of_two(),
        };
        let Ok(fresh) = empty_slots(capacity) else {
            return false;
        };
        debug_assert_eq!(self.slots.len() % capacity.slots, 0);

        let old = mem::replace(&mut self.slots, fresh);
        self.max_size = self.load_factor.max_size(capacity.slots);

        let mask = capacity.mask();
        for (old_index, slot) in old.into_iter().enumerate() {
            slot.drain_into(|value| {
                self.place(old_index & mask, value);
            });
        }
        true
    }

    /// Returns an iterator over all values in slot order; values sharing a
    /// slot are yielded in chain order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            values: self.values_in(0..self.slots.len()),
            remaining: self.occupied,
        }
    }

    /// Values stored in the slots of `range`, in slot-then-chain order.
    pub(crate) fn values_in(&self, range: core::ops::Range<usize>) -> Values<'_, V> {
        Values {
            slots: self.slots[range].iter(),
            chain: None,
        }
    }

    /// Returns an iterator that removes and yields every value. The capacity
    /// is kept.
    ///
    /// Values not consumed by the iterator are dropped when it is dropped.
    pub fn drain(&mut self) -> Drain<'_, V> {
        let remaining = mem::take(&mut self.occupied);
        Drain {
            slots: self.slots.iter_mut(),
            pending: Vec::new(),
            remaining,
        }
    }

    /// Returns a cursor that walks the table in iteration order and can remove
    /// the value it last returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use unified_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// for n in 0..8u64 {
    ///     table.insert_unique(n % 2, n, |&n| n % 2);
    /// }
    ///
    /// let mut cursor = table.cursor();
    /// while cursor.has_next() {
    ///     if cursor.next().unwrap() % 4 == 0 {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    /// assert_eq!(table.len(), 6);
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, V> {
        Cursor {
            table: self,
            count: 0,
            position: 0,
            chain_position: 0,
            last_returned: false,
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        self.extract_if(|value| !f(value)).for_each(drop);
    }

    /// Returns an iterator that removes and yields the values for which
    /// `predicate` returns `true`.
    ///
    /// Values the iterator does not reach stay in the table.
    pub fn extract_if<F>(&mut self, predicate: F) -> ExtractIf<'_, V, F>
    where
        F: FnMut(&V) -> bool,
    {
        ExtractIf {
            cursor: self.cursor(),
            predicate,
        }
    }

    /// The first value in iteration order.
    pub fn first(&self) -> Option<&V> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Empty => None,
            Slot::Single(value) => Some(value),
            Slot::Chain(node) => Some(node.first()),
        })
    }

    /// The last value in iteration order.
    pub fn last(&self) -> Option<&V> {
        self.slots.iter().rev().find_map(|slot| match slot {
            Slot::Empty => None,
            Slot::Single(value) => Some(value),
            Slot::Chain(node) => Some(node.last()),
        })
    }

    /// Visits the values of one of `section_count` equal slot ranges. The last
    /// section also covers the remainder.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSection`] when `section_count` is zero or
    /// `section_index` is not below it.
    pub fn batch_for_each(
        &self,
        section_index: usize,
        section_count: usize,
        f: impl FnMut(&V),
    ) -> Result<()> {
        if section_index >= section_count {
            return Err(Error::InvalidSection {
                index: section_index,
                count: section_count,
            });
        }

        let section_size = self.slots.len() / section_count;
        let start = section_index * section_size;
        let end = if section_index == section_count - 1 {
            self.slots.len()
        } else {
            start + section_size
        };
        self.values_in(start..end).for_each(f);
        Ok(())
    }

    /// Asserts the table's structural invariants.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is not a power of two, if the element count
    /// disagrees with the stored values, if the table is over its maximum
    /// size, or if any chain has a hole.
    pub fn check_invariants(&self) {
        assert!(self.slots.len().is_power_of_two());
        assert!(self.occupied <= self.max_size);
        assert_eq!(
            self.max_size,
            self.load_factor.max_size(self.slots.len()),
            "max_size out of sync with capacity"
        );

        let mut counted = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Chain(node) = slot {
                assert!(node.is_packed(), "chain at slot {index} has a hole");
            }
            counted += slot.len();
        }
        assert_eq!(counted, self.occupied, "element count mismatch");
    }

    /// Histogram of slot sizes: entry `k` is the number of slots holding
    /// exactly `k` values.
    ///
    /// Only compiled with `cfg(test)` or the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 2];
        for slot in &self.slots {
            let len = slot.len();
            if hist.len() <= len {
                hist.resize(len + 1, 0);
            }
            hist[len] += 1;
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Only compiled with `cfg(test)` or the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let mut single_slots = 0;
        let mut chained_slots = 0;
        let mut chain_nodes = 0;
        let mut longest_chain = 0;
        for slot in &self.slots {
            match slot {
                Slot::Empty => {}
                Slot::Single(_) => single_slots += 1,
                Slot::Chain(node) => {
                    chained_slots += 1;
                    chain_nodes += node.nodes();
                    longest_chain = longest_chain.max(node.len());
                }
            }
        }

        DebugStats {
            populated: self.occupied,
            max_size: self.max_size,
            total_slots: self.slots.len(),
            single_slots,
            chained_slots,
            chain_nodes,
            longest_chain,
            load_factor: self.load_factor.get(),
            slot_utilization: (single_slots + chained_slots) as f64 / self.slots.len() as f64,
        }
    }

    /// Pretty-prints the slot-size histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("chain histogram ({} entries):", self.occupied);
        for (len, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", len, "█".repeat(width), count);
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V, H> {
    /// The value is not present in the table
    Vacant(VacantEntry<'a, V, H>),
    /// An equal value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V, H> Entry<'a, V, H>
where
    H: Fn(&V) -> u64,
{
    /// Inserts `default` if the entry is vacant and returns a mutable reference
    /// to the stored value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Like [`or_insert`](Self::or_insert), computing the value only when the
    /// entry is vacant.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to an occupied entry's value. Vacant entries are left
    /// alone and yield `None`.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }
}

/// A view into a vacant entry in the hash table.
///
/// Created by [`HashTable::entry`] when no stored value matched.
pub struct VacantEntry<'a, V, H> {
    table: &'a mut HashTable<V>,
    hash: u64,
    hasher: H,
}

impl<'a, V, H> VacantEntry<'a, V, H>
where
    H: Fn(&V) -> u64,
{
    /// Inserts a value and returns a mutable reference to it.
    ///
    /// If the table is at its maximum size it first doubles, rehashing every
    /// stored value with the entry's hasher.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry {
            table,
            hash,
            hasher,
        } = self;
        table.insert_unique(hash, value, hasher)
    }
}

/// A view into an occupied entry in the hash table.
///
/// Created by [`HashTable::entry`] when a stored value matched.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    location: Location,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the stored value.
    pub fn get(&self) -> &V {
        self.table.value_at(self.location)
    }

    /// Gets a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.value_at_mut(self.location)
    }

    /// Converts the entry into a mutable reference with the lifetime of the
    /// table borrow.
    pub fn into_mut(self) -> &'a mut V {
        self.table.value_at_mut(self.location)
    }

    /// Removes the stored value and returns it.
    pub fn remove(self) -> V {
        self.table.take_at(self.location)
    }
}

/// Values of a run of slots, in slot-then-chain order.
pub(crate) struct Values<'a, V> {
    slots: slice::Iter<'a, Slot<V>>,
    chain: Option<ChainIter<'a, V>>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chain) = &mut self.chain {
                if let Some(value) = chain.next() {
                    return Some(value);
                }
                self.chain = None;
            }

            match self.slots.next()? {
                Slot::Empty => {}
                Slot::Single(value) => return Some(value),
                Slot::Chain(node) => self.chain = Some(node.iter()),
            }
        }
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    values: Values<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.values.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    slots: slice::IterMut<'a, Slot<V>>,
    pending: Vec<V>,
    remaining: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.pending.pop() {
                self.remaining -= 1;
                return Some(value);
            }

            let slot = mem::replace(self.slots.next()?, Slot::Empty);
            match slot {
                Slot::Empty => {}
                Slot::Single(value) => {
                    self.remaining -= 1;
                    return Some(value);
                }
                chain => {
                    chain.drain_into(|value| self.pending.push(value));
                    self.pending.reverse();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    pending: Vec<V>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.pending.pop() {
                self.remaining -= 1;
                return Some(value);
            }

            match self.slots.next()? {
                Slot::Empty => {}
                Slot::Single(value) => {
                    self.remaining -= 1;
                    return Some(value);
                }
                chain => {
                    chain.drain_into(|value| self.pending.push(value));
                    self.pending.reverse();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

impl<V> Drop for IntoIter<V> {
    fn drop(&mut self) {
        for slot in self.slots.as_mut_slice() {
            if let Slot::Chain(node) = slot {
                node.unlink();
            }
        }
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(mut self) -> Self::IntoIter {
        let remaining = mem::take(&mut self.occupied);
        IntoIter {
            slots: mem::take(&mut self.slots).into_iter(),
            pending: Vec::new(),
            remaining,
        }
    }
}

/// A positional cursor over a [`HashTable`] that can remove the value it
/// last returned.
///
/// Removing moves the chain's last value into the hole; the cursor rewinds so
/// that value is still visited exactly once.
///
/// This struct is created by the [`cursor`] method on [`HashTable`].
///
/// [`cursor`]: HashTable::cursor
pub struct Cursor<'a, V> {
    table: &'a mut HashTable<V>,
    count: usize,
    position: usize,
    chain_position: usize,
    last_returned: bool,
}

impl<V> Cursor<'_, V> {
    /// Returns `true` while there are values the cursor has not returned.
    pub fn has_next(&self) -> bool {
        self.count < self.table.occupied
    }

    /// Returns the next value.
    ///
    /// # Errors
    ///
    /// [`Error::CursorExhausted`] once every value has been returned.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&V> {
        if !self.has_next() {
            return Err(Error::CursorExhausted);
        }
        self.count += 1;
        self.last_returned = true;

        if self.chain_position == 0 {
            loop {
                match self.table.slots.get(self.position) {
                    Some(Slot::Empty) => self.position += 1,
                    Some(Slot::Single(_)) => {
                        self.position += 1;
                        return Ok(self.table.value_at(Location::single(self.position - 1)));
                    }
                    Some(Slot::Chain(_)) => break,
                    None => corrupted(),
                }
            }
        }

        let location = Location::chained(self.position, self.chain_position);
        let more = match &self.table.slots[self.position] {
            Slot::Chain(node) => node.get(self.chain_position + 1).is_some(),
            _ => corrupted(),
        };
        if more {
            self.chain_position += 1;
        } else {
            self.chain_position = 0;
            self.position += 1;
        }
        Ok(self.table.value_at(location))
    }

    /// Removes and returns the value returned by the last call to
    /// [`next`](Self::next).
    ///
    /// # Errors
    ///
    /// [`Error::NothingToRemove`] if `next` has not been called since the
    /// last removal.
    pub fn remove(&mut self) -> Result<V> {
        if !self.last_returned {
            return Err(Error::NothingToRemove);
        }
        self.last_returned = false;
        self.count -= 1;

        let location = if self.chain_position != 0 {
            self.chain_position -= 1;
            Location::chained(self.position, self.chain_position)
        } else {
            let index = self.position - 1;
            match &self.table.slots[index] {
                Slot::Chain(node) => Location::chained(index, node.len() - 1),
                Slot::Single(_) => {
                    self.position = index;
                    Location::single(index)
                }
                Slot::Empty => corrupted(),
            }
        };
        Ok(self.table.take_at(location))
    }
}

/// An iterator that removes the values matching a predicate.
///
/// This struct is created by the [`extract_if`] method on [`HashTable`].
///
/// [`extract_if`]: HashTable::extract_if
pub struct ExtractIf<'a, V, F> {
    cursor: Cursor<'a, V>,
    predicate: F,
}

impl<V, F> Iterator for ExtractIf<'_, V, F>
where
    F: FnMut(&V) -> bool,
{
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor.has_next() {
            let matched = match self.cursor.next() {
                Ok(value) => (self.predicate)(value),
                Err(_) => return None,
            };
            if matched {
                return self.cursor.remove().ok();
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.table.occupied - self.cursor.count))
    }
}

impl<V, F> FusedIterator for ExtractIf<'_, V, F> where F: FnMut(&V) -> bool {}
