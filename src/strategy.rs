use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;
use core::ops::Deref;

use crate::DefaultHashBuilder;

/// Decides which elements a set considers equal and how they hash.
///
/// Implementations must be consistent: if `equals(a, b)` then
/// `hash(a) == hash(b)`. A set keeps its strategy for its whole lifetime.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use unified_set::HashingStrategy;
/// use unified_set::StrategySet;
///
/// /// Compares points by their distance from the origin.
/// struct Radius;
///
/// impl HashingStrategy<(i32, i32)> for Radius {
///     fn hash(&self, &(x, y): &(i32, i32)) -> u64 {
///         (x * x + y * y) as u64
///     }
///
///     fn equals(&self, a: &(i32, i32), b: &(i32, i32)) -> bool {
///         self.hash(a) == self.hash(b)
///     }
/// }
///
/// let mut set = StrategySet::with_strategy(Radius);
/// assert!(set.insert((3, 4)));
/// assert!(!set.insert((-5, 0)));
/// assert_eq!(set.get(&(0, 5)), Some(&(3, 4)));
/// # }
/// ```
pub trait HashingStrategy<T: ?Sized> {
    /// Hash of `value`; equal values must produce equal hashes.
    fn hash(&self, value: &T) -> u64;

    /// Whether `a` and `b` are the same element.
    fn equals(&self, a: &T, b: &T) -> bool;
}

impl<T, H> HashingStrategy<T> for &H
where
    T: ?Sized,
    H: HashingStrategy<T> + ?Sized,
{
    fn hash(&self, value: &T) -> u64 {
        (**self).hash(value)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (**self).equals(a, b)
    }
}

/// The element's own `Hash` and `Eq`, hashed through a [`BuildHasher`].
///
/// This is the strategy behind [`UnifiedSet`](crate::UnifiedSet).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Native<S = DefaultHashBuilder> {
    #[cfg_attr(feature = "serde", serde(skip))]
    hash_builder: S,
}

impl<S> Native<S> {
    /// Wraps a hasher builder.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// The wrapped hasher builder.
    pub fn hash_builder(&self) -> &S {
        &self.hash_builder
    }
}

impl<T, S> HashingStrategy<T> for Native<S>
where
    T: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, value: &T) -> u64 {
        self.hash_builder.hash_one(value)
    }

    #[inline]
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Treats strings as equal when they match ignoring case.
///
/// Comparison uses full Unicode lowercase mapping, so `"STRASSE"` and
/// `"strasse"` match but `"straße"` does not.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseInsensitive<S = DefaultHashBuilder> {
    #[cfg_attr(feature = "serde", serde(skip))]
    hash_builder: S,
}

impl<S> CaseInsensitive<S> {
    /// Wraps a hasher builder.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }
}

fn lowercase(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

impl<T, S> HashingStrategy<T> for CaseInsensitive<S>
where
    T: AsRef<str> + ?Sized,
    S: BuildHasher,
{
    fn hash(&self, value: &T) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        for c in lowercase(value.as_ref()) {
            hasher.write_u32(c as u32);
        }
        hasher.finish()
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        lowercase(a.as_ref()).eq(lowercase(b.as_ref()))
    }
}

/// Compares elements by a key extracted with a function.
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use unified_set::StrategySet;
/// use unified_set::strategy::ByKey;
///
/// let by_id = ByKey::new(|user: &(u32, &str)| user.0);
/// let mut users = StrategySet::with_strategy(by_id);
/// users.insert((1, "ada"));
/// users.insert((1, "grace"));
/// assert_eq!(users.len(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct ByKey<F, S = DefaultHashBuilder> {
    key: F,
    hash_builder: S,
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<F> ByKey<F> {
    /// Uses `key` with the default hasher builder.
    pub fn new(key: F) -> Self {
        Self::with_hasher(key, DefaultHashBuilder::default())
    }
}

impl<F, S> ByKey<F, S> {
    /// Uses `key` with the given hasher builder.
    pub fn with_hasher(key: F, hash_builder: S) -> Self {
        Self { key, hash_builder }
    }
}

impl<T, K, F, S> HashingStrategy<T> for ByKey<F, S>
where
    T: ?Sized,
    K: Hash + Eq,
    F: Fn(&T) -> K,
    S: BuildHasher,
{
    fn hash(&self, value: &T) -> u64 {
        self.hash_builder.hash_one((self.key)(value))
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (self.key)(a) == (self.key)(b)
    }
}

/// Compares smart pointers and references by the address they point to,
/// ignoring the pointee's own equality.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity<S = DefaultHashBuilder> {
    #[cfg_attr(feature = "serde", serde(skip))]
    hash_builder: S,
}

impl<S> Identity<S> {
    /// Wraps a hasher builder.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }
}

impl<T, S> HashingStrategy<T> for Identity<S>
where
    T: Deref,
    S: BuildHasher,
{
    fn hash(&self, value: &T) -> u64 {
        let address = core::ptr::from_ref(value.deref()).cast::<()>() as usize;
        self.hash_builder.hash_one(address)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        core::ptr::addr_eq(a.deref(), b.deref())
    }
}
