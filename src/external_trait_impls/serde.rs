use core::fmt;
use core::marker::PhantomData;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use serde::de::DeserializeSeed;
use serde::de::SeqAccess;
use serde::de::Unexpected;
use serde::de::Visitor;
use serde::ser;
use serde::ser::SerializeTuple;

use crate::hash_table::HashTable;
use crate::hash_table::LoadFactor;
use crate::strategy::HashingStrategy;
use crate::strategy_set::StrategySet;

/// Upper bound on the elements a stream may ask us to presize for. Larger
/// sets still deserialize; they grow as elements arrive.
const MAX_PRESIZE: usize = 1 << 16;

struct Elements<'a, T>(&'a HashTable<T>);

impl<T> Serialize for Elements<'_, T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

/// Written as the tuple `(count: i32, load_factor: f32, strategy, [elements])`.
impl<T, H> Serialize for StrategySet<T, H>
where
    T: Serialize,
    H: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let count = i32::try_from(self.len()).map_err(|_| {
            ser::Error::custom(format_args!(
                "a set of {} elements does not fit an i32 count",
                self.len()
            ))
        })?;

        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&count)?;
        tuple.serialize_element(&self.load_factor())?;
        tuple.serialize_element(&self.strategy)?;
        tuple.serialize_element(&Elements(&self.table))?;
        tuple.end()
    }
}

impl<'de, T, H> Deserialize<'de> for StrategySet<T, H>
where
    T: Deserialize<'de>,
    H: Deserialize<'de> + HashingStrategy<T>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_tuple(4, SetVisitor(PhantomData))
    }
}

struct SetVisitor<T, H>(PhantomData<fn() -> (T, H)>);

impl<'de, T, H> Visitor<'de> for SetVisitor<T, H>
where
    T: Deserialize<'de>,
    H: Deserialize<'de> + HashingStrategy<T>,
{
    type Value = StrategySet<T, H>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a (count, load factor, strategy, elements) tuple")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let count: i32 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let count = usize::try_from(count).map_err(|_| {
            de::Error::invalid_value(
                Unexpected::Signed(count.into()),
                &"a non-negative element count",
            )
        })?;

        let load_factor: f32 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let load_factor = LoadFactor::new(load_factor).map_err(de::Error::custom)?;

        let strategy: H = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;

        let table =
            HashTable::presized(count.min(MAX_PRESIZE), load_factor).map_err(de::Error::custom)?;
        let seed = ElementsSeed {
            set: StrategySet::from_parts(table, strategy),
            count,
        };
        seq.next_element_seed(seed)?
            .ok_or_else(|| de::Error::invalid_length(3, &self))
    }
}

/// Reads exactly `count` elements into `set` through `insert`.
struct ElementsSeed<T, H> {
    set: StrategySet<T, H>,
    count: usize,
}

impl<'de, T, H> DeserializeSeed<'de> for ElementsSeed<T, H>
where
    T: Deserialize<'de>,
    H: HashingStrategy<T>,
{
    type Value = StrategySet<T, H>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, T, H> Visitor<'de> for ElementsSeed<T, H>
where
    T: Deserialize<'de>,
    H: HashingStrategy<T>,
{
    type Value = StrategySet<T, H>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of {} elements", self.count)
    }

    fn visit_seq<A>(mut self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut read = 0;
        while let Some(value) = seq.next_element()? {
            self.set.insert(value);
            read += 1;
        }
        if read != self.count {
            return Err(de::Error::invalid_length(read, &self));
        }
        Ok(self.set)
    }
}
