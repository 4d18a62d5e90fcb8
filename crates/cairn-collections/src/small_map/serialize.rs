//! Wire form for small maps
//!
//! Maps serialize as a flat ordered sequence of (key, value) pairs; the
//! sequence length is the arity. The capacity parameter never reaches the
//! wire, so data written under one capacity reads back under another as
//! long as the entries fit - the arity family can grow without breaking
//! previously serialized maps.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use super::SmallMap;

impl<K, V, const N: usize> Serialize for SmallMap<K, V, N>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (key, value) in self.pairs() {
            seq.serialize_element(&(key, value))?;
        }
        seq.end()
    }
}

struct SmallMapVisitor<K, V, const N: usize> {
    marker: PhantomData<(K, V)>,
}

impl<'de, K, V, const N: usize> Visitor<'de> for SmallMapVisitor<K, V, N>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = SmallMap<K, V, N>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a sequence of at most {} key-value pairs", N)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut map = SmallMap::empty();
        while let Some((key, value)) = seq.next_element::<(K, V)>()? {
            if map.len() == N {
                return Err(de::Error::invalid_length(N + 1, &self));
            }
            map.push_pair(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V, const N: usize> Deserialize<'de> for SmallMap<K, V, N>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SmallMapVisitor {
            marker: PhantomData,
        })
    }
}
