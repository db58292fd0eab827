//! List responses.
//!
//! Kubernetes-backed endpoints wrap collections in `{ "items": [...] }`
//! while plain backend endpoints return a bare array. Both decode here, and
//! a bad element surfaces its own error rather than a shape mismatch.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceList<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
}

impl<T> ResourceList<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) => items,
            Self::Items { items } => items,
        }
    }
}

impl<T> From<ResourceList<T>> for Vec<T> {
    fn from(list: ResourceList<T>) -> Self {
        list.into_vec()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ResourceList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ListVisitor(PhantomData))
    }
}

struct ListVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ListVisitor<T> {
    type Value = ResourceList<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array or an object with an `items` array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ResourceList::Bare(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut items = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "items" {
                if items.is_some() {
                    return Err(de::Error::duplicate_field("items"));
                }
                items = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        items
            .map(|items| ResourceList::Items { items })
            .ok_or_else(|| de::Error::missing_field("items"))
    }
}
