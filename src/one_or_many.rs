//! A container for definition fields that may be written either as a single value
//! or as a list of values, e.g. `"final": "halt"` or `"final": ["accept", "reject"]`.

use serde::de::{self, IntoDeserializer, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::slice;

/// Holds either one value or a list of values.
///
/// A scalar becomes `Single`, a sequence becomes `Many`. Numbers and booleans are read
/// through their textual form, so YAML's plain `input: 1` reads the same as `input: "1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Single(T),
    Many(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
    }
}

struct OneOrManyVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrManyVisitor<T> {
    type Value = OneOrMany<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a value or a list of values")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(OneOrMany::Many(values))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        T::deserialize(v.into_deserializer()).map(OneOrMany::Single)
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        T::deserialize(v.into_deserializer()).map(OneOrMany::Single)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        self.visit_string(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_string(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_string(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_string(v.to_string())
    }
}

impl<T> OneOrMany<T> {
    /// Returns the contained values as a slice, regardless of the variant.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Single(value) => slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Converts into a `Vec`, regardless of the variant.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Single(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T: PartialEq> OneOrMany<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.as_slice().contains(value)
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        OneOrMany::Single(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_normalizes_to_one_element() {
        let value: OneOrMany<String> = OneOrMany::Single("halt".to_string());

        assert_eq!(value.as_slice(), &["halt".to_string()]);
        assert_eq!(value.len(), 1);
        assert!(value.contains(&"halt".to_string()));
        assert_eq!(value.into_vec(), vec!["halt".to_string()]);
    }

    #[test]
    fn test_many_keeps_order() {
        let value = OneOrMany::Many(vec!["accept", "reject"]);

        assert_eq!(value.iter().copied().collect::<Vec<_>>(), vec!["accept", "reject"]);
        assert!(!value.contains(&"halt"));
    }

    #[test]
    fn test_empty_many_is_empty() {
        let value: OneOrMany<u8> = OneOrMany::Many(Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_untagged_deserialization() {
        let single: OneOrMany<String> = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(single, OneOrMany::Single("1".to_string()));

        let many: OneOrMany<String> = serde_json::from_str("[\"0\", \"1\"]").unwrap();
        assert_eq!(many, OneOrMany::Many(vec!["0".to_string(), "1".to_string()]));

        assert_eq!(serde_json::to_string(&single).unwrap(), "\"1\"");
    }

    #[test]
    fn test_plain_yaml_scalars_read_as_text() {
        let single: OneOrMany<String> = serde_yaml::from_str("1").unwrap();
        assert_eq!(single, OneOrMany::Single("1".to_string()));

        let many: OneOrMany<String> = serde_yaml::from_str("[0, x, true]").unwrap();
        assert_eq!(
            many,
            OneOrMany::Many(vec!["0".to_string(), "x".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn test_rejects_maps() {
        assert!(serde_json::from_str::<OneOrMany<String>>("{\"a\": 1}").is_err());
    }
}
