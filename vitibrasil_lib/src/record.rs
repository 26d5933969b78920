//! Normalized output records.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Column header → cell value, in source column order.
///
/// Serializes as a JSON object whose members keep that order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metrics(Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metrics {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metrics = Metrics::new();
        for (k, v) in iter {
            metrics.insert(k, v);
        }
        metrics
    }
}

impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct MetricsVisitor;

impl<'de> Visitor<'de> for MetricsVisitor {
    type Value = Metrics;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of column names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Metrics, A::Error> {
        let mut metrics = Metrics::new();
        while let Some((k, v)) = access.next_entry::<String, String>()? {
            metrics.insert(k, v);
        }
        Ok(metrics)
    }
}

impl<'de> Deserialize<'de> for Metrics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MetricsVisitor)
    }
}

/// One normalized table row.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DataRecord {
    /// Text of the row's first column.
    pub item_name: String,

    pub year: i32,

    /// Display name of the subsection the page belongs to, when known.
    pub subsection_name: Option<String>,

    /// Category the row is grouped under. Only sub-item rows carry one.
    pub parent_category: Option<String>,

    /// Remaining columns keyed by header text. Blank and `-` cells read `"0"`.
    pub metrics: Metrics,
}

/// Response envelope handed to the API layer.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DataResponse {
    pub data: Vec<DataRecord>,
}

impl From<Vec<DataRecord>> for DataResponse {
    fn from(data: Vec<DataRecord>) -> Self {
        Self { data }
    }
}
