use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A single value produced by a path-query field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransformValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// An IRI. Serialized as a plain string.
    Uri(String),
}

impl TransformValue {
    /// Returns the value as a string if it is textual (a string or an IRI).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) | Self::Uri(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for TransformValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(value) | Self::Uri(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for TransformValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for TransformValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for TransformValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for TransformValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for TransformValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// The result of a path query: field names mapped to the values the field selected.
///
/// Fields keep the order in which they were inserted. A field is only present if it has at least
/// one value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    fields: Vec<(String, Vec<TransformValue>)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the values of `name`. Empty value lists remove the field.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<TransformValue>) {
        let name = name.into();
        let position = self.fields.iter().position(|(n, _)| *n == name);
        match (position, values.is_empty()) {
            (Some(position), true) => {
                self.fields.remove(position);
            }
            (Some(position), false) => self.fields[position].1 = values,
            (None, true) => {}
            (None, false) => self.fields.push((name, values)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[TransformValue]> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TransformValue])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, values) in &self.fields {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_omitted() {
        let mut map = FieldMap::new();
        map.insert("title", vec!["Contributor".into()]);
        map.insert("missing", vec![]);
        assert_eq!(map.len(), 1);
        assert!(!map.contains_field("missing"));

        map.insert("title", vec![]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_serializes_as_json_object() {
        let mut map = FieldMap::new();
        map.insert("title", vec!["Contributor".into()]);
        map.insert("size", vec![TransformValue::Integer(3), 1.5.into()]);
        map.insert("id", vec![TransformValue::Uri("http://example.com/a".to_owned())]);
        map.insert("flag", vec![true.into()]);

        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"title":["Contributor"],"size":[3,1.5],"id":["http://example.com/a"],"flag":[true]}"#
        );
    }
}
