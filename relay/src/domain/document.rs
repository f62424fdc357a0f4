//! Schemaless document snapshots as seen by the relay.
//!
//! The document store is schemaless, so the relay never assumes a field has
//! the type it expects. Accessors treat missing, null, non-string and empty
//! string values uniformly as "no value", which keeps the defaulting rules in
//! one place.

use std::collections::BTreeMap;

/// One typed field value inside a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// IEEE 754 double.
    Double(f64),
    /// RFC 3339 timestamp, kept in its wire representation.
    Timestamp(String),
    /// UTF-8 string.
    String(String),
    /// Base64-encoded bytes, kept in their wire representation.
    Bytes(String),
    /// Reference to another document by resource name.
    Reference(String),
    /// Latitude/longitude pair.
    GeoPoint {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
    /// Ordered list of values.
    Array(Vec<FieldValue>),
    /// Nested map of values.
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Borrow the string payload when this is a string value.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::FieldValue;
    ///
    /// assert_eq!(FieldValue::String("hi".to_owned()).as_str(), Some("hi"));
    /// assert_eq!(FieldValue::Integer(7).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Field map of one stored document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Wrap an existing field map.
    pub fn new(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// Build a document from string-valued fields.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::Document;
    ///
    /// let doc = Document::from_strings([("userId", "u1"), ("title", "Hi")]);
    /// assert_eq!(doc.text("userId"), Some("u1"));
    /// ```
    pub fn from_strings<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_owned(), FieldValue::from(value)))
            .collect()
    }

    /// Look up a raw field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Return the field as text when it holds a non-empty string.
    ///
    /// Missing fields, nulls, non-string values and `""` all yield `None`.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::{Document, FieldValue};
    ///
    /// let doc: Document = [
    ///     ("title".to_owned(), FieldValue::from("")),
    ///     ("count".to_owned(), FieldValue::Integer(3)),
    /// ]
    /// .into_iter()
    /// .collect();
    /// assert_eq!(doc.text("title"), None);
    /// assert_eq!(doc.text("count"), None);
    /// assert_eq!(doc.text("missing"), None);
    /// ```
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(FieldValue::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Borrow the underlying field map.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Return whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
