//! Firestore JSON documents and typed values.
//!
//! Firestore encodes each field as a single-key object naming its type, e.g.
//! `{"stringValue": "hi"}` or `{"integerValue": "42"}`. The same encoding is
//! used by the REST API and by JSON-encoded document events, so both the
//! inbound receiver and the outbound store adapter decode through here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Document, FieldValue};

/// Errors raised while turning wire documents into domain documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FirestoreDecodeError {
    /// The JSON did not have the expected structure.
    #[error("malformed Firestore JSON: {message}")]
    Malformed {
        /// Parser detail.
        message: String,
    },
    /// An `integerValue` was not a valid 64-bit integer.
    #[error("field `{field}` has invalid integer value `{value}`")]
    InvalidInteger {
        /// Dotted path of the offending field.
        field: String,
        /// Raw value.
        value: String,
    },
    /// A string-encoded `doubleValue` was not a number or a non-finite marker.
    #[error("field `{field}` has invalid double value `{value}`")]
    InvalidDouble {
        /// Dotted path of the offending field.
        field: String,
        /// Raw value.
        value: String,
    },
    /// A document timestamp was not RFC 3339.
    #[error("invalid document timestamp `{value}`")]
    InvalidTimestamp {
        /// Raw value.
        value: String,
    },
}

/// Firestore document resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    /// Full resource name, e.g.
    /// `projects/p/databases/(default)/documents/notifications/n1`.
    #[serde(default)]
    pub name: Option<String>,
    /// Typed field values.
    #[serde(default)]
    pub fields: BTreeMap<String, ValueDto>,
    /// Creation timestamp.
    #[serde(default)]
    pub create_time: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub update_time: Option<String>,
}

impl DocumentDto {
    /// Decode a document from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreDecodeError::Malformed`] when the bytes are not a
    /// Firestore document.
    pub fn from_slice(body: &[u8]) -> Result<Self, FirestoreDecodeError> {
        serde_json::from_slice(body).map_err(malformed)
    }

    /// Decode either a bare document or a document event body, returning the
    /// created document in the latter case.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreDecodeError::Malformed`] when the bytes are neither
    /// shape, or an event body carries no `value`.
    pub fn from_document_or_event(body: &[u8]) -> Result<Self, FirestoreDecodeError> {
        let json: serde_json::Value = serde_json::from_slice(body).map_err(malformed)?;
        if json.get("value").is_some() || json.get("oldValue").is_some() {
            return DocumentEventDto::from_value(json)?
                .value
                .ok_or_else(|| FirestoreDecodeError::Malformed {
                    message: "event body carries no `value` document".to_owned(),
                });
        }
        serde_json::from_value(json).map_err(malformed)
    }

    /// Convert the typed fields into a domain document.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreDecodeError::InvalidInteger`] for integer values
    /// that do not fit in an `i64` and [`FirestoreDecodeError::InvalidDouble`]
    /// for unparseable string-encoded doubles.
    pub fn to_document(&self) -> Result<Document, FirestoreDecodeError> {
        decode_fields(&self.fields, "").map(Document::new)
    }

    /// Document path relative to the database root, if the name is present.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::wire::firestore::DocumentDto;
    ///
    /// let dto = DocumentDto::from_slice(
    ///     br#"{"name": "projects/p/databases/(default)/documents/notifications/n1"}"#,
    /// )?;
    /// assert_eq!(dto.document_path(), Some("notifications/n1"));
    /// # Ok::<(), notification_relay::wire::firestore::FirestoreDecodeError>(())
    /// ```
    pub fn document_path(&self) -> Option<&str> {
        self.name.as_deref().map(document_path)
    }

    /// Parse the creation timestamp, if present.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreDecodeError::InvalidTimestamp`] when the value is
    /// not RFC 3339.
    pub fn create_time(&self) -> Result<Option<DateTime<Utc>>, FirestoreDecodeError> {
        self.create_time
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|value| value.with_timezone(&Utc))
                    .map_err(|_| FirestoreDecodeError::InvalidTimestamp {
                        value: raw.to_owned(),
                    })
            })
            .transpose()
    }
}

/// Data body of a document event (`google.cloud.firestore.document.v1.*`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventDto {
    /// Document after the change; absent for deletions.
    #[serde(default)]
    pub value: Option<DocumentDto>,
    /// Document before the change; absent for creations.
    #[serde(default)]
    pub old_value: Option<DocumentDto>,
}

impl DocumentEventDto {
    /// Decode an event body from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreDecodeError::Malformed`] when the bytes are not an
    /// event body.
    pub fn from_slice(body: &[u8]) -> Result<Self, FirestoreDecodeError> {
        serde_json::from_slice(body).map_err(malformed)
    }

    /// Decode an event body already parsed as JSON, e.g. the `data` member
    /// of a structured-mode CloudEvent.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreDecodeError::Malformed`] when the value is not an
    /// event body.
    pub fn from_value(data: serde_json::Value) -> Result<Self, FirestoreDecodeError> {
        serde_json::from_value(data).map_err(malformed)
    }
}

/// One typed Firestore value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueDto {
    /// `{"nullValue": null}`.
    NullValue(serde_json::Value),
    /// `{"booleanValue": true}`.
    BooleanValue(bool),
    /// `{"integerValue": "42"}`; numbers are accepted too.
    IntegerValue(IntegerDto),
    /// `{"doubleValue": 1.5}`; non-finite values arrive as `"NaN"`,
    /// `"Infinity"` or `"-Infinity"`.
    DoubleValue(DoubleDto),
    /// `{"timestampValue": "2024-01-01T00:00:00Z"}`.
    TimestampValue(String),
    /// `{"stringValue": "hi"}`.
    StringValue(String),
    /// `{"bytesValue": "aGk="}`.
    BytesValue(String),
    /// `{"referenceValue": "projects/.../documents/users/u1"}`.
    ReferenceValue(String),
    /// `{"geoPointValue": {"latitude": 1.0, "longitude": 2.0}}`.
    GeoPointValue(GeoPointDto),
    /// `{"arrayValue": {"values": [...]}}`.
    ArrayValue(ArrayDto),
    /// `{"mapValue": {"fields": {...}}}`.
    MapValue(MapDto),
}

/// Integer wire form: canonical string or plain JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntegerDto {
    /// JSON number.
    Number(i64),
    /// Decimal string, as produced by the REST API.
    Text(String),
}

/// Double wire form: JSON number, or a string for non-finite values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DoubleDto {
    /// JSON number.
    Number(f64),
    /// `"NaN"`, `"Infinity"`, `"-Infinity"` or a decimal string.
    Text(String),
}

impl DoubleDto {
    fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => match text.as_str() {
                "NaN" => Some(f64::NAN),
                "Infinity" => Some(f64::INFINITY),
                "-Infinity" => Some(f64::NEG_INFINITY),
                other => other.parse().ok().filter(|number: &f64| number.is_finite()),
            },
        }
    }
}

/// Latitude/longitude pair; zero values may be omitted on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoPointDto {
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: f64,
}

/// Array wrapper; empty arrays may omit `values`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayDto {
    /// Elements.
    #[serde(default)]
    pub values: Vec<ValueDto>,
}

/// Map wrapper; empty maps may omit `fields`.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDto {
    /// Entries.
    #[serde(default)]
    pub fields: BTreeMap<String, ValueDto>,
}

/// Strip a resource name down to the path below `/documents/`.
///
/// Names without that marker are returned unchanged.
pub fn document_path(name: &str) -> &str {
    const MARKER: &str = "/documents/";
    match name.find(MARKER) {
        Some(index) => name.get(index + MARKER.len()..).unwrap_or(name),
        None => name,
    }
}

fn malformed(error: serde_json::Error) -> FirestoreDecodeError {
    FirestoreDecodeError::Malformed {
        message: error.to_string(),
    }
}

fn decode_fields(
    fields: &BTreeMap<String, ValueDto>,
    prefix: &str,
) -> Result<BTreeMap<String, FieldValue>, FirestoreDecodeError> {
    fields
        .iter()
        .map(|(name, value)| {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            decode_value(value, &path).map(|decoded| (name.clone(), decoded))
        })
        .collect()
}

fn decode_value(value: &ValueDto, path: &str) -> Result<FieldValue, FirestoreDecodeError> {
    Ok(match value {
        ValueDto::NullValue(_) => FieldValue::Null,
        ValueDto::BooleanValue(flag) => FieldValue::Boolean(*flag),
        ValueDto::IntegerValue(IntegerDto::Number(number)) => FieldValue::Integer(*number),
        ValueDto::IntegerValue(IntegerDto::Text(text)) => {
            let number = text
                .parse::<i64>()
                .map_err(|_| FirestoreDecodeError::InvalidInteger {
                    field: path.to_owned(),
                    value: text.clone(),
                })?;
            FieldValue::Integer(number)
        }
        ValueDto::DoubleValue(double) => {
            let number = double
                .to_f64()
                .ok_or_else(|| FirestoreDecodeError::InvalidDouble {
                    field: path.to_owned(),
                    value: match double {
                        DoubleDto::Number(number) => number.to_string(),
                        DoubleDto::Text(text) => text.clone(),
                    },
                })?;
            FieldValue::Double(number)
        }
        ValueDto::TimestampValue(raw) => FieldValue::Timestamp(raw.clone()),
        ValueDto::StringValue(text) => FieldValue::String(text.clone()),
        ValueDto::BytesValue(raw) => FieldValue::Bytes(raw.clone()),
        ValueDto::ReferenceValue(raw) => FieldValue::Reference(raw.clone()),
        ValueDto::GeoPointValue(point) => FieldValue::GeoPoint {
            latitude: point.latitude,
            longitude: point.longitude,
        },
        ValueDto::ArrayValue(array) => FieldValue::Array(
            array
                .values
                .iter()
                .enumerate()
                .map(|(index, item)| decode_value(item, &format!("{path}[{index}]")))
                .collect::<Result<_, _>>()?,
        ),
        ValueDto::MapValue(map) => FieldValue::Map(decode_fields(&map.fields, path)?),
    })
}
