//! Trigger binding between document paths and a creation handler.
//!
//! A trigger pattern such as `notifications/{notificationId}` is a sequence
//! of literal and wildcard segments. A created document is dispatched only
//! when its path has the same number of segments, every literal matches, and
//! every wildcard captures a non-empty segment.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ports::{DocumentCreatedEvent, DocumentCreatedHandler, EventMetadata};
use super::{Document, RelayError, RelayOutcome};

/// Path pattern bound to notification creation events.
pub const NOTIFICATIONS_TRIGGER_PATTERN: &str = "notifications/{notificationId}";

/// Wildcard values captured from a matching document path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    /// Look up a captured wildcard by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Return whether no wildcards were captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Errors raised when parsing a trigger pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern had no segments.
    #[error("trigger pattern must not be empty")]
    Empty,
    /// A segment between slashes was empty.
    #[error("trigger pattern `{pattern}` contains an empty segment")]
    EmptySegment {
        /// Offending pattern.
        pattern: String,
    },
    /// A wildcard had no name or unbalanced braces.
    #[error("trigger pattern `{pattern}` has a malformed wildcard `{segment}`")]
    MalformedWildcard {
        /// Offending pattern.
        pattern: String,
        /// Offending segment.
        segment: String,
    },
    /// The same wildcard name was used twice.
    #[error("trigger pattern `{pattern}` repeats wildcard `{name}`")]
    DuplicateWildcard {
        /// Offending pattern.
        pattern: String,
        /// Repeated wildcard name.
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(String),
}

/// Parsed document path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl DocumentPathPattern {
    /// Parse a slash-separated pattern of literals and `{name}` wildcards.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for empty patterns, empty segments, malformed
    /// or duplicate wildcards.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::DocumentPathPattern;
    ///
    /// let pattern = DocumentPathPattern::parse("notifications/{notificationId}")?;
    /// let params = pattern.matches("notifications/n1").expect("path matches");
    /// assert_eq!(params.get("notificationId"), Some("n1"));
    /// assert!(pattern.matches("users/u1").is_none());
    /// # Ok::<(), notification_relay::domain::PatternError>(())
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut segments = Vec::new();
        let mut seen = Vec::<&str>::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(PatternError::EmptySegment {
                    pattern: pattern.to_owned(),
                });
            }
            let wildcard = segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'));
            let parsed = match wildcard {
                Some(name) => {
                    if name.is_empty() || name.contains(['{', '}']) {
                        return Err(malformed(pattern, segment));
                    }
                    if seen.contains(&name) {
                        return Err(PatternError::DuplicateWildcard {
                            pattern: pattern.to_owned(),
                            name: name.to_owned(),
                        });
                    }
                    seen.push(name);
                    Segment::Wildcard(name.to_owned())
                }
                None if segment.contains(['{', '}']) => return Err(malformed(pattern, segment)),
                None => Segment::Literal(segment.to_owned()),
            };
            segments.push(parsed);
        }

        Ok(Self {
            raw: trimmed.to_owned(),
            segments,
        })
    }

    /// Match a document path, returning captured wildcards on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Wildcard(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.to_owned());
                }
                _ => return None,
            }
        }
        Some(PathParams(params))
    }

    /// The pattern text, without surrounding slashes.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }
}

fn malformed(pattern: &str, segment: &str) -> PatternError {
    PatternError::MalformedWildcard {
        pattern: pattern.to_owned(),
        segment: segment.to_owned(),
    }
}

/// Binding of one path pattern to one creation handler.
#[derive(Clone)]
pub struct DocumentTrigger {
    pattern: DocumentPathPattern,
    handler: Arc<dyn DocumentCreatedHandler>,
}

impl DocumentTrigger {
    /// Bind `handler` to documents created under `pattern`.
    pub fn new(pattern: DocumentPathPattern, handler: Arc<dyn DocumentCreatedHandler>) -> Self {
        Self { pattern, handler }
    }

    /// The bound pattern.
    pub fn pattern(&self) -> &DocumentPathPattern {
        &self.pattern
    }

    /// Dispatch a created document to the handler.
    ///
    /// Returns `None` without invoking the handler when `path` is not covered
    /// by the pattern.
    pub async fn dispatch(
        &self,
        path: &str,
        document: Document,
        metadata: EventMetadata,
    ) -> Option<Result<RelayOutcome, RelayError>> {
        let params = self.pattern.matches(path)?;
        let event = DocumentCreatedEvent {
            path: path.trim_matches('/').to_owned(),
            params,
            document,
            metadata,
        };
        Some(self.handler.on_document_created(&event).await)
    }
}
