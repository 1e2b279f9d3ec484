//! The message envelope
//!
//! A [`Message`] is a payload plus a header mapping. Payloads are `Bytes`, so
//! deriving a new message from an existing one shares the payload allocation:
//!
//! ```text
//! input Message ──► enricher ──► output Message
//!      │                              │
//!      └──────── same Bytes ──────────┘   (refcount bump, no copy)
//! ```
//!
//! Messages are treated as immutable values. Components that add headers
//! build a derived copy with [`Message::with_headers`] and leave the input
//! untouched.

use crate::header::{HeaderValue, Headers};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;

/// Helper to get headers or an empty map
#[inline]
fn headers_ref(h: &Option<Box<Headers>>) -> &Headers {
    static EMPTY: std::sync::OnceLock<Headers> = std::sync::OnceLock::new();
    h.as_deref().unwrap_or_else(|| EMPTY.get_or_init(HashMap::new))
}

/// Message identifier (binary ULID, Copy)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(ulid::Ulid);

impl MessageId {
    /// Generate a new unique ID
    #[inline]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the ULID
    #[inline]
    pub fn as_ulid(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ulid::Ulid> for MessageId {
    fn from(ulid: ulid::Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload plus headers
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use otsake_core::Message;
///
/// let msg = Message::new(Bytes::from("<root/>")).with_header("tenant", "acme");
/// assert_eq!(msg.payload_str(), Some("<root/>"));
/// assert_eq!(msg.header("tenant").unwrap(), "acme");
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique identifier
    pub id: MessageId,

    /// Unix timestamp in nanoseconds
    pub timestamp: i64,

    /// Header mapping
    ///
    /// Lazily allocated - None when empty.
    headers: Option<Box<Headers>>,

    /// Opaque payload - zero-copy via Bytes
    pub payload: Bytes,
}

impl Message {
    /// Create a Message with auto-generated ID and current timestamp
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            id: MessageId::new(),
            timestamp: chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
            headers: None,
            payload: payload.into(),
        }
    }

    /// Create a Message with explicit ID and timestamp
    pub fn with_id(id: impl Into<MessageId>, timestamp: i64, payload: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            headers: None,
            payload: payload.into(),
        }
    }

    /// Add a header (builder style)
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers
            .get_or_insert_with(Default::default)
            .insert(key.into(), value.into());
        self
    }

    /// Derive a copy of this message with `headers` replacing the header mapping
    ///
    /// ID, timestamp and payload are carried over; the payload buffer is shared.
    pub fn with_headers(&self, headers: Headers) -> Self {
        Self {
            id: self.id,
            timestamp: self.timestamp,
            headers: if headers.is_empty() {
                None
            } else {
                Some(Box::new(headers))
            },
            payload: self.payload.clone(),
        }
    }

    /// Header mapping (empty map if none were set)
    #[inline]
    pub fn headers(&self) -> &Headers {
        headers_ref(&self.headers)
    }

    /// Look up a single header
    #[inline]
    pub fn header(&self, key: &str) -> Option<&HeaderValue> {
        self.headers().get(key)
    }

    /// Check whether a header is present
    #[inline]
    pub fn has_header(&self, key: &str) -> bool {
        self.headers().contains_key(key)
    }

    /// Get payload as a string slice (if valid UTF-8)
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::new(Bytes::from("<root/>"));

        assert!(!msg.id.to_string().is_empty());
        assert!(msg.timestamp > 0);
        assert!(msg.headers().is_empty());
        assert_eq!(msg.payload_str(), Some("<root/>"));
    }

    #[test]
    fn test_message_with_header() {
        let msg = Message::new(Bytes::new())
            .with_header("tenant", "acme")
            .with_header("retries", 3.0);

        assert_eq!(msg.header("tenant").unwrap(), "acme");
        assert_eq!(msg.header("retries").and_then(HeaderValue::as_f64), Some(3.0));
        assert!(!msg.has_header("missing"));
    }

    #[test]
    fn test_with_headers_leaves_original_untouched() {
        let original = Message::new(Bytes::from("<a/>")).with_header("keep", "me");

        let mut headers = original.headers().clone();
        headers.insert("added".into(), "yes".into());
        let derived = original.with_headers(headers);

        assert!(!original.has_header("added"));
        assert_eq!(derived.header("added").unwrap(), "yes");
        assert_eq!(derived.header("keep").unwrap(), "me");
        assert_eq!(derived.id, original.id);
        assert_eq!(derived.timestamp, original.timestamp);
    }

    #[test]
    fn test_with_headers_shares_payload() {
        let msg = Message::new(Bytes::from(vec![b'x'; 4096]));
        let derived = msg.with_headers(Headers::new());

        assert_eq!(msg.payload.as_ptr(), derived.payload.as_ptr());
        assert!(derived.headers().is_empty());
    }

    #[test]
    fn test_payload_str_rejects_binary() {
        let binary = Message::new(Bytes::from(vec![0xFF, 0xFE]));
        assert!(binary.payload_str().is_none());
    }

    #[test]
    fn test_message_id_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }
}
