//! Typed header values
//!
//! Headers carry either text, a number, or a boolean. The variant is decided
//! by whoever writes the header (for the XPath enricher: the configured
//! evaluation type), so readers match on it instead of re-parsing strings.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Header mapping carried by a [`Message`](crate::Message)
pub type Headers = HashMap<String, HeaderValue>;

/// A single header value
///
/// Serializes untagged, so `{"one": "1", "two": 2.0}` round-trips through JSON
/// as `String` and `Number` respectively. JSON has no non-finite numbers:
/// NaN and the infinities serialize as the strings `"NaN"`, `"inf"` and
/// `"-inf"`, and read back as `String` values.
///
/// # Example
///
/// ```
/// use otsake_core::HeaderValue;
///
/// let v = HeaderValue::from(2.0);
/// assert_eq!(v, 2.0);
/// assert_eq!(v.as_str(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Text value
    String(String),
    /// Double-precision number (may be NaN)
    Number(#[serde(serialize_with = "serialize_number")] f64),
    /// Boolean value
    Boolean(bool),
}

fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_finite() {
        serializer.serialize_f64(*n)
    } else {
        serializer.collect_str(n)
    }
}

impl HeaderValue {
    /// Borrow the text if this is a `String` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value if this is a `Number`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value if this is a `Boolean`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HeaderValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// True for an empty `String` value
    ///
    /// Numbers (including NaN) and booleans are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, HeaderValue::String(s) if s.is_empty())
    }

    /// Short name of the variant, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            HeaderValue::String(_) => "string",
            HeaderValue::Number(_) => "number",
            HeaderValue::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::String(s) => f.write_str(s),
            HeaderValue::Number(n) => write!(f, "{n}"),
            HeaderValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        HeaderValue::String(s.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        HeaderValue::String(s)
    }
}

impl From<f64> for HeaderValue {
    fn from(n: f64) -> Self {
        HeaderValue::Number(n)
    }
}

impl From<bool> for HeaderValue {
    fn from(b: bool) -> Self {
        HeaderValue::Boolean(b)
    }
}

impl PartialEq<str> for HeaderValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for HeaderValue {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<f64> for HeaderValue {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl PartialEq<bool> for HeaderValue {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}
