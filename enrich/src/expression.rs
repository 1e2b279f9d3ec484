//! XPath expressions and result typing

use crate::error::EnrichError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a raw XPath result is converted into a header value
///
/// Deserializes from `"string"`, `"number"` or `"boolean"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EvaluationType {
    /// String value of the first matched node; no match is null
    #[default]
    #[serde(rename = "string")]
    StringResult,
    /// Numeric coercion of the matched value; no match is NaN
    #[serde(rename = "number")]
    NumberResult,
    /// Boolean coercion of the matched value; no match is false
    #[serde(rename = "boolean")]
    BooleanResult,
}

impl fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationType::StringResult => "string",
            EvaluationType::NumberResult => "number",
            EvaluationType::BooleanResult => "boolean",
        })
    }
}

/// A validated XPath expression
///
/// Syntax is checked once in [`compile`](Self::compile), so a malformed or
/// empty expression fails at construction rather than on the first message.
/// sxd's compiled trees are not `Send`, so the validated source is what gets
/// stored and shared across threads. Each evaluating thread compiles it again
/// once and caches the tree (see [`SxdEvaluator`](crate::SxdEvaluator)).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XPathExpression {
    source: String,
}

impl XPathExpression {
    /// Validate and wrap an XPath expression
    ///
    /// # Errors
    /// Returns [`EnrichError::InvalidExpression`] if the expression is empty or
    /// does not parse.
    pub fn compile(source: impl Into<String>) -> Result<Self, EnrichError> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(EnrichError::InvalidExpression {
                expression: source,
                message: "empty expression".to_string(),
            });
        }
        match sxd_xpath::Factory::new().build(&source) {
            Ok(Some(_)) => Ok(Self { source }),
            Ok(None) => Err(EnrichError::InvalidExpression {
                expression: source,
                message: "empty expression".to_string(),
            }),
            Err(e) => Err(EnrichError::InvalidExpression {
                message: e.to_string(),
                expression: source,
            }),
        }
    }

    /// The expression text
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for XPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<&str> for XPathExpression {
    type Error = EnrichError;

    fn try_from(source: &str) -> Result<Self, Self::Error> {
        Self::compile(source)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_valid_path() {
        let expr = XPathExpression::compile("/root/elementOne").unwrap();
        assert_eq!(expr.as_str(), "/root/elementOne");
        assert_eq!(expr.to_string(), "/root/elementOne");
    }

    #[test]
    fn test_compile_rejects_malformed() {
        let err = XPathExpression::compile("/root/[").unwrap_err();
        assert!(matches!(
            err,
            EnrichError::InvalidExpression { ref expression, .. } if expression == "/root/["
        ));
    }

    #[test]
    fn test_compile_rejects_empty() {
        for source in ["", "   "] {
            let err = XPathExpression::compile(source).unwrap_err();
            assert_eq!(
                err,
                EnrichError::InvalidExpression {
                    expression: source.to_string(),
                    message: "empty expression".to_string(),
                }
            );
        }
    }

    #[test]
    fn test_evaluation_type_defaults_to_string() {
        assert_eq!(EvaluationType::default(), EvaluationType::StringResult);
    }

    #[test]
    fn test_evaluation_type_from_json() {
        let t: EvaluationType = serde_json::from_str("\"number\"").unwrap();
        assert_eq!(t, EvaluationType::NumberResult);
        let t: EvaluationType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(t, EvaluationType::BooleanResult);
        assert!(serde_json::from_str::<EvaluationType>("\"node\"").is_err());
    }
}
