//! Expression evaluation seam
//!
//! The enricher never talks to an XPath engine directly. It asks an
//! [`ExpressionEvaluator`] to parse the payload once, then evaluates each
//! configured expression against the parsed [`XmlDocument`]:
//!
//! ```text
//! payload ──► evaluator.parse() ──► XmlDocument
//!                                      │
//!                 ┌────────────────────┼────────────────────┐
//!                 ▼                    ▼                    ▼
//!          evaluate(one, String)  evaluate(two, Number)   ...
//! ```
//!
//! [`SxdEvaluator`] is the default implementation over `sxd-document` and
//! `sxd-xpath`. Tests inject their own.

use crate::error::EvaluationError;
use crate::expression::{EvaluationType, XPathExpression};
use otsake_core::HeaderValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use sxd_xpath::{Context, Value, XPath};

/// Upper bound on cached trees per thread; the cache is cleared when reached
const COMPILED_CACHE_LIMIT: usize = 1024;

thread_local! {
    /// Compiled trees keyed by expression source
    ///
    /// `XPath` is not `Send`, so each worker thread keeps its own.
    static COMPILED: RefCell<HashMap<String, Rc<XPath>>> = RefCell::new(HashMap::new());
}

fn compiled(expression: &XPathExpression) -> Result<Rc<XPath>, EvaluationError> {
    COMPILED.with(|cache| {
        if let Some(xpath) = cache.borrow().get(expression.as_str()) {
            return Ok(Rc::clone(xpath));
        }

        let execution_error = |message: String| EvaluationError::Execution {
            expression: expression.to_string(),
            message,
        };
        let xpath = sxd_xpath::Factory::new()
            .build(expression.as_str())
            .map_err(|e| execution_error(e.to_string()))?
            .ok_or_else(|| execution_error("empty expression".to_string()))?;
        let xpath = Rc::new(xpath);

        let mut cache = cache.borrow_mut();
        if cache.len() >= COMPILED_CACHE_LIMIT {
            tracing::debug!(entries = cache.len(), "compiled xpath cache cleared");
            cache.clear();
        }
        cache.insert(expression.as_str().to_string(), Rc::clone(&xpath));
        Ok(xpath)
    })
}

#[cfg(test)]
fn cached_expressions() -> usize {
    COMPILED.with(|cache| cache.borrow().len())
}

/// Parses payloads into queryable documents
///
/// Implementations must be `Send + Sync`: one evaluator is shared by every
/// concurrent `transform` call on an enricher.
pub trait ExpressionEvaluator: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Parse a payload
    ///
    /// # Errors
    /// [`EvaluationError::Parse`] if the payload is not well-formed XML.
    fn parse(&self, payload: &str) -> Result<Box<dyn XmlDocument>, EvaluationError>;
}

/// A parsed payload that expressions can be evaluated against
pub trait XmlDocument {
    /// Evaluate `expression`, converting the result per `result_type`
    ///
    /// # Returns
    /// - `Ok(Some(value))` with the typed result
    /// - `Ok(None)` when a string query matches nothing
    ///
    /// Non-matching queries must not return an error.
    fn evaluate(
        &self,
        expression: &XPathExpression,
        result_type: EvaluationType,
    ) -> Result<Option<HeaderValue>, EvaluationError>;
}

/// XPath 1.0 evaluator backed by `sxd-xpath`
///
/// Each expression is compiled once per thread and reused for every later
/// document evaluated on that thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SxdEvaluator;

impl SxdEvaluator {
    /// Create the evaluator
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for SxdEvaluator {
    fn name(&self) -> &'static str {
        "sxd-xpath"
    }

    fn parse(&self, payload: &str) -> Result<Box<dyn XmlDocument>, EvaluationError> {
        let package = sxd_document::parser::parse(payload)
            .map_err(|e| EvaluationError::Parse(e.to_string()))?;
        Ok(Box::new(SxdDocument { package }))
    }
}

struct SxdDocument {
    package: sxd_document::Package,
}

impl XmlDocument for SxdDocument {
    fn evaluate(
        &self,
        expression: &XPathExpression,
        result_type: EvaluationType,
    ) -> Result<Option<HeaderValue>, EvaluationError> {
        let document = self.package.as_document();
        let xpath = compiled(expression)?;
        let value = xpath
            .evaluate(&Context::new(), document.root())
            .map_err(|e| EvaluationError::Execution {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        Ok(convert(value, result_type))
    }
}

/// Apply XPath coercion rules for the requested result type
fn convert(value: Value<'_>, result_type: EvaluationType) -> Option<HeaderValue> {
    match result_type {
        EvaluationType::StringResult => match value {
            Value::Nodeset(ref nodes) if nodes.size() == 0 => None,
            other => Some(HeaderValue::String(other.string())),
        },
        EvaluationType::NumberResult => Some(HeaderValue::Number(value.number())),
        EvaluationType::BooleanResult => Some(HeaderValue::Boolean(value.boolean())),
    }
}
