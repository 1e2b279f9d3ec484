//! XPath header enricher
//!
//! Evaluates a set of named XPath expressions against a message's XML payload
//! and returns a copy of the message with the results added as headers.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use otsake::{EvaluationType, HeaderEnricher, Message, XPathExpression};
//!
//! let enricher = HeaderEnricher::builder()
//!     .expression("one", XPathExpression::compile("/root/elementOne")?)
//!     .expression("two", XPathExpression::compile("/root/elementTwo")?)
//!     .evaluation_type("two", EvaluationType::NumberResult)
//!     .build();
//!
//! let msg = Message::new(Bytes::from(
//!     "<root><elementOne>1</elementOne><elementTwo>2</elementTwo></root>",
//! ));
//! let out = enricher.transform(&msg)?;
//!
//! assert_eq!(out.header("one").unwrap(), "1");
//! assert_eq!(out.header("two").and_then(|v| v.as_f64()), Some(2.0));
//! # Ok::<(), otsake::EnrichError>(())
//! ```

use crate::error::{EnrichError, EvaluationError};
use crate::evaluator::{ExpressionEvaluator, SxdEvaluator};
use crate::expression::{EvaluationType, XPathExpression};
use otsake_core::{HeaderValue, Message};
use std::collections::HashMap;
use std::sync::Arc;

/// One header to compute, resolved at build time
#[derive(Debug, Clone)]
struct HeaderRule {
    name: String,
    expression: XPathExpression,
    result_type: EvaluationType,
    overwrite: bool,
}

/// Adds headers computed from the XML payload
///
/// Configuration is fixed once built. `transform` takes `&self` and keeps no
/// per-call state, so one instance can serve any number of concurrent
/// callers. To change configuration at runtime, build a new enricher and
/// publish it through an [`EnricherHandle`](crate::EnricherHandle).
pub struct HeaderEnricher {
    rules: Vec<HeaderRule>,
    skip_null_results: bool,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl HeaderEnricher {
    /// Enricher with default settings: string results, skip nulls, overwrite
    pub fn new(expressions: HashMap<String, XPathExpression>) -> Self {
        Self::builder().expressions(expressions).build()
    }

    /// Start building an enricher
    pub fn builder() -> HeaderEnricherBuilder {
        HeaderEnricherBuilder::new()
    }

    /// Whether null (and empty string) results are left out
    pub fn skip_null_results(&self) -> bool {
        self.skip_null_results
    }

    /// Header names this enricher may produce, sorted
    pub fn header_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Evaluation type configured for `header`
    pub fn evaluation_type(&self, header: &str) -> Option<EvaluationType> {
        self.rules
            .iter()
            .find(|r| r.name == header)
            .map(|r| r.result_type)
    }

    /// Compute headers from the payload and return an enriched copy
    ///
    /// The input message is not modified. The output shares its payload.
    ///
    /// # Errors
    /// Any evaluator error is returned as-is and no headers are applied.
    pub fn transform(&self, message: &Message) -> Result<Message, EnrichError> {
        if self.rules.is_empty() {
            return Ok(message.clone());
        }

        let payload = message
            .payload_str()
            .ok_or_else(|| EvaluationError::Parse("payload is not valid UTF-8".to_string()))?;
        let document = self.evaluator.parse(payload)?;

        // Evaluate everything before touching headers; an error leaves nothing applied.
        let mut computed = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let value = document.evaluate(&rule.expression, rule.result_type)?;
            match self.resolve(value) {
                Some(value) => computed.push((rule, value)),
                None => tracing::trace!(
                    id = %message.id,
                    header = %rule.name,
                    "null result skipped"
                ),
            }
        }

        let mut headers = message.headers().clone();
        let mut added = 0usize;
        for (rule, value) in computed {
            if !rule.overwrite && headers.contains_key(&rule.name) {
                tracing::trace!(
                    id = %message.id,
                    header = %rule.name,
                    "existing header kept"
                );
                continue;
            }
            headers.insert(rule.name.clone(), value);
            added += 1;
        }

        tracing::debug!(
            id = %message.id,
            evaluator = self.evaluator.name(),
            added,
            "headers enriched"
        );

        Ok(message.with_headers(headers))
    }

    /// Apply the skip-null policy to one evaluated value
    fn resolve(&self, value: Option<HeaderValue>) -> Option<HeaderValue> {
        match value {
            Some(v) if self.skip_null_results && v.is_empty() => None,
            Some(v) => Some(v),
            None if self.skip_null_results => None,
            None => Some(HeaderValue::String(String::new())),
        }
    }
}

impl std::fmt::Debug for HeaderEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderEnricher")
            .field("rules", &self.rules)
            .field("skip_null_results", &self.skip_null_results)
            .field("evaluator", &self.evaluator.name())
            .finish()
    }
}

/// Builder for [`HeaderEnricher`]
pub struct HeaderEnricherBuilder {
    expressions: HashMap<String, XPathExpression>,
    evaluation_types: HashMap<String, EvaluationType>,
    header_overwrites: HashMap<String, bool>,
    skip_null_results: bool,
    overwrite: bool,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl HeaderEnricherBuilder {
    fn new() -> Self {
        Self {
            expressions: HashMap::new(),
            evaluation_types: HashMap::new(),
            header_overwrites: HashMap::new(),
            skip_null_results: true,
            overwrite: true,
            evaluator: Arc::new(SxdEvaluator::new()),
        }
    }

    /// Add one header expression
    pub fn expression(mut self, header: impl Into<String>, expression: XPathExpression) -> Self {
        self.expressions.insert(header.into(), expression);
        self
    }

    /// Add several header expressions
    pub fn expressions(mut self, expressions: HashMap<String, XPathExpression>) -> Self {
        self.expressions.extend(expressions);
        self
    }

    /// Set the evaluation type for one header (default: string)
    pub fn evaluation_type(mut self, header: impl Into<String>, ty: EvaluationType) -> Self {
        self.evaluation_types.insert(header.into(), ty);
        self
    }

    /// Set evaluation types for several headers
    pub fn evaluation_types(mut self, types: HashMap<String, EvaluationType>) -> Self {
        self.evaluation_types.extend(types);
        self
    }

    /// Leave out headers whose result is null or empty (default: true)
    ///
    /// When false, a non-matching string query yields an empty string header.
    pub fn skip_null_results(mut self, skip: bool) -> Self {
        self.skip_null_results = skip;
        self
    }

    /// Replace headers already present on the input message (default: true)
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Override the overwrite policy for a single header
    pub fn header_overwrite(mut self, header: impl Into<String>, overwrite: bool) -> Self {
        self.header_overwrites.insert(header.into(), overwrite);
        self
    }

    /// Use a custom evaluator
    pub fn evaluator<E: ExpressionEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    /// Use a shared evaluator
    pub fn evaluator_arc(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Resolve per-header settings and build the enricher
    pub fn build(self) -> HeaderEnricher {
        let Self {
            expressions,
            evaluation_types,
            header_overwrites,
            skip_null_results,
            overwrite,
            evaluator,
        } = self;

        for name in evaluation_types.keys() {
            if !expressions.contains_key(name) {
                tracing::warn!(header = %name, "evaluation type set for unknown header, ignored");
            }
        }
        for name in header_overwrites.keys() {
            if !expressions.contains_key(name) {
                tracing::warn!(header = %name, "overwrite set for unknown header, ignored");
            }
        }

        let mut rules: Vec<HeaderRule> = expressions
            .into_iter()
            .map(|(name, expression)| HeaderRule {
                result_type: evaluation_types.get(&name).copied().unwrap_or_default(),
                overwrite: header_overwrites.get(&name).copied().unwrap_or(overwrite),
                name,
                expression,
            })
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));

        HeaderEnricher {
            rules,
            skip_null_results,
            evaluator,
        }
    }
}

impl Default for HeaderEnricherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
