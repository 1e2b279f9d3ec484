//! otsake - XPath header enrichment
//!
//! Pulls values out of an XML payload and adds them to the message headers.
//! The payload itself is never changed.
//!
//! ```text
//! Message { payload: <root><a>1</a></root>, headers: {..} }
//!                     │
//!                     ▼  HeaderEnricher { "a" => /root/a }
//! Message { payload: (same bytes),          headers: {.., a: "1"} }
//! ```
//!
//! - [`HeaderEnricher`] - the transform, built once and shared
//! - [`ExpressionEvaluator`] - injected XPath engine ([`SxdEvaluator`] by default)
//! - [`EnricherHandle`] - rebuild-and-swap publishing
//! - [`Middleware`] / [`MiddlewareChain`] - pipeline composition
//! - [`config`] - environment and JSON configuration
//!
//! # Example
//!
//! An enricher followed by a [`Transform`] that routes on the extracted value:
//!
//! ```
//! use otsake::{HeaderEnricher, Message, MiddlewareChain, Transform, XPathExpression};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let enricher = HeaderEnricher::builder()
//!     .expression("order", XPathExpression::compile("/order/@id")?)
//!     .build();
//!
//! let mut chain = MiddlewareChain::new();
//! chain.add(enricher);
//! chain.add(Transform::new(|msg: Message| {
//!     let queue = match msg.header("order").and_then(|v| v.as_str()) {
//!         Some(id) if id.starts_with("EU-") => "orders-eu",
//!         _ => "orders",
//!     };
//!     msg.with_header("queue", queue)
//! }));
//!
//! let runtime = tokio::runtime::Runtime::new()?;
//! let msg = runtime
//!     .block_on(chain.process(Message::new(r#"<order id="EU-42"/>"#)))?
//!     .ok_or("message filtered")?;
//!
//! assert_eq!(msg.header("order").unwrap(), "EU-42");
//! assert_eq!(msg.header("queue").unwrap(), "orders-eu");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod config;
pub mod enricher;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod handle;
pub mod middleware;

pub use config::{Config, ConfigError, EnricherConfig, HeaderConfig, LogFormat};
pub use enricher::{HeaderEnricher, HeaderEnricherBuilder};
pub use error::{EnrichError, EvaluationError, PluginError, Result};
pub use evaluator::{ExpressionEvaluator, SxdEvaluator, XmlDocument};
pub use expression::{EvaluationType, XPathExpression};
pub use handle::EnricherHandle;
pub use middleware::{Middleware, MiddlewareChain, Transform};
pub use otsake_core::{HeaderValue, Headers, Message, MessageId};
