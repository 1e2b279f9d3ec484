//! Middleware system for otsake
//!
//! Middleware processes messages one at a time. Each middleware can
//! transform, filter, or reject a message.
//!
//! # Message Flow
//!
//! ```text
//! Input ──► Middleware Chain ──► Output
//!              │
//!              ├─► Enrich (add headers from the XML payload)
//!              ├─► Transform (arbitrary message rewrite)
//!              └─► Filter (drop: Ok(None))
//! ```
//!
//! Errors stop the chain and are returned to the caller unchanged.
//!
//! # Example
//!
//! ```ignore
//! struct LoggingMiddleware;
//!
//! #[async_trait]
//! impl Middleware for LoggingMiddleware {
//!     fn name(&self) -> &'static str { "logging" }
//!
//!     async fn process(&self, msg: Message) -> Result<Option<Message>, PluginError> {
//!         tracing::info!(id = %msg.id, "Processing message");
//!         Ok(Some(msg))
//!     }
//! }
//! ```

use async_trait::async_trait;
use otsake_core::{Message, PluginError};

/// Middleware trait for message processing
///
/// # Return Value
///
/// - `Ok(Some(message))` - Pass the message on (possibly modified)
/// - `Ok(None)` - Drop/filter the message
/// - `Err(_)` - Processing failed; the chain stops
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Middleware name for identification and logging
    fn name(&self) -> &'static str;

    /// Process a message
    async fn process(&self, msg: Message) -> Result<Option<Message>, PluginError>;
}

/// A middleware chain that processes messages through multiple middleware in order
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create an empty middleware chain
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the chain
    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Process a message through all middleware in order
    ///
    /// Returns `Ok(None)` if any middleware filters the message and the first
    /// error any middleware returns.
    pub async fn process(&self, mut msg: Message) -> Result<Option<Message>, PluginError> {
        for mw in &self.middlewares {
            let id = msg.id;
            let start = std::time::Instant::now();
            match mw.process(msg).await {
                Ok(Some(m)) => {
                    tracing::trace!(
                        id = %id,
                        middleware = mw.name(),
                        us = start.elapsed().as_micros() as u64,
                        "passed"
                    );
                    msg = m;
                }
                Ok(None) => {
                    tracing::debug!(id = %id, middleware = mw.name(), "message filtered");
                    return Ok(None);
                }
                Err(e) => {
                    tracing::debug!(id = %id, middleware = mw.name(), error = %e, "middleware failed");
                    return Err(e);
                }
            }
        }
        Ok(Some(msg))
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Get number of middleware in the chain
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Get names of all middleware in chain order
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|mw| mw.name()).collect()
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform middleware that rewrites messages
///
/// Typically placed after the enricher to derive headers from the ones it
/// wrote (see the crate-level example).
pub struct Transform<F>
where
    F: Fn(Message) -> Message + Send + Sync,
{
    transform_fn: F,
}

impl<F> Transform<F>
where
    F: Fn(Message) -> Message + Send + Sync,
{
    /// Create a transform with the given function
    pub fn new(transform_fn: F) -> Self {
        Self { transform_fn }
    }
}

#[async_trait]
impl<F> Middleware for Transform<F>
where
    F: Fn(Message) -> Message + Send + Sync,
{
    fn name(&self) -> &'static str {
        "transform"
    }

    async fn process(&self, msg: Message) -> Result<Option<Message>, PluginError> {
        Ok(Some((self.transform_fn)(msg)))
    }
}

mod enricher;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use bytes::Bytes;

    /// Passes every message on unchanged
    struct PassThrough;

    #[async_trait]
    impl Middleware for PassThrough {
        fn name(&self) -> &'static str {
            "passthrough"
        }

        async fn process(&self, msg: Message) -> Result<Option<Message>, PluginError> {
            Ok(Some(msg))
        }
    }

    /// Drops every message
    struct DropAll;

    #[async_trait]
    impl Middleware for DropAll {
        fn name(&self) -> &'static str {
            "drop-all"
        }

        async fn process(&self, _msg: Message) -> Result<Option<Message>, PluginError> {
            Ok(None)
        }
    }

    /// Fails every message
    struct Failing;

    #[async_trait]
    impl Middleware for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn process(&self, _msg: Message) -> Result<Option<Message>, PluginError> {
            Err(PluginError::Transform("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_passthrough() {
        let msg = Message::new(Bytes::new());
        let id = msg.id;

        let result = PassThrough.process(msg).await.unwrap();
        assert_eq!(result.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_transform() {
        let transform = Transform::new(|msg: Message| msg.with_header("transformed", "yes"));

        let msg = Message::new(Bytes::new());
        let result = transform.process(msg).await.unwrap().expect("should have message");

        assert_eq!(result.header("transformed").unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let mut chain = MiddlewareChain::new();
        chain.add(Transform::new(|msg: Message| msg.with_header("step1", "done")));
        chain.add(PassThrough);
        chain.add(Transform::new(|msg: Message| msg.with_header("step2", "done")));

        let result = chain
            .process(Message::new(Bytes::new()))
            .await
            .unwrap()
            .expect("should have message");

        assert_eq!(result.header("step1").unwrap(), "done");
        assert_eq!(result.header("step2").unwrap(), "done");
        assert_eq!(chain.names(), vec!["transform", "passthrough", "transform"]);
    }

    #[tokio::test]
    async fn test_middleware_chain_filter() {
        let mut chain = MiddlewareChain::new();
        chain.add(PassThrough);
        chain.add(DropAll);
        chain.add(Transform::new(|msg: Message| msg.with_header("never", "set")));

        let result = chain.process(Message::new(Bytes::new())).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_middleware_chain_error_stops_chain() {
        let mut chain = MiddlewareChain::new();
        chain.add(Failing);
        chain.add(PassThrough);

        let err = chain.process(Message::new(Bytes::new())).await.unwrap_err();
        assert_eq!(err, PluginError::Transform("boom".to_string()));
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = MiddlewareChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);

        let result = chain.process(Message::new(Bytes::new())).await.unwrap();
        assert!(result.is_some());
    }
}
