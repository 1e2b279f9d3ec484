//! Header enricher as pipeline middleware
//!
//! Both a fixed [`HeaderEnricher`] and a swappable [`EnricherHandle`] can sit
//! in a [`MiddlewareChain`](super::MiddlewareChain). Enrichment never filters;
//! failures surface as [`PluginError::Transform`].

use super::Middleware;
use crate::enricher::HeaderEnricher;
use crate::handle::EnricherHandle;
use async_trait::async_trait;
use otsake_core::{Message, PluginError};

const NAME: &str = "xpath-header-enricher";

#[async_trait]
impl Middleware for HeaderEnricher {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn process(&self, msg: Message) -> Result<Option<Message>, PluginError> {
        self.transform(&msg).map(Some).map_err(|e| {
            tracing::warn!(id = %msg.id, error = %e, "header enrichment failed");
            PluginError::from(e)
        })
    }
}

#[async_trait]
impl Middleware for EnricherHandle {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn process(&self, msg: Message) -> Result<Option<Message>, PluginError> {
        let enricher = self.load();
        enricher.process(msg).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::expression::XPathExpression;
    use crate::middleware::{MiddlewareChain, Transform};
    use bytes::Bytes;

    fn enricher() -> HeaderEnricher {
        HeaderEnricher::builder()
            .expression("one", XPathExpression::compile("/root/elementOne").unwrap())
            .build()
    }

    #[tokio::test]
    async fn test_enricher_in_chain() {
        let mut chain = MiddlewareChain::new();
        chain.add(enricher());
        chain.add(Transform::new(|msg: Message| msg.with_header("after", true)));

        let msg = Message::new(Bytes::from("<root><elementOne>1</elementOne></root>"));
        let result = chain.process(msg).await.unwrap().expect("not filtered");

        assert_eq!(result.header("one").unwrap(), "1");
        assert_eq!(*result.header("after").unwrap(), true);
        assert_eq!(chain.names(), vec![NAME, "transform"]);
    }

    #[tokio::test]
    async fn test_parse_failure_is_transform_error() {
        let mut chain = MiddlewareChain::new();
        chain.add(enricher());

        let err = chain
            .process(Message::new(Bytes::from("<root>")))
            .await
            .unwrap_err();

        assert!(matches!(err, PluginError::Transform(_)));
    }

    #[tokio::test]
    async fn test_handle_uses_swapped_enricher() {
        let handle = EnricherHandle::new(enricher());
        let msg = Message::new(Bytes::from("<root><elementTwo>2</elementTwo></root>"));

        let first = handle.process(msg.clone()).await.unwrap().unwrap();
        assert!(!first.has_header("two"));

        handle.swap(
            HeaderEnricher::builder()
                .expression("two", XPathExpression::compile("/root/elementTwo").unwrap())
                .build(),
        );

        let second = handle.process(msg).await.unwrap().unwrap();
        assert_eq!(second.header("two").unwrap(), "2");
    }
}
