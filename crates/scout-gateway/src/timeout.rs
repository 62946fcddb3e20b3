//! Deadline decorator for any gateway.

use futures::future::BoxFuture;
use scout_core::GatewayError;
use std::time::Duration;

use crate::{TenderGateway, TenderPage, TenderQuery};

/// Wraps a gateway so every query fails with [`GatewayError::Timeout`] once
/// `timeout` has elapsed.
pub struct TimeoutGateway<G> {
    inner: G,
    timeout: Duration,
}

impl<G: TenderGateway> TimeoutGateway<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<G: TenderGateway> TenderGateway for TimeoutGateway<G> {
    fn query(&self, query: TenderQuery) -> BoxFuture<'static, Result<TenderPage, GatewayError>> {
        let fut = self.inner.query(query);
        let timeout = self.timeout;

        Box::pin(async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Tender query exceeded {:?}", timeout);
                    Err(GatewayError::Timeout { duration: timeout })
                }
            }
        })
    }
}
