//! In-memory tender source.
//!
//! Behaves like the remote query endpoint over a fixed corpus: filters by
//! industry, province and search text, then slices out the requested page.
//! Used by the CLI with a JSON corpus and by tests, which can also inject
//! latency and failures.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use scout_core::{GatewayError, Tender};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{TenderGateway, TenderPage, TenderQuery};

/// Tender source backed by a fixed list of tenders.
#[derive(Clone)]
pub struct FixtureGateway {
    corpus: Arc<Vec<Tender>>,
    delay: Duration,
    pending_failures: Arc<Mutex<Vec<GatewayError>>>,
    calls: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<TenderQuery>>>,
}

impl FixtureGateway {
    /// Create a gateway over `corpus`. Corpus order is the result order.
    pub fn new(corpus: Vec<Tender>) -> Self {
        Self {
            corpus: Arc::new(corpus),
            delay: Duration::ZERO,
            pending_failures: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(None)),
        }
    }

    /// Parse a JSON array of tenders.
    pub fn from_json(json: &str) -> Result<Self, GatewayError> {
        let corpus: Vec<Tender> =
            serde_json::from_str(json).map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(Self::new(corpus))
    }

    /// Load a JSON array of tenders from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, GatewayError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Transport(format!("{}: {}", path.display(), e)))?;
        let gateway = Self::from_json(&json)?;
        tracing::debug!("Loaded {} fixture tenders from {:?}", gateway.len(), path);
        Ok(gateway)
    }

    /// Delay every response by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the next call fail with `error`. Queued failures are consumed in order.
    pub fn fail_next(&self, error: GatewayError) {
        self.pending_failures.lock().push(error);
    }

    /// Number of queries received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent query received.
    pub fn last_query(&self) -> Option<TenderQuery> {
        self.last_query.lock().clone()
    }

    /// Number of tenders in the corpus.
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Run `query` against the corpus synchronously.
    pub fn run(&self, query: &TenderQuery) -> TenderPage {
        let matching: Vec<&Tender> = self.corpus.iter().filter(|t| query.matches(t)).collect();
        let total_count = matching.len() as u64;
        let tenders = matching
            .into_iter()
            .skip(query.offset())
            .take(query.page_size as usize)
            .cloned()
            .collect();
        TenderPage::new(tenders, total_count)
    }
}

impl TenderGateway for FixtureGateway {
    fn query(&self, query: TenderQuery) -> BoxFuture<'static, Result<TenderPage, GatewayError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = Some(query.clone());

        let failure = {
            let mut pending = self.pending_failures.lock();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        };
        let this = self.clone();
        let delay = self.delay;

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match failure {
                Some(error) => Err(error),
                None => Ok(this.run(&query)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use scout_core::{FilterCriteria, IndustryCategory, Province, ProvinceFilter};
    use std::collections::BTreeSet;

    fn corpus(n: usize) -> Vec<Tender> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let industry = if i % 2 == 0 {
                    IndustryCategory::Construction
                } else {
                    IndustryCategory::Energy
                };
                Tender::new(
                    format!("T-{i}"),
                    format!("Tender {i}"),
                    industry,
                    base + ChronoDuration::hours(i as i64),
                )
                .with_province(if i < 5 { Province::Gp } else { Province::Kzn })
            })
            .collect()
    }

    fn query(criteria: &FilterCriteria) -> TenderQuery {
        TenderQuery::from_criteria(criteria, 20)
    }

    #[tokio::test]
    async fn test_paging() {
        let gateway = FixtureGateway::new(corpus(45));

        let mut criteria = FilterCriteria::default();
        let first = gateway.query(query(&criteria)).await.unwrap();
        assert_eq!(first.total_count, 45);
        assert_eq!(first.tenders.len(), 20);
        assert_eq!(first.tenders[0].id.as_ref(), "T-0");

        criteria.set_page(3);
        let last = gateway.query(query(&criteria)).await.unwrap();
        assert_eq!(last.tenders.len(), 5);
        assert_eq!(last.tenders[0].id.as_ref(), "T-40");

        criteria.set_page(4);
        let beyond = gateway.query(query(&criteria)).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total_count, 45);
    }

    #[tokio::test]
    async fn test_filters_compose() {
        let gateway = FixtureGateway::new(corpus(10));

        let mut criteria = FilterCriteria::default();
        criteria.set_industries(BTreeSet::from([IndustryCategory::Energy]));
        criteria.set_province(ProvinceFilter::Only(Province::Gp));

        let page = gateway.query(query(&criteria)).await.unwrap();
        let ids: Vec<_> = page.tenders.iter().map(|t| t.id.as_ref()).collect();
        assert_eq!(ids, vec!["T-1", "T-3"]);
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn test_search_is_substring() {
        let gateway = FixtureGateway::new(corpus(12));

        let mut criteria = FilterCriteria::default();
        criteria.set_search("tender 1");

        let page = gateway.query(query(&criteria)).await.unwrap();
        let ids: Vec<_> = page.tenders.iter().map(|t| t.id.as_ref()).collect();
        assert_eq!(ids, vec!["T-1", "T-10", "T-11"]);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let gateway = FixtureGateway::new(corpus(3));
        gateway.fail_next(GatewayError::Transport("connection reset".into()));

        let criteria = FilterCriteria::default();
        let err = gateway.query(query(&criteria)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));

        let page = gateway.query(query(&criteria)).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_with_delay() {
        let gateway = FixtureGateway::new(corpus(1)).with_delay(Duration::from_millis(10));

        let start = std::time::Instant::now();
        let _ = gateway.query(query(&FilterCriteria::default())).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenders.json");
        std::fs::write(&path, serde_json::to_string(&corpus(4)).unwrap()).unwrap();

        let gateway = FixtureGateway::from_json_file(&path).unwrap();
        assert_eq!(gateway.len(), 4);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = FixtureGateway::from_json("{ not tenders }").err().unwrap();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
