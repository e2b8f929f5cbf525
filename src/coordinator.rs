//! Keeps a result list in sync with a changing search query.
//!
//! Fetch cycles run as spawned tasks and report back over a channel; results
//! are only ever replaced by the task that owns the coordinator, through
//! [`SearchCoordinator::next_update`] or [`SearchCoordinator::drain_updates`].
//! Every cycle carries a sequence number taken at dispatch, and a completion
//! is applied only when it is newer than every completion seen before it,
//! whether that one brought a page, nothing, or an error.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetcher::FeedSource;
use crate::models::{FeedItemsPage, FeedRecord};

/// What applying one completed fetch cycle did to the results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { seq: u64, count: usize },
    Empty { seq: u64 },
    Stale { seq: u64 },
    Failed { seq: u64 },
}

struct Completion {
    seq: u64,
    query: String,
    result: Result<Option<FeedItemsPage>, FetchError>,
}

pub struct SearchCoordinator<S: FeedSource + 'static> {
    source: Arc<S>,
    query: String,
    results: Arc<Vec<FeedRecord>>,
    last_error: Option<String>,
    next_seq: u64,
    latest_seq: u64,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    publisher: watch::Sender<Arc<Vec<FeedRecord>>>,
}

impl<S: FeedSource + 'static> SearchCoordinator<S> {
    /// Creates a coordinator with an empty query and dispatches the initial fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(source: Arc<S>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let results = Arc::new(Vec::new());
        let (publisher, _) = watch::channel(Arc::clone(&results));

        let mut coordinator = Self {
            source,
            query: String::new(),
            results,
            last_error: None,
            next_seq: 0,
            latest_seq: 0,
            in_flight: 0,
            completions_tx,
            completions_rx,
            publisher,
        };
        coordinator.dispatch();
        coordinator
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[FeedRecord] {
        &self.results
    }

    /// Message of the most recent failed fetch, cleared by the next applied page
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of dispatched background cycles whose completion has not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Receiver that sees every replacement of the results
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<FeedRecord>>> {
        self.publisher.subscribe()
    }

    /// Stores the query and, unless it is empty, dispatches a fetch for it.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        if self.query.is_empty() {
            debug!("empty query, skipping fetch");
            return;
        }
        self.dispatch();
    }

    /// Runs one fetch cycle for the current query on the calling task.
    ///
    /// Returns the records that replaced the results, or `None` when the page
    /// was empty or a newer cycle had already completed.
    pub async fn fetch(&mut self) -> Result<Option<Vec<FeedRecord>>, FetchError> {
        let seq = self.take_seq();
        let query = self.query.clone();
        let page = match self.source.fetch_items(&query).await {
            Ok(page) => page,
            Err(err) => {
                if self.observe(seq) {
                    self.record_failure(seq, &query, &err);
                }
                return Err(err);
            }
        };

        match self.apply(Completion { seq, query, result: Ok(page) }) {
            FetchOutcome::Applied { .. } => Ok(Some(self.results.to_vec())),
            _ => Ok(None),
        }
    }

    /// Waits for the next background cycle to finish and applies it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_update(&mut self) -> Option<FetchOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(completion))
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.in_flight -= 1;
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    fn take_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn dispatch(&mut self) {
        let seq = self.take_seq();
        let query = self.query.clone();
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;

        debug!(seq, query = %query, "dispatching fetch");
        tokio::spawn(async move {
            let handle = tokio::spawn({
                let query = query.clone();
                async move { source.fetch_items(&query).await }
            });
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(FetchError::Task(join_err.to_string())),
            };
            // The coordinator may already be gone; nothing left to update then.
            let _ = tx.send(Completion { seq, query, result });
        });
    }

    fn apply(&mut self, completion: Completion) -> FetchOutcome {
        let Completion { seq, query, result } = completion;
        let newest = self.observe(seq);

        match result {
            Err(err) if newest => {
                self.record_failure(seq, &query, &err);
                FetchOutcome::Failed { seq }
            }
            Err(err) => {
                debug!(seq, latest = self.latest_seq, query = %query, error = %err, "ignoring failure of superseded fetch");
                FetchOutcome::Failed { seq }
            }
            Ok(None) => {
                debug!(seq, query = %query, "feed returned no page");
                FetchOutcome::Empty { seq }
            }
            Ok(Some(_)) if !newest => {
                debug!(seq, latest = self.latest_seq, query = %query, "discarding stale results");
                FetchOutcome::Stale { seq }
            }
            Ok(Some(page)) => {
                let count = page.items.len();
                self.last_error = None;
                self.results = Arc::new(page.items);
                self.publisher.send_replace(Arc::clone(&self.results));
                info!(seq, query = %query, count, "results updated");
                FetchOutcome::Applied { seq, count }
            }
        }
    }

    /// Records a completed cycle; true when it is newer than every earlier completion
    fn observe(&mut self, seq: u64) -> bool {
        if seq <= self.latest_seq {
            return false;
        }
        self.latest_seq = seq;
        true
    }

    fn record_failure(&mut self, seq: u64, query: &str, err: &FetchError) {
        warn!(seq, query, error = %err, "failed to get flickr feed");
        self.last_error = Some(err.to_string());
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
