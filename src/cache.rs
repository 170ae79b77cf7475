//! A time-limited, explicitly invalidated snapshot of the ledger spreadsheet.

use crate::api::Gateway;
use crate::model::Dataset;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, trace};

/// Holds the last successfully fetched `Dataset` for up to `ttl`.
///
/// `load` returns the held snapshot while it is fresh and refetches otherwise. `invalidate` makes
/// the next `load` refetch regardless of age; it is called after every successful write. Failed
/// fetches are never held, so the next `load` after a failure tries again.
#[derive(Debug)]
pub struct DatasetCache {
    ttl: Duration,
    snapshot: Option<Snapshot>,
    last_load_failed: bool,
}

#[derive(Debug)]
struct Snapshot {
    fetched_at: Instant,
    dataset: Arc<Dataset>,
}

impl DatasetCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: None,
            last_load_failed: false,
        }
    }

    /// Returns the cached `Dataset`, fetching it through `gateway` when there is no fresh snapshot.
    ///
    /// This never fails. If the fetch fails the error is logged and an empty `Dataset` is returned,
    /// so that readers always have well-typed (if empty) tables to work with.
    pub(crate) async fn load(&mut self, gateway: &mut Gateway) -> Arc<Dataset> {
        if let Some(snapshot) = self.fresh() {
            trace!("Dataset cache hit");
            return snapshot.dataset.clone();
        }

        debug!("Dataset cache miss, fetching the spreadsheet");
        match gateway.fetch_dataset().await {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.snapshot = Some(Snapshot {
                    fetched_at: Instant::now(),
                    dataset: dataset.clone(),
                });
                self.last_load_failed = false;
                dataset
            }
            Err(e) => {
                error!(
                    "Unable to load the spreadsheet, check that it is shared with the service \
                    account and that both tabs exist with the expected headers: {e:#}"
                );
                self.snapshot = None;
                self.last_load_failed = true;
                Arc::new(Dataset::default())
            }
        }
    }

    /// Forces the next `load` to fetch.
    pub fn invalidate(&mut self) {
        trace!("Dataset cache invalidated");
        self.snapshot = None;
    }

    /// True when a snapshot is held and younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        self.fresh().is_some()
    }

    /// True when the most recent fetch failed, meaning the last `load` returned empty tables.
    pub fn last_load_failed(&self) -> bool {
        self.last_load_failed
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn fresh(&self) -> Option<&Snapshot> {
        self.snapshot
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.ttl)
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
