// Fetch lifecycle state shared with display consumers
use crate::application::analytics_api::FetchError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Loading/error/data view of one remote resource.
///
/// Every fetch is tagged with a sequence number when it is issued.
/// Completions tagged at or below the applied sequence are discarded, so the
/// state never regresses to an older payload.
#[derive(Debug)]
pub struct FetchState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
    pub last_updated: Option<DateTime<Utc>>,
    pub in_flight: usize,
    pub applied_seq: u64,
    error_seq: u64,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            last_updated: None,
            in_flight: 0,
            applied_seq: 0,
            error_seq: 0,
        }
    }
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            last_updated: self.last_updated,
            in_flight: self.in_flight,
            applied_seq: self.applied_seq,
            error_seq: self.error_seq,
        }
    }
}

impl<T> FetchState<T> {
    /// Start a cached view with data that is already known
    pub fn with_cached(data: Arc<T>, last_updated: DateTime<Utc>) -> Self {
        Self {
            data: Some(data),
            last_updated: Some(last_updated),
            ..Self::default()
        }
    }

    /// First load: nothing to show yet and a request is out
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.in_flight > 0
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    /// Data older than `stale_after` (or never fetched) is stale; it stays visible
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        match self.last_updated {
            None => true,
            Some(at) => (now - at)
                .to_std()
                .map(|age| age >= stale_after)
                .unwrap_or(false),
        }
    }

    pub fn begin(&mut self) {
        self.in_flight += 1;
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Returns false when the payload was older than what is already applied
    pub fn apply_success(&mut self, seq: u64, data: Arc<T>, at: DateTime<Utc>) -> bool {
        self.finish();
        if seq <= self.applied_seq {
            return false;
        }
        self.data = Some(data);
        self.last_updated = Some(at);
        self.applied_seq = seq;
        if seq > self.error_seq {
            self.error = None;
        }
        true
    }

    /// Records the error unless a newer fetch has already landed.
    /// The previous data is kept.
    pub fn apply_failure(&mut self, seq: u64, error: FetchError) -> bool {
        self.finish();
        if seq <= self.applied_seq || seq <= self.error_seq {
            return false;
        }
        self.error = Some(error);
        self.error_seq = seq;
        true
    }
}
