// Brand drill-down - on-demand metrics for the selected brand
use crate::application::analytics_api::{AnalyticsApi, FetchError};
use crate::application::fetch_state::FetchState;
use crate::application::retry::RetryPolicy;
use crate::domain::brand::{BrandMetrics, DetailedBrandAnalysis};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
pub struct BrandSelection {
    pub brand: Option<String>,
    pub state: FetchState<BrandMetrics>,
    seq: u64,
}

#[derive(Debug, Clone)]
struct CachedMetrics {
    metrics: Arc<BrandMetrics>,
    fetched_at: DateTime<Utc>,
    seq: u64,
}

/// Tracks the brand the user is drilling into. Brand data is fetched on
/// selection only, and a later selection always supersedes an earlier one.
pub struct BrandController {
    api: Arc<dyn AnalyticsApi>,
    retry: RetryPolicy,
    next_seq: AtomicU64,
    selection: watch::Sender<BrandSelection>,
    cache: Mutex<HashMap<String, CachedMetrics>>,
}

impl BrandController {
    pub fn new(api: Arc<dyn AnalyticsApi>, retry: RetryPolicy) -> Self {
        let (selection, _) = watch::channel(BrandSelection::default());
        Self {
            api,
            retry,
            next_seq: AtomicU64::new(0),
            selection,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn current(&self) -> BrandSelection {
        self.selection.borrow().clone()
    }

    /// Last metrics fetched for `brand`, if any
    pub fn cached(&self, brand: &str) -> Option<Arc<BrandMetrics>> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(brand).map(|entry| entry.metrics.clone()))
    }

    /// Select `brand` and fetch its metrics. Previously fetched metrics for
    /// the same brand stay visible while the request is out.
    pub async fn select_brand(&self, brand: &str) -> Result<Arc<BrandMetrics>, FetchError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let cached = self
            .cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(brand).cloned());

        self.selection.send_modify(|s| {
            s.brand = Some(brand.to_string());
            s.seq = seq;
            s.state = match cached {
                Some(entry) => FetchState::with_cached(entry.metrics, entry.fetched_at),
                None => FetchState::default(),
            };
            s.state.begin();
        });
        tracing::debug!("Fetching metrics for brand {}", brand);

        let result = self
            .retry
            .execute(|| self.api.get_brand_metrics(brand))
            .await;

        match result {
            Ok(metrics) => {
                let metrics = Arc::new(metrics);
                let now = Utc::now();
                self.remember(brand, seq, metrics.clone(), now);
                self.selection.send_if_modified(|s| {
                    if s.seq != seq {
                        return false;
                    }
                    s.state.apply_success(seq, metrics.clone(), now)
                });
                Ok(metrics)
            }
            Err(e) => {
                tracing::error!("Failed to fetch brand metrics for {}: {}", brand, e);
                self.selection.send_if_modified(|s| {
                    if s.seq != seq {
                        return false;
                    }
                    s.state.apply_failure(seq, e.clone())
                });
                Err(e)
            }
        }
    }

    /// Cache `metrics` unless a later-issued fetch of the same brand is already cached
    fn remember(
        &self,
        brand: &str,
        seq: u64,
        metrics: Arc<BrandMetrics>,
        fetched_at: DateTime<Utc>,
    ) {
        let Ok(mut cache) = self.cache.lock() else {
            return;
        };
        if cache.get(brand).is_some_and(|entry| entry.seq > seq) {
            tracing::debug!("Keeping newer cached metrics for brand {}", brand);
            return;
        }
        cache.insert(
            brand.to_string(),
            CachedMetrics {
                metrics,
                fetched_at,
                seq,
            },
        );
    }

    /// Back to the overview; in-flight brand fetches no longer apply
    pub fn clear_selection(&self) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.selection.send_modify(|s| {
            s.brand = None;
            s.seq = seq;
            s.state = FetchState::default();
        });
    }

    pub async fn detailed_analysis(&self, brand: &str) -> Result<DetailedBrandAnalysis, FetchError> {
        tracing::debug!("Fetching detailed analysis for brand {}", brand);
        self.retry
            .execute(|| self.api.get_detailed_brand_analysis(brand))
            .await
    }
}
