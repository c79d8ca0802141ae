// Dashboard fetch controller - polling, manual refresh and ordering of results
use crate::application::analytics_api::{AnalyticsApi, FetchError};
use crate::application::fetch_state::FetchState;
use crate::application::retry::RetryPolicy;
use crate::domain::dashboard::DashboardSnapshot;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type DashboardState = FetchState<DashboardSnapshot>;

/// Timing knobs of the fetch lifecycle
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub stale_after: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
            stale_after: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

/// Owns the live dashboard snapshot.
///
/// Consumers read through [`DashboardController::subscribe`]; only fetch
/// completions mutate the state.
pub struct DashboardController {
    api: Arc<dyn AnalyticsApi>,
    policy: FetchPolicy,
    next_seq: AtomicU64,
    state: watch::Sender<DashboardState>,
}

impl DashboardController {
    pub fn new(api: Arc<dyn AnalyticsApi>, policy: FetchPolicy) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            api,
            policy,
            next_seq: AtomicU64::new(0),
            state,
        }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Fetch now, retrying per policy. The result is applied only if no
    /// later-issued fetch has already landed.
    pub async fn refresh(&self) -> Result<Arc<DashboardSnapshot>, FetchError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.begin());
        tracing::debug!("Dashboard fetch #{} started", seq);

        let result = self
            .policy
            .retry
            .execute(|| self.api.get_dashboard_data())
            .await;

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let mut applied = false;
                self.state.send_modify(|s| {
                    applied = s.apply_success(seq, snapshot.clone(), Utc::now());
                });
                if applied {
                    tracing::debug!("Dashboard fetch #{} applied", seq);
                } else {
                    tracing::debug!("Dashboard fetch #{} discarded, newer data already shown", seq);
                }
                Ok(snapshot)
            }
            Err(e) => {
                let mut applied = false;
                self.state.send_modify(|s| {
                    applied = s.apply_failure(seq, e.clone());
                });
                if applied {
                    tracing::error!("Dashboard fetch #{} failed: {}", seq, e);
                } else {
                    tracing::debug!("Dashboard fetch #{} failed after newer data landed: {}", seq, e);
                }
                Err(e)
            }
        }
    }

    /// Background refresh loop. The first tick fires immediately.
    pub fn spawn_polling(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(controller.policy.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = controller.refresh().await {
                    tracing::warn!("Scheduled dashboard refresh failed: {}", e);
                }
            }
        })
    }
}
