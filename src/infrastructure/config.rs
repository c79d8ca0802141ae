use crate::application::dashboard_controller::FetchPolicy;
use crate::application::retry::RetryPolicy;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub server: ServerSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Absolute URL, or a path resolved against `origin`
    pub base_url: String,
    pub origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

/// Fetch timings; durations in milliseconds
#[derive(Debug, Deserialize, Clone)]
pub struct FetchSettings {
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub stale_after_ms: u64,
    pub max_retries: u32,
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl FetchSettings {
    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            stale_after: Duration::from_millis(self.stale_after_ms),
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_initial_delay_ms),
                Duration::from_millis(self.retry_max_delay_ms),
            ),
        }
    }
}

impl ApiSettings {
    /// Base URL the HTTP client sends requests to, without a trailing slash
    pub fn resolved_base_url(&self) -> String {
        let base = self.base_url.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            return base.trim_end_matches('/').to_string();
        }

        let origin = self.origin.trim().trim_end_matches('/');
        let path = base.trim_matches('/');
        if path.is_empty() {
            origin.to_string()
        } else {
            format!("{}/{}", origin, path)
        }
    }
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let fetch = FetchPolicy::default();
    Ok(config::Config::builder()
        .set_default("api.base_url", "/api")?
        .set_default("api.origin", "http://localhost:8000")?
        .set_default("server.listen_addr", "0.0.0.0:8080")?
        .set_default("fetch.request_timeout_ms", millis(fetch.request_timeout))?
        .set_default("fetch.poll_interval_ms", millis(fetch.poll_interval))?
        .set_default("fetch.stale_after_ms", millis(fetch.stale_after))?
        .set_default("fetch.max_retries", i64::from(fetch.retry.max_retries()))?
        .set_default("fetch.retry_initial_delay_ms", millis(fetch.retry.initial_delay()))?
        .set_default("fetch.retry_max_delay_ms", millis(fetch.retry.max_delay()))?)
}

/// Defaults, then `config/dashboard.*` if present, then the environment
/// (`API_BASE_URL`, `API_ORIGIN`, `LISTEN_ADDR`). Fetch timings come from
/// the `[fetch]` table only.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .set_override_option("api.base_url", std::env::var("API_BASE_URL").ok())?
        .set_override_option("api.origin", std::env::var("API_ORIGIN").ok())?
        .set_override_option("server.listen_addr", std::env::var("LISTEN_ADDR").ok())?
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> ApiSettings {
        ApiSettings {
            base_url: base_url.to_string(),
            origin: "http://localhost:8000/".to_string(),
        }
    }

    #[test]
    fn test_relative_base_url_uses_origin() {
        assert_eq!(api("/api").resolved_base_url(), "http://localhost:8000/api");
        assert_eq!(api("api/v2/").resolved_base_url(), "http://localhost:8000/api/v2");
        assert_eq!(api("/").resolved_base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_absolute_base_url_is_kept() {
        assert_eq!(
            api("https://analytics.example.com/api/").resolved_base_url(),
            "https://analytics.example.com/api"
        );
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = builder().unwrap().build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.api.base_url, "/api");
        assert_eq!(config.api.resolved_base_url(), "http://localhost:8000/api");
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");

        let policy = config.fetch.policy();
        assert_eq!(policy.request_timeout, Duration::from_secs(10));
        assert_eq!(policy.poll_interval, Duration::from_secs(30));
        assert_eq!(policy.stale_after, Duration::from_secs(15));
        assert_eq!(policy.retry.max_retries(), 3);
        assert_eq!(policy.retry.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.retry.delay_for(10), Duration::from_secs(30));
    }

    #[test]
    fn test_fetch_overrides_from_file() {
        let config: AppConfig = builder()
            .unwrap()
            .add_source(config::File::from_str(
                "[fetch]\npoll_interval_ms = 5000\nmax_retries = 0\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let policy = config.fetch.policy();
        assert_eq!(policy.poll_interval, Duration::from_secs(5));
        assert_eq!(policy.retry.max_retries(), 0);
        assert_eq!(policy.request_timeout, Duration::from_secs(10));
    }
}
