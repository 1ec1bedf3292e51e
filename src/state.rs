//! # Application State
//!
//! Shared by every request handler through `web::Data<AppState>`. Cloning is
//! cheap: all fields are reference-counted.
//!
//! - `config` can be replaced at runtime, so it sits behind an `RwLock` and
//!   handlers take a snapshot with [`AppState::get_config`]
//! - `metrics` is written by the metrics middleware on every request
//! - `provider` is `None` when no API key was configured at startup
//! - `store` backs the keyword and keyterm lists

use crate::config::AppConfig;
use crate::provider::TranscriptionProvider;
use crate::store::{KeyValueStore, KeytermManager, KeywordManager};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<AppConfig>>,
    pub metrics: Arc<RwLock<AppMetrics>>,
    pub provider: Option<Arc<dyn TranscriptionProvider>>,
    pub store: Arc<dyn KeyValueStore>,
    pub start_time: Instant,
}

#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    pub request_count: u64,
    pub error_count: u64,
    /// Audits that produced a score
    pub audits_scored: u64,
    /// Audits rejected or failed before a score was produced
    pub audits_failed: u64,
    /// Key: "METHOD /path"
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        provider: Option<Arc<dyn TranscriptionProvider>>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            provider,
            store,
            start_time: Instant::now(),
        }
    }

    /// Snapshot of the current configuration. The lock is released on return.
    pub fn get_config(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    /// Replace the configuration if the new one validates.
    pub fn update_config(&self, new_config: AppConfig) -> Result<(), String> {
        match new_config.validate() {
            Ok(_) => {
                *self.config.write().unwrap() = new_config;
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn keywords(&self) -> KeywordManager {
        KeywordManager::new(self.store.clone())
    }

    pub fn keyterms(&self) -> KeytermManager {
        KeytermManager::new(self.store.clone())
    }

    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    /// Count the outcome of one audit request.
    pub fn record_audit(&self, scored: bool) {
        let mut metrics = self.metrics.write().unwrap();
        if scored {
            metrics.audits_scored += 1;
        } else {
            metrics.audits_failed += 1;
        }
    }

    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();

        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();
        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;

        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Copy of the metrics, so serialization doesn't hold the lock.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.metrics.read().unwrap().clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that failed, 0.0 to 1.0.
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), None, Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn test_endpoint_metrics_accumulate() {
        let state = state();
        state.record_endpoint_request("POST /api/v1/audit/text", 10, false);
        state.record_endpoint_request("POST /api/v1/audit/text", 30, true);

        let snapshot = state.get_metrics_snapshot();
        let metric = &snapshot.endpoint_metrics["POST /api/v1/audit/text"];
        assert_eq!(metric.request_count, 2);
        assert_eq!(metric.average_duration_ms(), 20.0);
        assert_eq!(metric.error_rate(), 0.5);
    }

    #[test]
    fn test_record_audit_outcomes() {
        let state = state();
        state.record_audit(true);
        state.record_audit(true);
        state.record_audit(false);

        let snapshot = state.get_metrics_snapshot();
        assert_eq!(snapshot.audits_scored, 2);
        assert_eq!(snapshot.audits_failed, 1);
    }

    #[test]
    fn test_update_config_rejects_invalid() {
        let state = state();
        let mut config = state.get_config();
        config.audit.max_words = 0;
        assert!(state.update_config(config).is_err());
        assert_eq!(state.get_config().audit.max_words, 20_000);
    }

    #[test]
    fn test_empty_endpoint_metric() {
        let metric = EndpointMetric::default();
        assert_eq!(metric.average_duration_ms(), 0.0);
        assert_eq!(metric.error_rate(), 0.0);
    }
}
