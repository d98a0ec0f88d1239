//! Usage events posted to an optional remote endpoint.
//!
//! Delivery is best effort. [`UsageTracker::track`] never blocks the caller
//! and never reports failure; problems are only logged. Short-lived
//! processes call [`UsageTracker::flush`] before exiting so queued events
//! are not cut off.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TallyError};

/// Where and how usage events are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Endpoint receiving JSON POSTs. No endpoint disables tracking.
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Sent as `user_info` on every event.
    pub user_info: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 3000,
            user_info: "anonymous".to_string(),
        }
    }
}

/// One usage notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub event: String,
    pub page: String,
    pub user_info: String,
    pub notes: String,
}

impl UsageEvent {
    pub fn new(event: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            page: page.into(),
            user_info: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_user_info(mut self, user_info: impl Into<String>) -> Self {
        self.user_info = user_info.into();
        self
    }
}

/// Posts [`UsageEvent`]s to the configured endpoint.
///
/// Clones share one queue of in-flight sends.
#[derive(Debug, Clone)]
pub struct UsageTracker {
    config: TelemetryConfig,
    client: Option<Client>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl UsageTracker {
    pub fn new(config: TelemetryConfig) -> Self {
        let client = match &config.endpoint {
            None => None,
            Some(_) => match Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
            {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "Failed to create telemetry client, tracking disabled");
                    None
                }
            },
        };
        Self {
            config,
            client,
            pending: Arc::default(),
        }
    }

    /// A tracker that never sends anything.
    pub fn disabled() -> Self {
        Self::new(TelemetryConfig::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Send an event in the background.
    ///
    /// Returns whether the event was queued; false when tracking is disabled.
    pub fn track(&self, event: UsageEvent) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let tracker = self.clone();
        let handle = std::thread::spawn(move || {
            if let Err(e) = tracker.send(&event) {
                warn!(event = %event.event, error = %e, "Usage event not delivered");
            }
        });

        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
        true
    }

    /// Wait for every queued event to be sent or to fail.
    ///
    /// Sends run concurrently and each is bounded by the request timeout.
    pub fn flush(&self) {
        let handles: Vec<_> = self.lock_pending().drain(..).collect();
        if !handles.is_empty() {
            debug!(count = handles.len(), "Flushing usage events");
        }
        for handle in handles {
            if handle.join().is_err() {
                warn!("Usage event sender panicked");
            }
        }
    }

    /// Number of sends queued and not yet flushed.
    pub fn pending(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        // Only handles live here, so a poisoned queue is still usable.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Send an event and wait for the response.
    pub fn send(&self, event: &UsageEvent) -> Result<()> {
        let (Some(client), Some(endpoint)) = (&self.client, &self.config.endpoint) else {
            return Ok(());
        };

        let mut event = event.clone();
        if event.user_info.is_empty() {
            event.user_info = self.config.user_info.clone();
        }

        let response = client
            .post(endpoint)
            .json(&event)
            .send()
            .map_err(|e| TallyError::Telemetry(format!("request to {} failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            return Err(TallyError::Telemetry(format!(
                "endpoint responded with {}",
                response.status()
            )));
        }

        debug!(event = %event.event, page = %event.page, "Usage event delivered");
        Ok(())
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::disabled()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Collector;
    use super::*;

    #[test]
    fn test_disabled_tracker_is_noop() {
        let tracker = UsageTracker::disabled();
        assert!(!tracker.is_enabled());
        assert!(!tracker.track(UsageEvent::new("File Uploaded", "Data Upload")));
        assert_eq!(tracker.pending(), 0);
        tracker.flush();
        assert!(tracker.send(&UsageEvent::new("File Uploaded", "Data Upload")).is_ok());
    }

    #[test]
    fn test_unreachable_endpoint_reports_error() {
        let tracker = UsageTracker::new(TelemetryConfig {
            endpoint: Some("http://127.0.0.1:9/log".to_string()),
            timeout_ms: 500,
            ..Default::default()
        });
        assert!(tracker.is_enabled());

        let event = UsageEvent::new("Formula Evaluated", "KPI Dashboard").with_notes("sum(a)");
        assert!(matches!(tracker.send(&event), Err(TallyError::Telemetry(_))));

        // The background variant swallows the same failure.
        assert!(tracker.track(event));
        tracker.flush();
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_flush_delivers_queued_events() {
        let collector = Collector::start(2);
        let tracker = UsageTracker::new(TelemetryConfig {
            endpoint: Some(collector.endpoint.clone()),
            ..Default::default()
        });

        // Clones share the queue, so flushing the original covers both.
        let clone = tracker.clone();
        assert!(tracker.track(UsageEvent::new("File Uploaded", "Data Upload")));
        assert!(clone.track(UsageEvent::new("Custom Formula", "KPI Dashboard").with_notes("sum(a)")));
        tracker.flush();
        assert_eq!(clone.pending(), 0);

        let mut events = collector.received();
        events.sort_by(|a, b| a.event.cmp(&b.event));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "Custom Formula");
        assert_eq!(events[0].notes, "sum(a)");
        assert_eq!(events[0].user_info, "anonymous");
        assert_eq!(events[1].event, "File Uploaded");
    }

    #[test]
    fn test_event_wire_format() {
        let event = UsageEvent::new("Chart Built", "Chart Generator").with_user_info("tester");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "Chart Built",
                "page": "Chart Generator",
                "user_info": "tester",
                "notes": "",
            })
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: TelemetryConfig = serde_json::from_str(r#"{"endpoint": "http://x"}"#).unwrap();
        assert_eq!(config.timeout_ms, 3000);
        assert_eq!(config.endpoint.as_deref(), Some("http://x"));
    }
}
