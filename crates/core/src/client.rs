//! Analytics client boundary: the write-only sink every canonical call is
//! forwarded to.
//!
//! Modules accept an `Arc<dyn AnalyticsClient>`. Delivery, batching and retry
//! are the implementation's business; callers never look at the outcome.

use std::sync::{Arc, Mutex};

use crate::types::{CanonicalCall, Properties};

/// Two-method tracking contract: `identify(userId, traits)` and
/// `track(eventName, properties)`.
pub trait AnalyticsClient: Send + Sync {
    fn identify(&self, user_id: &str, traits: &Properties);
    fn track(&self, event: &str, properties: &Properties);
}

/// No-op client for hosts that have not wired a tracker yet.
pub struct NoOpClient;

impl AnalyticsClient for NoOpClient {
    fn identify(&self, _user_id: &str, _traits: &Properties) {}
    fn track(&self, _event: &str, _properties: &Properties) {}
}

/// In-memory client that captures calls for testing.
#[derive(Default)]
pub struct CaptureClient {
    calls: Mutex<Vec<CanonicalCall>>,
}

impl CaptureClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CanonicalCall> {
        self.calls.lock().expect("capture client mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().expect("capture client mutex poisoned").len()
    }

    /// Number of track calls with the given event label.
    pub fn count_event(&self, event: &str) -> usize {
        self.calls
            .lock()
            .expect("capture client mutex poisoned")
            .iter()
            .filter(|c| matches!(c, CanonicalCall::Track { event: e, .. } if e == event))
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("capture client mutex poisoned").clear();
    }
}

impl AnalyticsClient for CaptureClient {
    fn identify(&self, user_id: &str, traits: &Properties) {
        self.calls
            .lock()
            .expect("capture client mutex poisoned")
            .push(CanonicalCall::Identify {
                user_id: user_id.to_string(),
                traits: traits.clone(),
            });
    }

    fn track(&self, event: &str, properties: &Properties) {
        self.calls
            .lock()
            .expect("capture client mutex poisoned")
            .push(CanonicalCall::Track {
                event: event.to_string(),
                properties: properties.clone(),
            });
    }
}

/// Convenience: a client that drops every call.
pub fn noop_client() -> Arc<dyn AnalyticsClient> {
    Arc::new(NoOpClient)
}

/// Convenience: create a capture client for tests.
pub fn capture_client() -> Arc<CaptureClient> {
    Arc::new(CaptureClient::new())
}
