//! Pixel listener: the inbound boundary. Decodes delivered messages, hands
//! them to the [`Dispatcher`], and keeps per-event outcome counters.
//!
//! Registration is gated on a capability check supplied by the host: without
//! a DOM-like execution context no listener exists and nothing is dispatched.

use std::sync::Arc;

use dashmap::DashMap;
use pixel_core::config::HostConfig;
use pixel_core::{AnalyticsClient, PixelResult};
use serde_json::Value;
use tracing::{info, warn};

use crate::dispatcher::{Dispatch, Dispatcher};
use crate::events::PixelMessage;

/// Capabilities of the embedding host.
pub trait HostEnvironment {
    /// Whether a DOM-like execution context is available.
    fn can_use_dom(&self) -> bool;
}

/// Host whose capabilities are fixed up front (from config or the CLI).
#[derive(Debug, Clone, Copy)]
pub struct StaticHost {
    pub can_use_dom: bool,
}

impl HostEnvironment for StaticHost {
    fn can_use_dom(&self) -> bool {
        self.can_use_dom
    }
}

impl From<&HostConfig> for StaticHost {
    fn from(config: &HostConfig) -> Self {
        Self {
            can_use_dom: config.can_use_dom,
        }
    }
}

/// Outcome counters for one discriminant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    pub event_name: String,
    pub forwarded: u64,
    pub ignored: u64,
    pub failed: u64,
}

impl EventStats {
    pub fn total(&self) -> u64 {
        self.forwarded + self.ignored + self.failed
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Forwarded,
    Ignored,
    Failed,
}

/// Stats key for messages that carry no `data.eventName` string.
pub const MISSING_EVENT_NAME: &str = "<missing>";

/// Registered message listener.
pub struct PixelListener {
    dispatcher: Dispatcher,
    stats: DashMap<String, EventStats>,
}

impl PixelListener {
    /// Register a listener if the host can run one.
    pub fn register(host: &dyn HostEnvironment, client: Arc<dyn AnalyticsClient>) -> Option<Self> {
        if !host.can_use_dom() {
            info!("no DOM-like context available, pixel listener disabled");
            return None;
        }
        info!("pixel listener registered");
        Some(Self {
            dispatcher: Dispatcher::new(client),
            stats: DashMap::new(),
        })
    }

    /// Handle one delivered message in its JSON text form.
    pub fn on_message(&self, raw: &str) -> PixelResult<Dispatch> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.on_value(value),
            Err(e) => {
                self.record(MISSING_EVENT_NAME, Outcome::Failed);
                warn!(error = %e, "pixel message is not valid JSON");
                Err(e.into())
            }
        }
    }

    /// Handle one delivered message.
    pub fn on_value(&self, value: Value) -> PixelResult<Dispatch> {
        let event_name = value
            .pointer("/data/eventName")
            .and_then(Value::as_str)
            .unwrap_or(MISSING_EVENT_NAME)
            .to_string();

        let message: PixelMessage = match serde_json::from_value(value) {
            Ok(message) => message,
            Err(e) => {
                self.record(&event_name, Outcome::Failed);
                warn!(event_name = %event_name, error = %e, "pixel message could not be decoded");
                return Err(e.into());
            }
        };

        match self.dispatcher.handle(&message.data) {
            Ok(dispatch) => {
                let outcome = match dispatch {
                    Dispatch::Forwarded(_) => Outcome::Forwarded,
                    Dispatch::Ignored(_) => Outcome::Ignored,
                };
                self.record(&event_name, outcome);
                Ok(dispatch)
            }
            Err(e) => {
                self.record(&event_name, Outcome::Failed);
                warn!(event_name = %event_name, error = %e, "pixel event violates payload contract");
                Err(e.into())
            }
        }
    }

    fn record(&self, event_name: &str, outcome: Outcome) {
        let mut stats = self
            .stats
            .entry(event_name.to_string())
            .or_insert_with(|| EventStats {
                event_name: event_name.to_string(),
                ..Default::default()
            });
        match outcome {
            Outcome::Forwarded => {
                stats.forwarded += 1;
                metrics::counter!("pixel.forwarded", "event" => event_name.to_string()).increment(1);
            }
            Outcome::Ignored => {
                stats.ignored += 1;
                metrics::counter!("pixel.ignored", "event" => event_name.to_string()).increment(1);
            }
            Outcome::Failed => {
                stats.failed += 1;
                metrics::counter!("pixel.failed", "event" => event_name.to_string()).increment(1);
            }
        }
    }

    /// Counters for one discriminant.
    pub fn stats(&self, event_name: &str) -> Option<EventStats> {
        self.stats.get(event_name).map(|s| s.clone())
    }

    /// Counters for every discriminant seen so far, sorted by name.
    pub fn all_stats(&self) -> Vec<EventStats> {
        let mut all: Vec<EventStats> = self
            .stats
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.event_name.cmp(&b.event_name));
        all
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dispatcher::IgnoreReason;
    use pixel_core::client::capture_client;
    use pixel_core::PixelError;
    use serde_json::json;

    const DOM: StaticHost = StaticHost { can_use_dom: true };

    #[test]
    fn test_not_registered_without_dom() {
        let client = capture_client();
        let listener = PixelListener::register(&StaticHost { can_use_dom: false }, client.clone());
        assert!(listener.is_none());
        assert_eq!(client.count(), 0);
    }

    #[test]
    fn test_host_from_config() {
        let host = StaticHost::from(&HostConfig { can_use_dom: false });
        assert!(!host.can_use_dom());
    }

    #[test]
    fn test_on_message_dispatches() {
        let client = capture_client();
        let listener = PixelListener::register(&DOM, client.clone()).unwrap();

        let outcome = listener
            .on_message(r#"{"data":{"eventName":"vtex:pageView","pageTitle":"Home"}}"#)
            .unwrap();
        assert!(matches!(outcome, Dispatch::Forwarded(_)));
        assert_eq!(client.count_event("Page Viewed"), 1);
    }

    #[test]
    fn test_stats_per_event() {
        let client = capture_client();
        let listener = PixelListener::register(&DOM, client.clone()).unwrap();

        listener
            .on_value(json!({ "data": { "eventName": "vtex:pageView" } }))
            .unwrap();
        listener
            .on_value(json!({ "data": { "eventName": "vtex:pageView" } }))
            .unwrap();
        let ignored = listener
            .on_value(json!({ "data": { "eventName": "vtex:unknownEvent" } }))
            .unwrap();
        assert_eq!(ignored, Dispatch::Ignored(IgnoreReason::UnknownEvent));
        let failed = listener.on_value(json!({ "data": { "eventName": "vtex:addToCart", "items": [] } }));
        assert!(matches!(failed, Err(PixelError::Normalize(_))));

        assert_eq!(
            listener.stats("vtex:pageView").unwrap(),
            EventStats {
                event_name: "vtex:pageView".into(),
                forwarded: 2,
                ignored: 0,
                failed: 0,
            }
        );
        assert_eq!(listener.stats("vtex:unknownEvent").unwrap().ignored, 1);
        assert_eq!(listener.stats("vtex:addToCart").unwrap().failed, 1);

        let names: Vec<String> = listener.all_stats().into_iter().map(|s| s.event_name).collect();
        assert_eq!(names, vec!["vtex:addToCart", "vtex:pageView", "vtex:unknownEvent"]);
        assert_eq!(client.count(), 2);
    }

    #[test]
    fn test_malformed_messages_fail() {
        let listener = PixelListener::register(&DOM, capture_client()).unwrap();

        let not_json = listener.on_message("{not json");
        assert!(matches!(not_json, Err(PixelError::Decode(_))));

        let no_data = listener.on_value(json!({ "eventName": "vtex:pageView" }));
        assert!(matches!(no_data, Err(PixelError::Decode(_))));

        let stats = listener.stats(MISSING_EVENT_NAME).unwrap();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total(), 2);
    }
}
