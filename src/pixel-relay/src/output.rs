//! JSON-lines analytics client: writes every forwarded call to a writer
//! (stdout in the binary), stamped with an id and a dispatch time.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use pixel_core::{AnalyticsClient, CanonicalCall, Properties};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// One output record.
#[derive(Debug, Serialize)]
pub struct ForwardedCall<'a> {
    pub call_id: Uuid,
    pub dispatched_at: DateTime<Utc>,
    #[serde(flatten)]
    pub call: &'a CanonicalCall,
}

pub struct JsonLinesClient<W: Write + Send> {
    writer: Mutex<W>,
    pretty: bool,
}

impl<W: Write + Send> JsonLinesClient<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_call(&self, call: &CanonicalCall) {
        let record = ForwardedCall {
            call_id: Uuid::new_v4(),
            dispatched_at: Utc::now(),
            call,
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&record)
        } else {
            serde_json::to_string(&record)
        };
        let line = match rendered {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, name = call.name(), "failed to render call");
                return;
            }
        };

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            warn!(error = %e, name = call.name(), "failed to write call");
        }
    }
}

impl<W: Write + Send> AnalyticsClient for JsonLinesClient<W> {
    fn identify(&self, user_id: &str, traits: &Properties) {
        self.write_call(&CanonicalCall::Identify {
            user_id: user_id.to_string(),
            traits: traits.clone(),
        });
    }

    fn track(&self, event: &str, properties: &Properties) {
        self.write_call(&CanonicalCall::Track {
            event: event.to_string(),
            properties: properties.clone(),
        });
    }
}
