//! Reads newline-delimited pixel messages and feeds them to the listener in
//! arrival order.

use anyhow::Context;
use pixel_web_sdk::{Dispatch, PixelListener};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Totals for one relay run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub messages: u64,
    pub forwarded: u64,
    pub ignored: u64,
    pub failed: u64,
    /// Messages read while no listener was registered.
    pub dropped: u64,
}

/// Relay every non-blank line of `reader`.
///
/// With `fail_fast`, the first message that fails to decode or normalize ends
/// the run with that error. Otherwise failures are counted and skipped. A line
/// that is not valid UTF-8 counts as a failed message.
pub async fn relay<R>(
    mut reader: R,
    listener: Option<&PixelListener>,
    fail_fast: bool,
) -> anyhow::Result<RelaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = RelaySummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0u64;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("reading pixel messages")?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let decoded = std::str::from_utf8(&buf).map(str::trim);
        if matches!(decoded, Ok("")) {
            continue;
        }
        summary.messages += 1;

        let Some(listener) = listener else {
            summary.dropped += 1;
            continue;
        };

        let line = match decoded {
            Ok(line) => line,
            Err(e) => {
                summary.failed += 1;
                warn!(line = line_no, error = %e, "pixel message is not valid UTF-8");
                if fail_fast {
                    return Err(e).with_context(|| format!("message on line {line_no}"));
                }
                continue;
            }
        };

        match listener.on_message(line) {
            Ok(Dispatch::Forwarded(_)) => summary.forwarded += 1,
            Ok(Dispatch::Ignored(reason)) => {
                debug!(line = line_no, reason = ?reason, "message ignored");
                summary.ignored += 1;
            }
            Err(e) => {
                summary.failed += 1;
                if fail_fast {
                    return Err(e).with_context(|| format!("message on line {line_no}"));
                }
            }
        }
    }

    info!(
        messages = summary.messages,
        forwarded = summary.forwarded,
        ignored = summary.ignored,
        failed = summary.failed,
        dropped = summary.dropped,
        "relay finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pixel_core::client::capture_client;
    use pixel_web_sdk::StaticHost;
    use pretty_assertions::assert_eq;

    const INPUT: &str = r#"{"data":{"eventName":"vtex:pageView","pageTitle":"Home"}}

{"data":{"eventName":"vtex:userData","isAuthenticated":false}}
{"data":{"eventName":"vtex:addToCart","items":[]}}
not json
{"data":{"eventName":"vtex:productImpression","list":"Shelf"}}
"#;

    #[tokio::test]
    async fn test_relay_counts_outcomes() {
        let client = capture_client();
        let listener = PixelListener::register(&StaticHost { can_use_dom: true }, client.clone());

        let summary = relay(INPUT.as_bytes(), listener.as_ref(), false)
            .await
            .unwrap();
        assert_eq!(
            summary,
            RelaySummary {
                messages: 5,
                forwarded: 2,
                ignored: 1,
                failed: 2,
                dropped: 0,
            }
        );
        assert_eq!(client.count(), 2);
    }

    #[tokio::test]
    async fn test_relay_fail_fast_stops() {
        let client = capture_client();
        let listener = PixelListener::register(&StaticHost { can_use_dom: true }, client.clone());

        let err = relay(INPUT.as_bytes(), listener.as_ref(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("line 4"));
        assert_eq!(client.count(), 1);
    }

    const NON_UTF8: &[u8] = b"{\"data\":{\"eventName\":\"vtex:pageView\"}}\n\xff\xfe garbage\n{\"data\":{\"eventName\":\"vtex:pageView\"}}\n";

    #[tokio::test]
    async fn test_relay_skips_non_utf8_line() {
        let client = capture_client();
        let listener = PixelListener::register(&StaticHost { can_use_dom: true }, client.clone());

        let summary = relay(NON_UTF8, listener.as_ref(), false).await.unwrap();
        assert_eq!(
            summary,
            RelaySummary {
                messages: 3,
                forwarded: 2,
                ignored: 0,
                failed: 1,
                dropped: 0,
            }
        );
        assert_eq!(client.count(), 2);
    }

    #[tokio::test]
    async fn test_relay_fail_fast_on_non_utf8_line() {
        let client = capture_client();
        let listener = PixelListener::register(&StaticHost { can_use_dom: true }, client.clone());

        let err = relay(NON_UTF8, listener.as_ref(), true).await.unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert_eq!(client.count(), 1);
    }

    #[tokio::test]
    async fn test_relay_without_listener_drops() {
        let summary = relay(INPUT.as_bytes(), None, true).await.unwrap();
        assert_eq!(summary.messages, 5);
        assert_eq!(summary.dropped, 5);
        assert_eq!(summary.forwarded, 0);
    }
}
