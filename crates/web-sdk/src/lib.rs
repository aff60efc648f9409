//! Storefront pixel: normalizes storefront lifecycle events (page views,
//! cart changes, product views/clicks/impressions, placed orders, user data)
//! into vendor-neutral `identify` / `track` calls.
//!
//! # Modules
//!
//! - [`events`]: Raw pixel event envelope, one variant per storefront event
//! - [`normalize`]: Field normalizers (category cleaner, line items, impressions)
//! - [`dispatcher`]: Routes each event to its rule and forwards the call
//! - [`listener`]: Inbound boundary gated on the host's capabilities

pub mod dispatcher;
pub mod events;
pub mod listener;
pub mod normalize;

pub use dispatcher::{normalize, Dispatch, Dispatcher, IgnoreReason};
pub use events::{PixelEvent, PixelMessage};
pub use listener::{EventStats, HostEnvironment, PixelListener, StaticHost};
