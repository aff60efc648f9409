//! Core types for the storefront pixel: the canonical analytics call schema,
//! the analytics client boundary, configuration and errors.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AnalyticsClient;
pub use config::PixelConfig;
pub use error::{NormalizeError, PixelError, PixelResult};
pub use types::{CanonicalCall, Properties};
