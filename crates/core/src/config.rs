use std::path::Path;

use serde::Deserialize;

use crate::error::PixelResult;

/// Root configuration. Loaded from an optional TOML file, then environment
/// variables with the prefix `STOREFRONT_PIXEL__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PixelConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Capabilities of the embedding host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Whether a DOM-like execution context is available. The listener is
    /// only registered when this is true.
    #[serde(default = "default_can_use_dom")]
    pub can_use_dom: bool,
}

/// Settings of the `pixel-relay` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Pretty-print forwarded calls instead of one JSON object per line.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    /// Stop at the first message that fails to decode or normalize.
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,
}

fn default_can_use_dom() -> bool {
    true
}

fn default_pretty() -> bool {
    false
}

fn default_fail_fast() -> bool {
    false
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            can_use_dom: default_can_use_dom(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            fail_fast: default_fail_fast(),
        }
    }
}

impl PixelConfig {
    /// Load configuration from an optional TOML file and the environment.
    /// Environment variables win over the file.
    pub fn load(file: Option<&Path>) -> PixelResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("STOREFRONT_PIXEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parse a TOML document on top of the built-in defaults. Does not read
    /// the environment.
    pub fn from_toml(source: &str) -> PixelResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
