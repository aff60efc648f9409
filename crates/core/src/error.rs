use thiserror::Error;

pub type PixelResult<T> = Result<T, PixelError>;

/// Failure while reshaping a decoded envelope into a canonical call.
///
/// A `MissingField` means the upstream producer broke its payload contract
/// (e.g. an empty cart item list). The path uses the producer's field names.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NormalizeError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField(path.into())
    }

    /// Prefix a missing-field path with the location of the enclosing value,
    /// e.g. `product.sku` under `impressions[2]`.
    pub fn within(self, prefix: &str) -> Self {
        match self {
            Self::MissingField(path) => Self::MissingField(format!("{prefix}.{path}")),
            other => other,
        }
    }
}

#[derive(Error, Debug)]
pub enum PixelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Message decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),
}

impl From<config::ConfigError> for PixelError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = NormalizeError::missing("items[0]");
        assert_eq!(err.to_string(), "Missing required field: items[0]");

        let wrapped: PixelError = err.into();
        assert_eq!(
            wrapped.to_string(),
            "Normalization error: Missing required field: items[0]"
        );
    }

    #[test]
    fn test_within_prefixes_path() {
        let err = NormalizeError::missing("product.sku.seller").within("impressions[2]");
        match err {
            NormalizeError::MissingField(path) => {
                assert_eq!(path, "impressions[2].product.sku.seller")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
