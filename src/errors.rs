use thiserror::Error;

use crate::shops::types::ShopId;

/// Errors raised by the shop monitor and its collaborators.
///
/// A failed panel verification is not an error: it is the `Error` phase of
/// the verification state machine.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("No shop with id '{0}'")]
    UnknownShop(ShopId),

    #[error("Shop id '{0}' appears more than once in the collection")]
    DuplicateShopId(ShopId),

    #[error("Backend {operation} failed for shop '{shop_id}': {source}")]
    Backend {
        operation: &'static str,
        shop_id: ShopId,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML shop data: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to write TOML shop data: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("JSON shop data error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonitorError {
    /// Whether the caller can reasonably retry the same action later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MonitorError::Backend { .. } | MonitorError::Io(_))
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;
