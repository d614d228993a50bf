use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a shop within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(String);

impl ShopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShopId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ShopId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Whether the plugin panel has a live session with its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub id: ShopId,
    pub name: String,
    #[serde(alias = "status", alias = "connectionStatus")]
    pub connection_status: ConnectionStatus,
    #[serde(alias = "serviceEnabled")]
    pub service_enabled: bool,
}

impl ShopRecord {
    pub fn new(
        id: impl Into<ShopId>,
        name: impl Into<String>,
        connection_status: ConnectionStatus,
        service_enabled: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            connection_status,
            service_enabled,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.connection_status == ConnectionStatus::Disconnected
    }

    /// Merge the fields present in `patch` into this record.
    pub fn apply(&mut self, patch: &ShopPatch) {
        if let Some(enabled) = patch.service_enabled {
            self.service_enabled = enabled;
        }
        if let Some(status) = patch.connection_status {
            self.connection_status = status;
        }
    }
}

/// Partial update of a shop record, as forwarded to the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<ConnectionStatus>,
}

impl ShopPatch {
    pub fn service_enabled() -> Self {
        Self {
            service_enabled: Some(true),
            ..Default::default()
        }
    }

    pub fn connected() -> Self {
        Self {
            connection_status: Some(ConnectionStatus::Connected),
            ..Default::default()
        }
    }
}

/// The two per-shop actions exposed by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopAction {
    EnableService,
    VerifyConnection,
}

impl ShopAction {
    pub fn name(&self) -> &'static str {
        match self {
            ShopAction::EnableService => "enable_service",
            ShopAction::VerifyConnection => "verify_connection",
        }
    }

    /// The patch merged into the record when the action completes.
    pub fn patch(&self) -> ShopPatch {
        match self {
            ShopAction::EnableService => ShopPatch::service_enabled(),
            ShopAction::VerifyConnection => ShopPatch::connected(),
        }
    }
}

impl fmt::Display for ShopAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filtered list shown in the monitor overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorTab {
    #[default]
    ServiceDisabled,
    PanelDisconnected,
}

/// Why an action trigger did not start anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    AlreadyEnabled,
    AlreadyVerified,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action completed and the record now looks like this.
    Applied(ShopRecord),
    Ignored { reason: IgnoreReason },
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut shop = ShopRecord::new("s1", "Shop One", ConnectionStatus::Disconnected, false);

        shop.apply(&ShopPatch::service_enabled());
        assert!(shop.service_enabled);
        assert_eq!(shop.connection_status, ConnectionStatus::Disconnected);

        shop.apply(&ShopPatch::connected());
        assert!(shop.service_enabled);
        assert_eq!(shop.connection_status, ConnectionStatus::Connected);
    }

    #[test]
    fn test_record_accepts_status_alias() {
        let json = r#"{"id":"s9","name":"Nine","status":"disconnected","service_enabled":true}"#;
        let shop: ShopRecord = serde_json::from_str(json).unwrap();
        assert_eq!(shop.id, ShopId::from("s9"));
        assert!(shop.is_disconnected());
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&ShopPatch::default()).unwrap(), "{}");
    }
}
