// Panel Monitor Library - plugin panel connection checks and shop status monitoring
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod errors;
pub mod portal;
pub mod shops;
pub mod telemetry;
pub mod verification;

// Re-export key types for easy access
pub use config::{config, PanelMonitorConfig};
pub use errors::{MonitorError, MonitorResult};
pub use portal::{LoggingPortal, ServicePortal};
pub use shops::{
    ActionOutcome, ConnectionStatus, FileShopSource, InMemoryShopSource, MonitorTab, ShopBackend,
    ShopDataSource, ShopId, ShopPatch, ShopRecord, ShopStatusAggregator, SimulatedShopBackend,
};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
pub use verification::{
    ConnectionProbe, PanelView, SimulatedProbe, VerificationOutcome, VerificationPhase,
    VerificationSimulator, VerificationState,
};
