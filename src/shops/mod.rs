// Shop status monitor - per-shop service/connection actions and the two
// filtered overview lists built on top of them.

pub mod aggregator;
pub mod backend;
pub mod source;
pub mod state;
pub mod types;

pub use aggregator::{MonitorSnapshot, ShopStatusAggregator};
pub use backend::{ShopBackend, SimulatedShopBackend};
pub use source::{FileShopSource, InMemoryShopSource, ShopDataSource};
pub use state::{Begin, MonitorState, ShopEntry, TabCounts};
pub use types::{
    ActionOutcome, ConnectionStatus, IgnoreReason, MonitorTab, ShopAction, ShopId, ShopPatch,
    ShopRecord,
};
