use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::errors::{MonitorError, MonitorResult};
use crate::shops::backend::ShopBackend;
use crate::shops::source::ShopDataSource;
use crate::shops::state::{Begin, MonitorState, TabCounts};
use crate::shops::types::{ActionOutcome, MonitorTab, ShopAction, ShopId, ShopRecord};

/// Point-in-time copy of everything the overview renders.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub active_tab: MonitorTab,
    pub counts: TabCounts,
    pub disabled_service: Vec<ShopRecord>,
    pub disconnected_panels: Vec<ShopRecord>,
    pub taken_at: DateTime<Utc>,
}

/// Runs shop actions against a backend and keeps the filtered views current.
///
/// The state lock is never held across the backend await; the in-flight marker
/// set under the lock is what keeps actions on one shop from overlapping.
#[derive(Clone)]
pub struct ShopStatusAggregator {
    state: Arc<Mutex<MonitorState>>,
    backend: Arc<dyn ShopBackend>,
    source: Arc<dyn ShopDataSource>,
}

impl std::fmt::Debug for ShopStatusAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopStatusAggregator")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ShopStatusAggregator {
    pub fn new(
        source: Arc<dyn ShopDataSource>,
        backend: Arc<dyn ShopBackend>,
    ) -> MonitorResult<Self> {
        let records = source.load_shops()?;
        let state = MonitorState::new(records)?;
        info!(
            shops = state.records().len(),
            active_tab = ?state.active_tab(),
            "Shop status monitor initialized"
        );
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            backend,
            source,
        })
    }

    fn lock(&self) -> MonitorResult<MutexGuard<'_, MonitorState>> {
        self.state
            .lock()
            .map_err(|_| MonitorError::LockPoisoned("monitor state"))
    }

    /// Switch the shop's service on.
    ///
    /// Dropping the returned future before it resolves abandons the action:
    /// the shop is no longer in flight and the record is left as it was.
    pub async fn enable_service(&self, shop_id: &ShopId) -> MonitorResult<ActionOutcome> {
        self.run(shop_id, ShopAction::EnableService).await
    }

    /// Re-check the shop's panel connection. Cancels the same way as
    /// [`enable_service`](Self::enable_service).
    pub async fn verify_connection(&self, shop_id: &ShopId) -> MonitorResult<ActionOutcome> {
        self.run(shop_id, ShopAction::VerifyConnection).await
    }

    #[instrument(skip_all, fields(shop_id = %shop_id, action = %action))]
    async fn run(&self, shop_id: &ShopId, action: ShopAction) -> MonitorResult<ActionOutcome> {
        let begin = self.lock()?.begin(shop_id, action)?;
        if let Begin::Ignored(reason) = begin {
            info!(?reason, "Action ignored");
            return Ok(ActionOutcome::Ignored { reason });
        }
        let pending = PendingGuard::new(&self.state, shop_id);

        if let Err(source) = self.backend.run(action, shop_id).await {
            warn!(error = %source, "Backend rejected action");
            return Err(MonitorError::Backend {
                operation: action.name(),
                shop_id: shop_id.clone(),
                source,
            });
        }

        // The local record only changes once the data source has the patch.
        if let Err(e) = self.source.update_shop(shop_id, &action.patch()) {
            warn!(error = %e, "Data source rejected update");
            return Err(e);
        }

        let record = self.lock()?.complete(shop_id, action)?;
        pending.disarm();
        info!(
            service_enabled = record.service_enabled,
            connection_status = %record.connection_status,
            "Action applied"
        );
        Ok(ActionOutcome::Applied(record))
    }

    pub fn disabled_service_view(&self) -> MonitorResult<Vec<ShopRecord>> {
        Ok(self.lock()?.disabled_service_view())
    }

    pub fn disconnected_panel_view(&self) -> MonitorResult<Vec<ShopRecord>> {
        Ok(self.lock()?.disconnected_panel_view())
    }

    pub fn counts(&self) -> MonitorResult<TabCounts> {
        Ok(self.lock()?.counts())
    }

    pub fn active_tab(&self) -> MonitorResult<MonitorTab> {
        Ok(self.lock()?.active_tab())
    }

    pub fn select_tab(&self, tab: MonitorTab) -> MonitorResult<()> {
        self.lock()?.select_tab(tab);
        Ok(())
    }

    pub fn is_in_flight(&self, shop_id: &ShopId) -> MonitorResult<bool> {
        Ok(self.lock()?.is_in_flight(shop_id))
    }

    pub fn is_session_enabled(&self, shop_id: &ShopId) -> MonitorResult<bool> {
        Ok(self.lock()?.is_session_enabled(shop_id))
    }

    pub fn is_session_verified(&self, shop_id: &ShopId) -> MonitorResult<bool> {
        Ok(self.lock()?.is_session_verified(shop_id))
    }

    pub fn records(&self) -> MonitorResult<Vec<ShopRecord>> {
        Ok(self.lock()?.records())
    }

    pub fn snapshot(&self) -> MonitorResult<MonitorSnapshot> {
        let state = self.lock()?;
        Ok(MonitorSnapshot {
            active_tab: state.active_tab(),
            counts: state.counts(),
            disabled_service: state.disabled_service_view(),
            disconnected_panels: state.disconnected_panel_view(),
            taken_at: Utc::now(),
        })
    }
}

/// Clears a shop's in-flight marker when an action ends without completing,
/// whether it returned an error or its future was dropped.
struct PendingGuard<'a> {
    state: &'a Mutex<MonitorState>,
    shop_id: &'a ShopId,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(state: &'a Mutex<MonitorState>, shop_id: &'a ShopId) -> Self {
        Self {
            state,
            shop_id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // A poisoned lock has nothing left worth unblocking.
        if let Ok(mut state) = self.state.lock() {
            if state.abort(self.shop_id).is_ok() {
                debug!(shop_id = %self.shop_id, "Cleared in-flight marker");
            }
        }
    }
}
