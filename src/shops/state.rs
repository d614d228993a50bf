// Monitor view state and its pure transitions.
//
// Everything here is synchronous and side-effect free so the async layer in
// `aggregator` only has to wrap these calls with a lock and a backend await.

use serde::Serialize;
use std::collections::HashSet;

use crate::errors::{MonitorError, MonitorResult};
use crate::shops::types::{
    IgnoreReason, MonitorTab, ShopAction, ShopId, ShopRecord,
};

/// A shop record plus the per-session bookkeeping the overview needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopEntry {
    pub record: ShopRecord,
    /// Action currently awaiting the backend, if any.
    pub pending: Option<ShopAction>,
    /// Enabled during this session; stays listed under the disabled-service tab.
    pub retained_in_disabled_view: bool,
    /// Verified during this session; stays listed under the disconnected-panel tab.
    pub retained_in_disconnected_view: bool,
}

impl ShopEntry {
    fn new(record: ShopRecord) -> Self {
        Self {
            record,
            pending: None,
            retained_in_disabled_view: false,
            retained_in_disconnected_view: false,
        }
    }

    fn in_disabled_view(&self) -> bool {
        !self.record.service_enabled || self.retained_in_disabled_view
    }

    fn in_disconnected_view(&self) -> bool {
        self.record.service_enabled
            && (self.record.is_disconnected() || self.retained_in_disconnected_view)
    }
}

/// Result of trying to start an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Begin {
    Started,
    Ignored(IgnoreReason),
}

/// Badge counts shown on the two tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TabCounts {
    pub pending_service: usize,
    pub disconnected: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorState {
    entries: Vec<ShopEntry>,
    active_tab: MonitorTab,
}

impl MonitorState {
    /// Build the state from an externally supplied collection.
    ///
    /// The active tab is picked once here from the collection as it is now:
    /// the disabled-service tab if any shop needs its service enabled, else the
    /// disconnected-panel tab if any panel is down, else the default tab.
    pub fn new(records: Vec<ShopRecord>) -> MonitorResult<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id.clone()) {
                return Err(MonitorError::DuplicateShopId(record.id.clone()));
            }
        }

        let mut state = Self {
            entries: records.into_iter().map(ShopEntry::new).collect(),
            active_tab: MonitorTab::default(),
        };
        state.active_tab = state.initial_tab();
        Ok(state)
    }

    fn initial_tab(&self) -> MonitorTab {
        if !self.disabled_service_view().is_empty() {
            MonitorTab::ServiceDisabled
        } else if !self.disconnected_panel_view().is_empty() {
            MonitorTab::PanelDisconnected
        } else {
            MonitorTab::default()
        }
    }

    pub fn active_tab(&self) -> MonitorTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: MonitorTab) {
        self.active_tab = tab;
    }

    pub fn entry(&self, id: &ShopId) -> Option<&ShopEntry> {
        self.entries.iter().find(|e| &e.record.id == id)
    }

    fn entry_mut(&mut self, id: &ShopId) -> MonitorResult<&mut ShopEntry> {
        self.entries
            .iter_mut()
            .find(|e| &e.record.id == id)
            .ok_or_else(|| MonitorError::UnknownShop(id.clone()))
    }

    pub fn records(&self) -> Vec<ShopRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    /// Mark `id` as in flight for `action`, unless the guard says otherwise.
    pub fn begin(&mut self, id: &ShopId, action: ShopAction) -> MonitorResult<Begin> {
        let entry = self.entry_mut(id)?;

        if entry.pending.is_some() {
            return Ok(Begin::Ignored(IgnoreReason::InFlight));
        }
        match action {
            ShopAction::EnableService if entry.record.service_enabled => {
                return Ok(Begin::Ignored(IgnoreReason::AlreadyEnabled));
            }
            ShopAction::VerifyConnection if entry.retained_in_disconnected_view => {
                return Ok(Begin::Ignored(IgnoreReason::AlreadyVerified));
            }
            _ => {}
        }

        entry.pending = Some(action);
        Ok(Begin::Started)
    }

    /// Apply the result of a finished action and clear the in-flight marker.
    pub fn complete(&mut self, id: &ShopId, action: ShopAction) -> MonitorResult<ShopRecord> {
        let entry = self.entry_mut(id)?;

        entry.record.apply(&action.patch());
        match action {
            ShopAction::EnableService => entry.retained_in_disabled_view = true,
            ShopAction::VerifyConnection => entry.retained_in_disconnected_view = true,
        }
        entry.pending = None;

        Ok(entry.record.clone())
    }

    /// Clear the in-flight marker without touching the record.
    pub fn abort(&mut self, id: &ShopId) -> MonitorResult<()> {
        self.entry_mut(id)?.pending = None;
        Ok(())
    }

    pub fn is_in_flight(&self, id: &ShopId) -> bool {
        self.entry(id).is_some_and(|e| e.pending.is_some())
    }

    pub fn is_session_enabled(&self, id: &ShopId) -> bool {
        self.entry(id).is_some_and(|e| e.retained_in_disabled_view)
    }

    pub fn is_session_verified(&self, id: &ShopId) -> bool {
        self.entry(id).is_some_and(|e| e.retained_in_disconnected_view)
    }

    /// Shops whose service is off, plus the ones switched on this session.
    pub fn disabled_service_view(&self) -> Vec<ShopRecord> {
        self.entries
            .iter()
            .filter(|e| e.in_disabled_view())
            .map(|e| e.record.clone())
            .collect()
    }

    /// Enabled shops whose panel is down, plus the ones verified this session.
    pub fn disconnected_panel_view(&self) -> Vec<ShopRecord> {
        self.entries
            .iter()
            .filter(|e| e.in_disconnected_view())
            .map(|e| e.record.clone())
            .collect()
    }

    pub fn counts(&self) -> TabCounts {
        TabCounts {
            pending_service: self
                .entries
                .iter()
                .filter(|e| e.in_disabled_view() && !e.record.service_enabled)
                .count(),
            disconnected: self
                .entries
                .iter()
                .filter(|e| e.in_disconnected_view() && e.record.is_disconnected())
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shops::types::ConnectionStatus::{self, Connected, Disconnected};

    fn shop(id: &str, status: ConnectionStatus, enabled: bool) -> ShopRecord {
        ShopRecord::new(id, format!("Shop {id}"), status, enabled)
    }

    fn ids(records: &[ShopRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = MonitorState::new(vec![
            shop("s1", Connected, true),
            shop("s1", Disconnected, false),
        ]);
        assert!(matches!(result, Err(MonitorError::DuplicateShopId(id)) if id.as_str() == "s1"));
    }

    #[test]
    fn test_disconnected_view_only_lists_enabled_shops() {
        let state = MonitorState::new(vec![
            shop("s1", Disconnected, true),
            shop("s2", Connected, true),
            shop("s3", Disconnected, false),
        ])
        .unwrap();

        assert_eq!(ids(&state.disconnected_panel_view()), vec!["s1"]);
        assert_eq!(ids(&state.disabled_service_view()), vec!["s3"]);
    }

    #[test]
    fn test_enable_keeps_shop_in_disabled_view() {
        let mut state = MonitorState::new(vec![
            shop("s1", Connected, false),
            shop("s2", Connected, false),
        ])
        .unwrap();
        let s1 = ShopId::from("s1");

        assert_eq!(state.begin(&s1, ShopAction::EnableService).unwrap(), Begin::Started);
        assert!(state.is_in_flight(&s1));

        let record = state.complete(&s1, ShopAction::EnableService).unwrap();
        assert!(record.service_enabled);
        assert_eq!(record.connection_status, Connected);
        assert!(state.is_session_enabled(&s1));
        assert!(!state.is_in_flight(&s1));

        assert_eq!(ids(&state.disabled_service_view()), vec!["s1", "s2"]);
        assert_eq!(state.counts().pending_service, 1);
    }

    #[test]
    fn test_guards() {
        let mut state = MonitorState::new(vec![
            shop("s1", Disconnected, true),
            shop("s2", Connected, false),
        ])
        .unwrap();
        let s1 = ShopId::from("s1");
        let s2 = ShopId::from("s2");

        assert_eq!(
            state.begin(&s1, ShopAction::EnableService).unwrap(),
            Begin::Ignored(IgnoreReason::AlreadyEnabled)
        );

        assert_eq!(state.begin(&s1, ShopAction::VerifyConnection).unwrap(), Begin::Started);
        assert_eq!(
            state.begin(&s1, ShopAction::VerifyConnection).unwrap(),
            Begin::Ignored(IgnoreReason::InFlight)
        );
        state.complete(&s1, ShopAction::VerifyConnection).unwrap();
        assert_eq!(
            state.begin(&s1, ShopAction::VerifyConnection).unwrap(),
            Begin::Ignored(IgnoreReason::AlreadyVerified)
        );

        // an enable in flight blocks verification of the same shop
        assert_eq!(state.begin(&s2, ShopAction::EnableService).unwrap(), Begin::Started);
        assert_eq!(
            state.begin(&s2, ShopAction::VerifyConnection).unwrap(),
            Begin::Ignored(IgnoreReason::InFlight)
        );
    }

    #[test]
    fn test_abort_leaves_record_untouched() {
        let mut state = MonitorState::new(vec![shop("s1", Connected, false)]).unwrap();
        let s1 = ShopId::from("s1");

        state.begin(&s1, ShopAction::EnableService).unwrap();
        state.abort(&s1).unwrap();

        assert!(!state.is_in_flight(&s1));
        assert!(!state.entry(&s1).unwrap().record.service_enabled);
        assert_eq!(state.begin(&s1, ShopAction::EnableService).unwrap(), Begin::Started);
    }

    #[test]
    fn test_unknown_shop() {
        let mut state = MonitorState::new(vec![]).unwrap();
        let err = state.begin(&ShopId::from("nope"), ShopAction::EnableService).unwrap_err();
        assert!(matches!(err, MonitorError::UnknownShop(_)));
    }

    #[test]
    fn test_initial_tab_selection() {
        let state = MonitorState::new(vec![shop("s1", Disconnected, false)]).unwrap();
        assert_eq!(state.active_tab(), MonitorTab::ServiceDisabled);

        let state = MonitorState::new(vec![shop("s1", Disconnected, true)]).unwrap();
        assert_eq!(state.active_tab(), MonitorTab::PanelDisconnected);

        let state = MonitorState::new(vec![shop("s1", Connected, true)]).unwrap();
        assert_eq!(state.active_tab(), MonitorTab::ServiceDisabled);
    }

    #[test]
    fn test_initial_tab_does_not_follow_later_changes() {
        let mut state = MonitorState::new(vec![
            shop("s1", Connected, false),
            shop("s2", Disconnected, true),
        ])
        .unwrap();
        let s1 = ShopId::from("s1");

        state.begin(&s1, ShopAction::EnableService).unwrap();
        state.complete(&s1, ShopAction::EnableService).unwrap();

        assert_eq!(state.counts().pending_service, 0);
        assert_eq!(state.active_tab(), MonitorTab::ServiceDisabled);

        state.select_tab(MonitorTab::PanelDisconnected);
        assert_eq!(state.active_tab(), MonitorTab::PanelDisconnected);
    }
}
