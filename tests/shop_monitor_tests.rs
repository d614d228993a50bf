//! Shop status monitor behaviour
//!
//! These tests run on a paused tokio clock so the simulated backend delays
//! complete instantly and deterministically.

use panel_monitor::shops::{
    ActionOutcome, ConnectionStatus, IgnoreReason, InMemoryShopSource, MonitorTab, ShopId,
    ShopPatch, ShopRecord, ShopStatusAggregator, SimulatedShopBackend,
};
use std::sync::Arc;
use tokio::time::{Duration, Instant};

fn shop(id: &str, status: ConnectionStatus, enabled: bool) -> ShopRecord {
    ShopRecord::new(id, format!("Shop {id}"), status, enabled)
}

fn monitor(shops: Vec<ShopRecord>) -> (ShopStatusAggregator, Arc<InMemoryShopSource>) {
    let source = Arc::new(InMemoryShopSource::new(shops));
    let aggregator =
        ShopStatusAggregator::new(source.clone(), Arc::new(SimulatedShopBackend::default()))
            .expect("monitor should load");
    (aggregator, source)
}

fn ids(records: &[ShopRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_enable_service_takes_fixed_delay_and_marks_session() {
        let (aggregator, source) = monitor(vec![shop("s1", ConnectionStatus::Connected, false)]);
        let s1 = ShopId::from("s1");

        let start = Instant::now();
        let outcome = aggregator.enable_service(&s1).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1200));
        assert!(outcome.is_applied());
        assert!(aggregator.records().unwrap()[0].service_enabled);
        assert!(aggregator.is_session_enabled(&s1).unwrap());
        assert!(source.snapshot()[0].service_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_leaves_other_records_unchanged() {
        let before = vec![
            shop("s1", ConnectionStatus::Disconnected, false),
            shop("s2", ConnectionStatus::Disconnected, false),
            shop("s3", ConnectionStatus::Connected, true),
        ];
        let (aggregator, _) = monitor(before.clone());

        aggregator.enable_service(&ShopId::from("s2")).await.unwrap();

        let after = aggregator.records().unwrap();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert!(after[1].service_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_duplicate_enables_complete_once() {
        let (aggregator, source) = monitor(vec![shop("s1", ConnectionStatus::Connected, false)]);
        let s1 = ShopId::from("s1");

        let (first, second) = tokio::join!(
            aggregator.enable_service(&s1),
            aggregator.enable_service(&s1)
        );
        let outcomes = [first.unwrap(), second.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.is_applied()).count(), 1);
        assert!(outcomes.contains(&ActionOutcome::Ignored {
            reason: IgnoreReason::InFlight
        }));
        assert_eq!(source.applied_updates(), vec![(s1, ShopPatch::service_enabled())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_on_already_enabled_shop_is_noop() {
        let (aggregator, source) = monitor(vec![shop("s1", ConnectionStatus::Connected, true)]);

        let outcome = aggregator.enable_service(&ShopId::from("s1")).await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Ignored {
                reason: IgnoreReason::AlreadyEnabled
            }
        );
        assert!(source.applied_updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_view_retains_enabled_shops_for_session() {
        let (aggregator, _) = monitor(vec![
            shop("s1", ConnectionStatus::Connected, false),
            shop("s2", ConnectionStatus::Connected, true),
            shop("s3", ConnectionStatus::Connected, false),
        ]);

        assert_eq!(ids(&aggregator.disabled_service_view().unwrap()), vec!["s1", "s3"]);

        aggregator.enable_service(&ShopId::from("s3")).await.unwrap();
        aggregator.enable_service(&ShopId::from("s1")).await.unwrap();

        assert_eq!(ids(&aggregator.disabled_service_view().unwrap()), vec!["s1", "s3"]);
        assert_eq!(aggregator.counts().unwrap().pending_service, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnected_view_scenario() {
        let (aggregator, _) = monitor(vec![
            shop("s1", ConnectionStatus::Disconnected, true),
            shop("s2", ConnectionStatus::Connected, true),
        ]);

        assert_eq!(ids(&aggregator.disconnected_panel_view().unwrap()), vec!["s1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnected_view_never_lists_disabled_service() {
        let (aggregator, _) = monitor(vec![
            shop("s1", ConnectionStatus::Disconnected, false),
            shop("s2", ConnectionStatus::Connected, false),
            shop("s3", ConnectionStatus::Disconnected, true),
        ]);

        // verifying a shop whose service is off still keeps it out of the view
        aggregator.verify_connection(&ShopId::from("s1")).await.unwrap();

        let view = aggregator.disconnected_panel_view().unwrap();
        assert!(view.iter().all(|s| s.service_enabled));
        assert_eq!(ids(&view), vec!["s3"]);

        // once its service is enabled it shows up as a verified panel
        aggregator.enable_service(&ShopId::from("s1")).await.unwrap();
        assert_eq!(ids(&aggregator.disconnected_panel_view().unwrap()), vec!["s1", "s3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_connection_once_per_session() {
        let (aggregator, source) = monitor(vec![shop("s1", ConnectionStatus::Disconnected, true)]);
        let s1 = ShopId::from("s1");

        let start = Instant::now();
        assert!(aggregator.verify_connection(&s1).await.unwrap().is_applied());
        assert!(start.elapsed() >= Duration::from_millis(1500));

        let again = aggregator.verify_connection(&s1).await.unwrap();
        assert_eq!(
            again,
            ActionOutcome::Ignored {
                reason: IgnoreReason::AlreadyVerified
            }
        );

        assert_eq!(ids(&aggregator.disconnected_panel_view().unwrap()), vec!["s1"]);
        assert_eq!(aggregator.counts().unwrap().disconnected, 0);
        assert_eq!(source.applied_updates(), vec![(s1, ShopPatch::connected())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_on_different_shops_overlap() {
        let (aggregator, _) = monitor(vec![
            shop("s1", ConnectionStatus::Connected, false),
            shop("s2", ConnectionStatus::Disconnected, true),
        ]);

        let start = Instant::now();
        let (a, b) = tokio::join!(
            aggregator.enable_service(&ShopId::from("s1")),
            aggregator.verify_connection(&ShopId::from("s2"))
        );

        assert!(a.unwrap().is_applied());
        assert!(b.unwrap().is_applied());
        // both ran together, so the total is the longer delay, not the sum
        assert!(start.elapsed() < Duration::from_millis(2700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_tab_is_fixed_at_load() {
        let (aggregator, _) = monitor(vec![
            shop("s1", ConnectionStatus::Connected, true),
            shop("s2", ConnectionStatus::Disconnected, true),
        ]);
        assert_eq!(aggregator.active_tab().unwrap(), MonitorTab::PanelDisconnected);

        aggregator.verify_connection(&ShopId::from("s2")).await.unwrap();
        assert_eq!(aggregator.active_tab().unwrap(), MonitorTab::PanelDisconnected);

        let (aggregator, _) = monitor(vec![shop("s1", ConnectionStatus::Connected, true)]);
        assert_eq!(aggregator.active_tab().unwrap(), MonitorTab::ServiceDisabled);
    }
}
