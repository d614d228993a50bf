use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::cli::commands::Command;
use crate::cli::OutputFormat;
use crate::config::PanelMonitorConfig;
use crate::shops::{
    ActionOutcome, FileShopSource, InMemoryShopSource, MonitorSnapshot, MonitorTab, ShopAction,
    ShopDataSource, ShopId, ShopRecord, ShopStatusAggregator,
};

#[derive(Debug, Serialize)]
pub struct ActionReport {
    pub shop_id: ShopId,
    pub action: ShopAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the error is worth trying again, e.g. a backend or file failure.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ShopsOutput {
    actions: Vec<ActionReport>,
    monitor: MonitorSnapshot,
}

pub struct ShopsCommand {
    pub config: PanelMonitorConfig,
    pub file: Option<PathBuf>,
    pub enable: Vec<String>,
    pub verify: Vec<String>,
    pub tab: Option<MonitorTab>,
    pub format: OutputFormat,
}

impl ShopsCommand {
    pub fn new(config: PanelMonitorConfig) -> Self {
        Self {
            config,
            file: None,
            enable: Vec::new(),
            verify: Vec::new(),
            tab: None,
            format: OutputFormat::Text,
        }
    }

    fn source(&self) -> Arc<dyn ShopDataSource> {
        match self.file.as_ref().or(self.config.shops.path.as_ref()) {
            Some(path) => Arc::new(FileShopSource::new(path)),
            None => Arc::new(InMemoryShopSource::demo()),
        }
    }

    fn requested_actions(&self) -> Vec<(ShopId, ShopAction)> {
        let enables = self
            .enable
            .iter()
            .map(|id| (ShopId::from(id.as_str()), ShopAction::EnableService));
        let verifies = self
            .verify
            .iter()
            .map(|id| (ShopId::from(id.as_str()), ShopAction::VerifyConnection));
        enables.chain(verifies).collect()
    }

    /// Start every requested action at once and wait for all of them.
    pub async fn run_actions(
        aggregator: &ShopStatusAggregator,
        actions: Vec<(ShopId, ShopAction)>,
    ) -> Result<Vec<ActionReport>> {
        let mut tasks = JoinSet::new();
        for (index, (shop_id, action)) in actions.into_iter().enumerate() {
            let aggregator = aggregator.clone();
            tasks.spawn(async move {
                let result = match action {
                    ShopAction::EnableService => aggregator.enable_service(&shop_id).await,
                    ShopAction::VerifyConnection => aggregator.verify_connection(&shop_id).await,
                };
                let (outcome, error, retryable) = match result {
                    Ok(outcome) => (Some(outcome), None, false),
                    Err(e) => (None, Some(e.to_string()), e.is_retryable()),
                };
                (
                    index,
                    ActionReport {
                        shop_id,
                        action,
                        outcome,
                        error,
                        retryable,
                        finished_at: Utc::now(),
                    },
                )
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            reports.push(joined.context("Shop action task panicked")?);
        }
        reports.sort_by_key(|(index, _)| *index);
        Ok(reports.into_iter().map(|(_, report)| report).collect())
    }
}

fn print_shop_list(records: &[ShopRecord]) {
    if records.is_empty() {
        println!("   (none)");
    }
    for shop in records {
        let service = if shop.service_enabled { "✅ on " } else { "⏸️  off" };
        let panel = if shop.is_disconnected() { "❌ disconnected" } else { "✅ connected" };
        println!("   {:<12} {:<20} service {}  panel {}", shop.id, shop.name, service, panel);
    }
}

fn print_text(reports: &[ActionReport], snapshot: &MonitorSnapshot) {
    if !reports.is_empty() {
        println!("⚙️  ACTIONS:");
        for report in reports {
            match (&report.outcome, &report.error) {
                (Some(ActionOutcome::Applied(_)), _) => {
                    println!("   ✅ {} {}", report.action, report.shop_id)
                }
                (Some(ActionOutcome::Ignored { reason }), _) => {
                    println!("   ⏭️  {} {} ignored ({:?})", report.action, report.shop_id, reason)
                }
                (None, Some(error)) => {
                    let hint = if report.retryable { " (retry possible)" } else { "" };
                    println!("   ❌ {} {}: {}{}", report.action, report.shop_id, error, hint)
                }
                (None, None) => {}
            }
        }
        println!();
    }

    let marker = |tab: MonitorTab| if snapshot.active_tab == tab { "▶" } else { " " };
    println!(
        "{} 🔌 SERVICE DISABLED ({} pending)",
        marker(MonitorTab::ServiceDisabled),
        snapshot.counts.pending_service
    );
    print_shop_list(&snapshot.disabled_service);
    println!();
    println!(
        "{} 📡 PANEL DISCONNECTED ({} down)",
        marker(MonitorTab::PanelDisconnected),
        snapshot.counts.disconnected
    );
    print_shop_list(&snapshot.disconnected_panels);
}

impl Command for ShopsCommand {
    async fn execute(&self) -> Result<()> {
        let aggregator = ShopStatusAggregator::new(
            self.source(),
            Arc::new(self.config.simulation.shop_backend()),
        )
        .context("Failed to load shops")?;

        if let Some(tab) = self.tab {
            aggregator.select_tab(tab)?;
        }

        let actions = Self::run_actions(&aggregator, self.requested_actions()).await?;
        let monitor = aggregator.snapshot()?;

        match self.format {
            OutputFormat::Json => {
                let output = ShopsOutput { actions, monitor };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => print_text(&actions, &monitor),
        }
        Ok(())
    }
}
