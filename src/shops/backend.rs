use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::shops::types::{ShopAction, ShopId};

/// Remote side of the two shop actions.
///
/// The monitor only needs to know whether the action went through; the patch
/// it applies afterwards is fixed per action.
#[async_trait]
pub trait ShopBackend: Send + Sync {
    async fn enable_service(&self, shop_id: &ShopId) -> anyhow::Result<()>;

    async fn verify_connection(&self, shop_id: &ShopId) -> anyhow::Result<()>;

    async fn run(&self, action: ShopAction, shop_id: &ShopId) -> anyhow::Result<()> {
        match action {
            ShopAction::EnableService => self.enable_service(shop_id).await,
            ShopAction::VerifyConnection => self.verify_connection(shop_id).await,
        }
    }
}

/// Stand-in backend that waits a fixed delay and then reports a fixed result.
#[derive(Debug, Clone)]
pub struct SimulatedShopBackend {
    enable_delay: Duration,
    verify_delay: Duration,
    fail: bool,
}

impl Default for SimulatedShopBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(1200), Duration::from_millis(1500))
    }
}

impl SimulatedShopBackend {
    pub fn new(enable_delay: Duration, verify_delay: Duration) -> Self {
        Self {
            enable_delay,
            verify_delay,
            fail: false,
        }
    }

    /// Make every action fail after its delay.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn enable_delay(&self) -> Duration {
        self.enable_delay
    }

    pub fn verify_delay(&self) -> Duration {
        self.verify_delay
    }

    async fn simulate(
        &self,
        action: ShopAction,
        shop_id: &ShopId,
        delay: Duration,
    ) -> anyhow::Result<()> {
        debug!(
            shop_id = %shop_id,
            action = %action,
            delay_ms = delay.as_millis() as u64,
            "Simulating backend call"
        );
        tokio::time::sleep(delay).await;
        if self.fail {
            anyhow::bail!("simulated {action} failure");
        }
        Ok(())
    }
}

#[async_trait]
impl ShopBackend for SimulatedShopBackend {
    async fn enable_service(&self, shop_id: &ShopId) -> anyhow::Result<()> {
        self.simulate(ShopAction::EnableService, shop_id, self.enable_delay)
            .await
    }

    async fn verify_connection(&self, shop_id: &ShopId) -> anyhow::Result<()> {
        self.simulate(ShopAction::VerifyConnection, shop_id, self.verify_delay)
            .await
    }
}
