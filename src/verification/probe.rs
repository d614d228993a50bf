use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Result of checking whether the panel can reach its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    Success,
    Failure,
}

/// Something that can tell whether the panel connection works.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn probe(&self) -> VerificationOutcome;
}

/// Probe that waits a fixed delay and always reports the same outcome.
#[derive(Debug, Clone)]
pub struct SimulatedProbe {
    outcome: VerificationOutcome,
    delay: Duration,
}

impl SimulatedProbe {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

    pub fn new(outcome: VerificationOutcome, delay: Duration) -> Self {
        Self { outcome, delay }
    }

    pub fn success() -> Self {
        Self::new(VerificationOutcome::Success, Self::DEFAULT_DELAY)
    }

    pub fn failure() -> Self {
        Self::new(VerificationOutcome::Failure, Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl ConnectionProbe for SimulatedProbe {
    async fn probe(&self) -> VerificationOutcome {
        debug!(outcome = ?self.outcome, delay_ms = self.delay.as_millis() as u64, "Simulating connection probe");
        tokio::time::sleep(self.delay).await;
        self.outcome
    }
}
