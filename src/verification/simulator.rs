use statig::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::verification::probe::{ConnectionProbe, SimulatedProbe, VerificationOutcome};
use crate::verification::state_machine::{PanelVerification, VerificationEvent, VerificationState};

/// One plugin instance's connection check.
///
/// Triggering while a check is running, or after the panel has been verified,
/// returns the current state without starting anything.
pub struct VerificationSimulator {
    machine: Mutex<StateMachine<PanelVerification>>,
    probe: Arc<dyn ConnectionProbe>,
}

impl VerificationSimulator {
    pub fn new(instance: impl Into<String>, probe: Arc<dyn ConnectionProbe>) -> Self {
        Self {
            machine: Mutex::new(PanelVerification::new(instance).state_machine()),
            probe,
        }
    }

    /// Instance whose probe always reports `outcome` after `delay`.
    pub fn simulated(
        instance: impl Into<String>,
        outcome: VerificationOutcome,
        delay: Duration,
    ) -> Self {
        Self::new(instance, Arc::new(SimulatedProbe::new(outcome, delay)))
    }

    fn machine(&self) -> MutexGuard<'_, StateMachine<PanelVerification>> {
        // state is plain data, so a panic elsewhere cannot leave it half-written
        self.machine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> VerificationState {
        self.machine().inner().snapshot()
    }

    pub fn instance(&self) -> String {
        self.machine().inner().instance.clone()
    }

    pub fn attempts(&self) -> u32 {
        self.machine().inner().attempts()
    }

    /// Run one connection check and return the state it settles in.
    ///
    /// Dropping the future while the probe is running puts the instance back
    /// to idle, so the next trigger starts a fresh check.
    #[instrument(skip(self))]
    pub async fn start_verification(&self) -> VerificationState {
        {
            let mut machine = self.machine();
            if !machine.inner().can_start() {
                debug!("Verification already running or done");
                return machine.inner().snapshot();
            }
            machine.handle(&VerificationEvent::Start);
        }
        let running = RunningCheck {
            simulator: self,
            armed: true,
        };

        let outcome = self.probe.probe().await;
        running.disarm();

        let mut machine = self.machine();
        machine.handle(&VerificationEvent::Resolved(outcome));
        machine.inner().snapshot()
    }
}

/// Sends `Cancelled` if a started check is dropped before it resolves.
struct RunningCheck<'a> {
    simulator: &'a VerificationSimulator,
    armed: bool,
}

impl RunningCheck<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunningCheck<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.simulator.machine().handle(&VerificationEvent::Cancelled);
        }
    }
}
