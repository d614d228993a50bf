use serde::{Deserialize, Serialize};
use statig::prelude::*;

use crate::verification::probe::VerificationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationEvent {
    Start,
    Resolved(VerificationOutcome),
    /// The running check was abandoned before the probe answered.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationPhase {
    #[default]
    Idle,
    Loading,
    Error,
}

/// What a plugin instance shows for its connection check.
///
/// `phase` is `Loading` only while a check is running, and never together with
/// `verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationState {
    pub phase: VerificationPhase,
    pub verified: bool,
}

impl VerificationState {
    pub fn is_loading(&self) -> bool {
        self.phase == VerificationPhase::Loading
    }
}

#[derive(Debug, Default)]
pub struct PanelVerification {
    pub instance: String,
    phase: VerificationPhase,
    verified: bool,
    attempts: u32,
}

impl PanelVerification {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> VerificationState {
        VerificationState {
            phase: self.phase,
            verified: self.verified,
        }
    }

    pub fn phase(&self) -> VerificationPhase {
        self.phase
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Number of checks started so far, retries included.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether a `Start` event would begin a new check right now.
    pub fn can_start(&self) -> bool {
        !self.verified && self.phase != VerificationPhase::Loading
    }

    fn begin_check(&mut self) {
        self.phase = VerificationPhase::Loading;
        self.attempts += 1;
        tracing::info!(
            instance = %self.instance,
            attempt = self.attempts,
            "Panel verification started"
        );
    }
}

#[state_machine(initial = "State::idle()")]
impl PanelVerification {
    #[state]
    fn idle(&mut self, event: &VerificationEvent) -> Outcome<State> {
        match event {
            VerificationEvent::Start => {
                self.begin_check();
                Transition(State::loading())
            }
            _ => Handled,
        }
    }

    #[state]
    fn loading(&mut self, event: &VerificationEvent) -> Outcome<State> {
        match event {
            VerificationEvent::Resolved(VerificationOutcome::Success) => {
                self.phase = VerificationPhase::Idle;
                self.verified = true;
                tracing::info!(instance = %self.instance, "Panel connection verified");
                Transition(State::verified())
            }
            VerificationEvent::Resolved(VerificationOutcome::Failure) => {
                self.phase = VerificationPhase::Error;
                tracing::warn!(
                    instance = %self.instance,
                    attempt = self.attempts,
                    "Panel connection still failing"
                );
                Transition(State::failed())
            }
            VerificationEvent::Cancelled => {
                self.phase = VerificationPhase::Idle;
                tracing::debug!(instance = %self.instance, "Panel verification cancelled");
                Transition(State::idle())
            }
            VerificationEvent::Start => Handled,
        }
    }

    #[state]
    fn failed(&mut self, event: &VerificationEvent) -> Outcome<State> {
        match event {
            VerificationEvent::Start => {
                self.begin_check();
                Transition(State::loading())
            }
            _ => Handled,
        }
    }

    #[state]
    #[allow(unused_variables)]
    fn verified(event: &VerificationEvent) -> Outcome<State> {
        Handled
    }
}
