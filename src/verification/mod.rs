// Panel verification - the diagnostic -> check -> workspace/failure flow of a
// single plugin instance.

pub mod checklist;
pub mod probe;
pub mod simulator;
pub mod state_machine;

pub use checklist::{diagnostic_checklist, DiagnosticStep, PanelView};
pub use probe::{ConnectionProbe, SimulatedProbe, VerificationOutcome};
pub use simulator::VerificationSimulator;
pub use state_machine::{PanelVerification, VerificationEvent, VerificationPhase, VerificationState};
