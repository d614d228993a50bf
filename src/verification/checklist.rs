use serde::Serialize;

use crate::verification::state_machine::{VerificationPhase, VerificationState};

/// One troubleshooting step shown while the panel is not verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticStep {
    pub number: u8,
    pub title: String,
    pub detail: String,
    pub link: Option<String>,
}

pub fn diagnostic_checklist(portal_url: &str) -> Vec<DiagnosticStep> {
    vec![
        DiagnosticStep {
            number: 1,
            title: "Make sure the panel switch is on".to_string(),
            detail: "Open the client settings, find the plugin in the application list \
                     and turn its panel on."
                .to_string(),
            link: None,
        },
        DiagnosticStep {
            number: 2,
            title: "Check the subscription and its validity period".to_string(),
            detail: "Confirm in the service portal that the plugin subscription has not expired."
                .to_string(),
            link: Some(portal_url.to_string()),
        },
    ]
}

/// What the plugin surface shows for a given verification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PanelView {
    Diagnostic {
        steps: Vec<DiagnosticStep>,
        /// Set after a failed check; the user can re-trigger it.
        failure_banner: Option<String>,
        checking: bool,
    },
    Workspace,
}

impl PanelView {
    pub fn for_state(state: &VerificationState, portal_url: &str) -> Self {
        if state.verified {
            return PanelView::Workspace;
        }
        let failure_banner = (state.phase == VerificationPhase::Error).then(|| {
            "Connection is still failing. Work through the steps above and verify again."
                .to_string()
        });
        PanelView::Diagnostic {
            steps: diagnostic_checklist(portal_url),
            failure_banner,
            checking: state.is_loading(),
        }
    }
}
