use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::Command;
use crate::cli::OutputFormat;
use crate::config::PanelMonitorConfig;
use crate::verification::{
    PanelView, VerificationOutcome, VerificationSimulator, VerificationState,
};

#[derive(Debug, Serialize)]
pub struct VerificationReport {
    pub instance: String,
    pub outcome: VerificationOutcome,
    pub attempts: u32,
    pub state: VerificationState,
    pub view: PanelView,
}

/// Run one verification on a fresh simulated instance.
pub async fn run_instance(
    config: &PanelMonitorConfig,
    instance: &str,
    outcome: VerificationOutcome,
) -> VerificationReport {
    let simulator = VerificationSimulator::simulated(
        instance,
        outcome,
        config.simulation.verification_delay(),
    );
    let state = simulator.start_verification().await;
    VerificationReport {
        instance: instance.to_string(),
        outcome,
        attempts: simulator.attempts(),
        state,
        view: PanelView::for_state(&state, &config.portal.url),
    }
}

pub fn print_view(view: &PanelView) {
    match view {
        PanelView::Workspace => {
            println!("✅ Panel connected - workspace is available");
        }
        PanelView::Diagnostic {
            steps,
            failure_banner,
            checking,
        } => {
            println!("⚠️  Panel connection problem - work through these steps:");
            for step in steps {
                println!("   {}. {}", step.number, step.title);
                println!("      {}", step.detail);
                if let Some(link) = &step.link {
                    println!("      🔗 {link}");
                }
            }
            if *checking {
                println!("🔄 Verifying connection...");
            }
            if let Some(banner) = failure_banner {
                println!("❌ {banner}");
            }
        }
    }
}

pub fn print_report(report: &VerificationReport) {
    println!("🔌 Instance '{}' (probe: {:?})", report.instance, report.outcome);
    println!(
        "   phase: {:?}, verified: {}, attempts: {}",
        report.state.phase, report.state.verified, report.attempts
    );
    print_view(&report.view);
}

pub struct VerifyCommand {
    pub config: PanelMonitorConfig,
    pub outcome: Option<VerificationOutcome>,
    pub format: OutputFormat,
}

impl VerifyCommand {
    pub fn new(config: PanelMonitorConfig) -> Self {
        Self {
            config,
            outcome: None,
            format: OutputFormat::Text,
        }
    }

    pub fn with_outcome(mut self, outcome: Option<VerificationOutcome>) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

impl Command for VerifyCommand {
    async fn execute(&self) -> Result<()> {
        let outcome = self
            .outcome
            .unwrap_or(self.config.simulation.verification_outcome);

        if self.format == OutputFormat::Text {
            print_view(&PanelView::for_state(
                &VerificationState::default(),
                &self.config.portal.url,
            ));
            println!();
            println!("🔄 Verifying connection...");
        }

        let report = run_instance(&self.config, "panel", outcome).await;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => {
                println!();
                print_report(&report);
            }
        }
        Ok(())
    }
}
