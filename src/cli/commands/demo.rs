use anyhow::Result;

use crate::cli::commands::verify::{print_report, run_instance};
use crate::cli::commands::Command;
use crate::cli::OutputFormat;
use crate::config::PanelMonitorConfig;
use crate::verification::VerificationOutcome;

/// Two independent plugin instances, one whose check succeeds and one whose
/// check keeps failing, verified at the same time.
pub struct DemoCommand {
    pub config: PanelMonitorConfig,
    pub format: OutputFormat,
}

impl DemoCommand {
    pub fn new(config: PanelMonitorConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }
}

impl Command for DemoCommand {
    async fn execute(&self) -> Result<()> {
        if self.format == OutputFormat::Text {
            println!("🧪 Verifying instance A (success path) and instance B (failure path)...");
            println!();
        }

        let (success, failure) = tokio::join!(
            run_instance(&self.config, "instance-a", VerificationOutcome::Success),
            run_instance(&self.config, "instance-b", VerificationOutcome::Failure),
        );

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&[success, failure])?);
            }
            OutputFormat::Text => {
                print_report(&success);
                println!();
                print_report(&failure);
            }
        }
        Ok(())
    }
}
