use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::shops::MonitorTab;
use crate::verification::VerificationOutcome;

pub mod commands;

#[derive(Parser)]
#[command(name = "panel-monitor")]
#[command(about = "Plugin panel connection diagnostics and shop service monitor")]
#[command(long_about = "Simulates the plugin panel's connection check (diagnose, verify, \
                       succeed or fail) and the multi-shop monitor that enables services \
                       and re-verifies disconnected panels.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the diagnostic checklist and run one panel verification
    Verify {
        /// Outcome the simulated probe reports (defaults to the configured one)
        #[arg(long, value_enum)]
        outcome: Option<VerificationOutcome>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Run a succeeding and a failing plugin instance side by side
    Demo {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load shops, run service/connection actions and print both views
    Shops {
        /// TOML or JSON shop file (defaults to the configured file, then the demo shops)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Enable the SaaS service for this shop id (repeatable)
        #[arg(long = "enable", value_name = "SHOP_ID")]
        enable: Vec<String>,
        /// Verify the panel connection of this shop id (repeatable)
        #[arg(long = "verify", value_name = "SHOP_ID")]
        verify: Vec<String>,
        /// Switch to this tab after loading
        #[arg(long, value_enum)]
        tab: Option<TabArg>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Open the external service portal
    Portal,
    /// Print the effective configuration, or save it as TOML
    Config {
        /// Write the configuration to this path instead of printing it
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    Service,
    Panel,
}

impl From<TabArg> for MonitorTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Service => MonitorTab::ServiceDisabled,
            TabArg::Panel => MonitorTab::PanelDisconnected,
        }
    }
}
