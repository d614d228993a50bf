use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::commands::Command;
use crate::config::PanelMonitorConfig;

pub struct ConfigCommand {
    pub config: PanelMonitorConfig,
    pub save: Option<PathBuf>,
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        match &self.save {
            Some(path) => {
                self.config
                    .save_to_file(path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("💾 Configuration saved to {}", path.display());
            }
            None => print!("{}", toml::to_string_pretty(&self.config)?),
        }
        Ok(())
    }
}
