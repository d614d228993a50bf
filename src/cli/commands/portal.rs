use anyhow::Result;

use crate::cli::commands::Command;
use crate::portal::{LoggingPortal, ServicePortal};

pub struct PortalCommand {
    portal: LoggingPortal,
}

impl PortalCommand {
    pub fn new(url: &str) -> Self {
        Self {
            portal: LoggingPortal::new(url),
        }
    }
}

impl Command for PortalCommand {
    async fn execute(&self) -> Result<()> {
        self.portal.open();
        println!("🔗 Manage subscriptions at {}", self.portal.url());
        Ok(())
    }
}
