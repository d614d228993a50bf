use anyhow::Result;
use clap::Parser;
use tracing::Instrument;

use panel_monitor::cli::commands::config::ConfigCommand;
use panel_monitor::cli::commands::demo::DemoCommand;
use panel_monitor::cli::commands::portal::PortalCommand;
use panel_monitor::cli::commands::shops::ShopsCommand;
use panel_monitor::cli::commands::verify::VerifyCommand;
use panel_monitor::cli::commands::Command;
use panel_monitor::cli::{Cli, Commands};
use panel_monitor::{
    config, create_command_span, generate_correlation_id, init_telemetry, PanelMonitorConfig,
};

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Verify { .. } => "verify",
        Commands::Demo { .. } => "demo",
        Commands::Shops { .. } => "shops",
        Commands::Portal => "portal",
        Commands::Config { .. } => "config",
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    let config = config()?.clone();

    match command {
        Commands::Verify { outcome, format } => {
            VerifyCommand::new(config)
                .with_outcome(outcome)
                .with_format(format)
                .execute()
                .await
        }
        Commands::Demo { format } => DemoCommand::new(config, format).execute().await,
        Commands::Shops {
            file,
            enable,
            verify,
            tab,
            format,
        } => {
            let command = ShopsCommand {
                file,
                enable,
                verify,
                tab: tab.map(Into::into),
                format,
                ..ShopsCommand::new(config)
            };
            command.execute().await
        }
        Commands::Portal => PortalCommand::new(&config.portal.url).execute().await,
        Commands::Config { save } => ConfigCommand { config, save }.execute().await,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env has to be applied before the global config reads the environment;
    // the outcome is logged once telemetry is up.
    let env_file = PanelMonitorConfig::load_env_file();
    init_telemetry(&config()?.observability)?;
    match env_file {
        Ok(true) => tracing::info!("Loaded environment variables from .env file"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let correlation_id = generate_correlation_id();
    let span = create_command_span(command_name(&cli.command), &correlation_id);

    tokio::runtime::Runtime::new()?.block_on(dispatch(cli.command).instrument(span))
}
