pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "backlog")]
#[command(about = "Backlog CLI - manage product backlogs, epics and PBIs")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "BACKLOG_API_URL", help = "Server URL (overrides the saved session)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Registration, login and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Show totals for the current user")]
    Dashboard,

    #[command(about = "Product backlog lists")]
    Backlogs {
        #[command(subcommand)]
        cmd: commands::backlogs::BacklogCommands,
    },

    #[command(about = "Epics grouping PBIs inside a backlog")]
    Epics {
        #[command(subcommand)]
        cmd: commands::epics::EpicCommands,
    },

    #[command(about = "Product backlog items")]
    Pbis {
        #[command(subcommand)]
        cmd: commands::pbis::PbiCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let mut session = config::load_cli_config()?;
    if let Some(server) = cli.server {
        session.server_url = server;
    }

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, session, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(&session, output_format).await,
        Commands::Backlogs { cmd } => commands::backlogs::handle(cmd, &session, output_format).await,
        Commands::Epics { cmd } => commands::epics::handle(cmd, &session, output_format).await,
        Commands::Pbis { cmd } => commands::pbis::handle(cmd, &session, output_format).await,
    }
}
