use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{clear_saved_session, save_cli_config, CliConfig};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login to server and save the session")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the saved token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, mut session: CliConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { username, password } => {
            let password = read_password(password)?;
            let client = ApiClient::new(session.server_url.clone(), None)?;
            let user = client.register(&username, &password).await?;
            output_success(
                &output_format,
                &format!("Registered user '{}'", user.username),
                Some(serde_json::to_value(&user)?),
            )
        }
        AuthCommands::Login { username, password } => {
            let password = read_password(password)?;
            let client = ApiClient::new(session.server_url.clone(), None)?;
            let login = client.login(&username, &password).await?;

            session.login(&login.user.username, login.token);
            save_cli_config(&session)?;

            output_success(
                &output_format,
                &format!("Logged in as '{}' on {}", login.user.username, session.server_url),
                Some(json!({
                    "username": login.user.username,
                    "server": session.server_url,
                    "expires_in": login.expires_in,
                })),
            )
        }
        AuthCommands::Logout => {
            clear_saved_session()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let status = json!({
                "server": session.server_url,
                "logged_in": session.token.is_some(),
                "username": session.username,
                "logged_in_at": session.logged_in_at,
            });
            output_value(&output_format, &status, |_| match (&session.username, session.logged_in_at) {
                (Some(username), Some(at)) => {
                    println!("Logged in as {} on {} since {}", username, session.server_url, format_date_time(at))
                }
                _ => println!("Not logged in ({})", session.server_url),
            })
        }
        AuthCommands::Whoami => {
            let client = super::authed_client(&session)?;
            let user = client.whoami().await?;
            output_value(&output_format, &user, |user| {
                println!("Username: {}", user.username);
                println!("ID:       {}", user.id);
                println!("Joined:   {}", format_date(user.created_at));
            })
        }
    }
}
