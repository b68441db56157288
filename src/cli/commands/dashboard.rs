use crate::cli::config::CliConfig;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

pub async fn handle(session: &CliConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = super::authed_client(session)?;
    let stats = client.dashboard().await?;

    output_value(&output_format, &stats, |stats| {
        if let Some(username) = &session.username {
            println!("Dashboard for {}", username);
        }
        println!("Backlogs: {}", stats.backlogs);
        println!("Epics:    {}", stats.epics);
        println!("PBIs:     {}", stats.pbis);
    })
}
