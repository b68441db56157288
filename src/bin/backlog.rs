use backlog_api::cli::client::ClientError;
use backlog_api::cli::Cli;
use backlog_api::database::RecordError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("BACKLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = backlog_api::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        let field_errors = match (e.downcast_ref::<ClientError>(), e.downcast_ref::<RecordError>()) {
            (Some(err), _) => Some(&err.field_errors),
            (None, Some(err)) => Some(&err.field_errors),
            _ => None,
        };
        for (field, message) in field_errors.into_iter().flatten() {
            eprintln!("  {}: {}", field, message);
        }
        std::process::exit(1);
    }

    Ok(())
}
