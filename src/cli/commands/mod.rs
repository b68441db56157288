pub mod auth;
pub mod backlogs;
pub mod dashboard;
pub mod epics;
pub mod pbis;

use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::config::CliConfig;

/// Client for commands that need a logged-in session.
pub(crate) fn authed_client(session: &CliConfig) -> anyhow::Result<ApiClient> {
    let token = session.require_token()?;
    Ok(ApiClient::new(session.server_url.clone(), Some(token.to_string()))?)
}

pub(crate) fn parse_id(kind: &str, value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| anyhow::anyhow!("Invalid {} id: {}", kind, value))
}
