use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const SESSION_FILE: &str = "session.json";

/// Persisted CLI session: which server to talk to and the current token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    pub server_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            username: None,
            logged_in_at: None,
        }
    }
}

impl CliConfig {
    pub fn login(&mut self, username: &str, token: String) {
        self.username = Some(username.to_string());
        self.token = Some(token);
        self.logged_in_at = Some(Utc::now());
    }

    pub fn logout(&mut self) {
        self.username = None;
        self.token = None;
        self.logged_in_at = None;
    }

    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `backlog auth login <username>` first"))
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("BACKLOG_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("backlog").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_cli_config_from(dir: &Path) -> anyhow::Result<CliConfig> {
    let session_file = dir.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(session_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_cli_config_to(dir: &Path, config: &CliConfig) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}

/// Forgets the token in the saved session. The saved server is kept, so a
/// one-off `--server` never ends up on disk.
pub fn clear_saved_session_in(dir: &Path) -> anyhow::Result<CliConfig> {
    let mut saved = load_cli_config_from(dir)?;
    saved.logout();
    save_cli_config_to(dir, &saved)?;
    Ok(saved)
}

pub fn clear_saved_session() -> anyhow::Result<CliConfig> {
    clear_saved_session_in(&get_config_dir()?)
}

pub fn load_cli_config() -> anyhow::Result<CliConfig> {
    load_cli_config_from(&get_config_dir()?)
}

pub fn save_cli_config(config: &CliConfig) -> anyhow::Result<()> {
    save_cli_config_to(&get_config_dir()?, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_cli_config_from(dir.path()).unwrap();
        assert!(config.token.is_none());
        assert!(config.require_token().is_err());
    }

    #[test]
    fn session_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig {
            server_url: "http://127.0.0.1:4000".to_string(),
            ..CliConfig::default()
        };
        config.login("dana", "token-123".to_string());
        save_cli_config_to(dir.path(), &config).unwrap();

        let loaded = load_cli_config_from(dir.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.require_token().unwrap(), "token-123");

        let mut loaded = loaded;
        loaded.logout();
        assert!(loaded.username.is_none());
    }

    #[test]
    fn logout_keeps_the_saved_server() {
        let dir = tempfile::tempdir().unwrap();
        let mut saved = CliConfig {
            server_url: "http://127.0.0.1:4000".to_string(),
            ..CliConfig::default()
        };
        saved.login("dana", "token-123".to_string());
        save_cli_config_to(dir.path(), &saved).unwrap();

        let cleared = clear_saved_session_in(dir.path()).unwrap();
        assert_eq!(cleared.server_url, "http://127.0.0.1:4000");
        assert!(cleared.token.is_none());

        let loaded = load_cli_config_from(dir.path()).unwrap();
        assert_eq!(loaded, cleared);
    }

    #[test]
    fn defaults_point_at_the_local_server() {
        let dir = tempfile::tempdir().unwrap();
        let cleared = clear_saved_session_in(dir.path()).unwrap();
        assert_eq!(cleared.server_url, DEFAULT_SERVER_URL);
    }
}
