#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use backlog_api::cli::client::ApiClient;
use backlog_api::config::AppConfig;
use backlog_api::database::models::{Backlog, BacklogForm, Epic, EpicForm, Pbi, PbiForm, User};
use backlog_api::database::{DatabaseManager, MemoryStore, PgStore, SharedStore};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

/// Migrated Postgres store from `DATABASE_URL`, or `None` when it is unset.
pub async fn pg_store() -> Result<Option<Arc<PgStore>>> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping Postgres test");
            return Ok(None);
        }
    };

    let mut config = AppConfig::development().database;
    config.url = Some(url);
    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(Arc::new(PgStore::new(pool))))
}

/// Username unique across runs against a shared database.
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// API server over a store of the test's choosing, served from the test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    /// Server over a fresh in-memory store.
    pub async fn start() -> Result<Self> {
        Self::start_with(Arc::new(MemoryStore::new())).await
    }

    pub async fn start_with(store: SharedStore) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let app = backlog_api::api::router(store);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone(), None).expect("client")
    }

    /// Registers `username` and returns a client holding its token.
    pub async fn user(&self, username: &str) -> Result<(ApiClient, User)> {
        let anonymous = self.client();
        anonymous.register(username, PASSWORD).await?;
        let session = anonymous.login(username, PASSWORD).await?;
        Ok((anonymous.with_token(session.token), session.user))
    }

    /// Registers `username` and returns the raw bearer token.
    pub async fn token(&self, username: &str) -> Result<String> {
        let anonymous = self.client();
        anonymous.register(username, PASSWORD).await?;
        Ok(anonymous.login(username, PASSWORD).await?.token)
    }
}

/// Sends a request with an optional bearer token and JSON body, returning
/// the status and parsed body.
pub async fn call(
    method: reqwest::Method,
    url: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut request = reqwest::Client::new().request(method, url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }
    let res = request.send().await?;
    let status = res.status();
    let text = res.text().await?;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok((status, value))
}

pub async fn backlog(client: &ApiClient, title: &str) -> Result<Backlog> {
    client
        .create_backlog(&BacklogForm {
            title: Some(title.to_string()),
            description: None,
        })
        .await
}

pub async fn epic(client: &ApiClient, backlog_id: Uuid, title: &str) -> Result<Epic> {
    client
        .create_epic(&EpicForm {
            title: Some(title.to_string()),
            description: None,
            backlog_id: Some(backlog_id.to_string()),
        })
        .await
}

pub fn pbi_form(backlog_id: Uuid, title: &str, priority: &str, points: Value, epic_id: Option<Uuid>) -> PbiForm {
    serde_json::from_value(json!({
        "pic": "dana",
        "title": title,
        "priority": priority,
        "storyPoint": points,
        "businessValue": "Customers can finish checkout",
        "userStory": format!("As a customer I want {}", title),
        "acceptanceCriteria": "Works end to end",
        "epicId": epic_id.map(|id| id.to_string()),
        "productBacklogListId": backlog_id.to_string(),
    }))
    .expect("pbi form")
}

pub async fn pbi(client: &ApiClient, backlog_id: Uuid, title: &str, epic_id: Option<Uuid>) -> Result<Pbi> {
    client
        .create_pbi(&pbi_form(backlog_id, title, "Medium", json!(3), epic_id))
        .await
}
