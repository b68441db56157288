use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use crate::cli::config::CliConfig;
use crate::database::models::{
    Backlog, BacklogForm, DashboardStats, Epic, EpicForm, EpicWithBacklog, Pbi, PbiForm,
    PbiWithDetails, User,
};
use crate::filter::ListFilter;

/// Non-success response from the API, with the server's message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} ({status})")]
pub struct ClientError {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    field_errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    pub token: String,
    pub user: User,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deleted {
    pub message: String,
}

/// Everything the backlog detail view shows, fetched in one round.
#[derive(Debug, Clone)]
pub struct BacklogView {
    pub backlog: Backlog,
    pub pbis: Vec<PbiWithDetails>,
    pub epics: Vec<EpicWithBacklog>,
}

/// Typed client for the backlog HTTP API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("backlog-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &CliConfig) -> anyhow::Result<Self> {
        Self::new(config.server_url.clone(), config.token.clone())
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            let envelope: Envelope<T> = response.json().await?;
            return Ok(envelope.data);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        tracing::debug!("{} failed with {}: {}", url, status, text);
        Err(ClientError {
            status,
            code: body.code,
            message: body.message.unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("Request failed").to_string()
                } else {
                    text
                }
            }),
            field_errors: body.field_errors,
        }
        .into())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<T> {
        self.request::<T, ()>(Method::GET, path, query, None).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        self.request(method, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<Deleted> {
        self.request::<Deleted, ()>(Method::DELETE, path, &[], None).await
    }

    pub async fn health(&self) -> anyhow::Result<serde_json::Value> {
        self.get("/health", &[]).await
    }

    // Auth

    pub async fn register(&self, username: &str, password: &str) -> anyhow::Result<User> {
        self.send(
            Method::POST,
            "/auth/register",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<LoginSession> {
        self.send(
            Method::POST,
            "/auth/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn whoami(&self) -> anyhow::Result<User> {
        self.get("/api/auth/whoami", &[]).await
    }

    pub async fn dashboard(&self) -> anyhow::Result<DashboardStats> {
        self.get("/api/dashboard", &[]).await
    }

    // Backlogs

    pub async fn list_backlogs(&self) -> anyhow::Result<Vec<Backlog>> {
        self.get("/api/backlogs", &[]).await
    }

    pub async fn get_backlog(&self, id: Uuid) -> anyhow::Result<Backlog> {
        self.get(&format!("/api/backlogs/{}", id), &[]).await
    }

    pub async fn create_backlog(&self, form: &BacklogForm) -> anyhow::Result<Backlog> {
        self.send(Method::POST, "/api/backlogs", form).await
    }

    pub async fn update_backlog(&self, id: Uuid, form: &BacklogForm) -> anyhow::Result<Backlog> {
        self.send(Method::PUT, &format!("/api/backlogs/{}", id), form).await
    }

    pub async fn delete_backlog(&self, id: Uuid) -> anyhow::Result<Deleted> {
        self.delete(&format!("/api/backlogs/{}", id)).await
    }

    // Epics

    pub async fn list_epics(&self, backlog_id: Option<Uuid>) -> anyhow::Result<Vec<EpicWithBacklog>> {
        let query: Vec<(&str, String)> = backlog_id
            .map(|id| vec![("backlogId", id.to_string())])
            .unwrap_or_default();
        self.get("/api/epics", &query).await
    }

    pub async fn get_epic(&self, id: Uuid) -> anyhow::Result<EpicWithBacklog> {
        self.get(&format!("/api/epics/{}", id), &[]).await
    }

    pub async fn create_epic(&self, form: &EpicForm) -> anyhow::Result<Epic> {
        self.send(Method::POST, "/api/epics", form).await
    }

    pub async fn update_epic(&self, id: Uuid, form: &EpicForm) -> anyhow::Result<Epic> {
        self.send(Method::PUT, &format!("/api/epics/{}", id), form).await
    }

    pub async fn delete_epic(&self, id: Uuid) -> anyhow::Result<Deleted> {
        self.delete(&format!("/api/epics/{}", id)).await
    }

    // PBIs

    /// `order` is passed through for server-side sorting, e.g. `"priority asc"`.
    pub async fn list_pbis(&self, filter: &ListFilter, order: Option<&str>) -> anyhow::Result<Vec<PbiWithDetails>> {
        let mut query = filter.to_query_pairs();
        if let Some(order) = order {
            query.push(("order", order.to_string()));
        }
        self.get("/api/pbis", &query).await
    }

    pub async fn get_pbi(&self, id: Uuid) -> anyhow::Result<PbiWithDetails> {
        self.get(&format!("/api/pbis/{}", id), &[]).await
    }

    pub async fn create_pbi(&self, form: &PbiForm) -> anyhow::Result<Pbi> {
        self.send(Method::POST, "/api/pbis", form).await
    }

    pub async fn update_pbi(&self, id: Uuid, form: &PbiForm) -> anyhow::Result<Pbi> {
        self.send(Method::PUT, &format!("/api/pbis/{}", id), form).await
    }

    pub async fn delete_pbi(&self, id: Uuid) -> anyhow::Result<Deleted> {
        self.delete(&format!("/api/pbis/{}", id)).await
    }

    /// Backlog, its PBIs and its epics, requested concurrently.
    pub async fn backlog_view(&self, backlog_id: Uuid) -> anyhow::Result<BacklogView> {
        let pbi_filter = ListFilter::backlog(backlog_id);
        let (backlog, pbis, epics) = futures::try_join!(
            self.get_backlog(backlog_id),
            self.list_pbis(&pbi_filter, None),
            self.list_epics(Some(backlog_id)),
        )?;
        Ok(BacklogView { backlog, pbis, epics })
    }
}

/// HTTP status of a failed client call, if the failure came from the server.
pub fn error_status(err: &anyhow::Error) -> Option<StatusCode> {
    err.downcast_ref::<ClientError>().map(|e| e.status)
}
