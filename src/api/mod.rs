use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::config;
use crate::database::SharedStore;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};

/// Full application router over the given store.
pub fn router(store: SharedStore) -> Router {
    let app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes())
        .layer(DefaultBodyLimit::max(config().api.max_request_size_bytes));

    let app = match cors_layer() {
        Some(cors) => app.layer(cors),
        None => app,
    };
    let app = if config().api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    };

    app.layer(ServiceBuilder::new().layer(Extension(store)))
}

fn auth_public_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes() -> Router {
    use protected::{auth, backlogs, dashboard, epics, pbis};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/dashboard", get(dashboard::dashboard_get))
        .route(
            "/api/backlogs",
            get(backlogs::backlogs_get).post(backlogs::backlogs_post),
        )
        .route(
            "/api/backlogs/:id",
            get(backlogs::backlog_get)
                .put(backlogs::backlog_put)
                .delete(backlogs::backlog_delete),
        )
        .route("/api/epics", get(epics::epics_get).post(epics::epics_post))
        .route(
            "/api/epics/:id",
            get(epics::epic_get).put(epics::epic_put).delete(epics::epic_delete),
        )
        .route("/api/pbis", get(pbis::pbis_get).post(pbis::pbis_post))
        .route(
            "/api/pbis/:id",
            get(pbis::pbi_get).put(pbis::pbi_put).delete(pbis::pbi_delete),
        )
        // Layers run bottom-up: the JWT is checked before the user lookup
        .route_layer(from_fn(validate_user_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer() -> Option<CorsLayer> {
    let security = &config().security;
    if !security.enable_cors {
        return None;
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if security.cors_origins.iter().any(|o| o == "*") || security.cors_origins.is_empty() {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    Some(layer.allow_origin(origins))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Backlog API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Product backlog, epic and PBI management",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "dashboard": "/api/dashboard (protected)",
                "backlogs": "/api/backlogs[/:id] (protected)",
                "epics": "/api/epics[/:id] (protected)",
                "pbis": "/api/pbis[/:id] (protected)",
            }
        }
    }))
}

async fn health(Extension(store): Extension<SharedStore>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
