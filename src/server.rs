use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, ApiResponse};

/// Shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/token/create", post(public::token_create))
        // Protected API
        .merge(employee_routes(state.clone()));

    if state.config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn employee_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/employees",
            get(protected::employee_list).post(protected::employee_create),
        )
        .route("/api/employees/shortlist", get(protected::employee_short_list))
        .route(
            "/api/employees/:id",
            get(protected::employee_get)
                .put(protected::employee_update)
                .delete(protected::employee_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> ApiResponse<Value> {
    ApiResponse::success(
        "EMS API",
        json!({
            "name": "EMS API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Employee management backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "token": "/api/token/create (public - token acquisition)",
                "employees": "/api/employees[/shortlist|/:id] (protected)",
            }
        }),
    )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => ApiResponse::success(
            "ok",
            json!({
                "status": "ok",
                "timestamp": now,
                "database": state.db.backend_name()
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiResponse::with_status(
                "database unavailable",
                json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": state.db.backend_name()
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}

/// Bind `0.0.0.0:<port>` and serve until the process stops
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("EMS API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
