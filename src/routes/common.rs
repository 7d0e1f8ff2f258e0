//! Service routes mounted next to the entity routers: liveness, readiness, build info.

use crate::sql::Dialect;
use crate::store::Storage;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    database: &'static str,
    dialect: &'static str,
}

fn dialect_name(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres => "postgres",
        Dialect::Sqlite => "sqlite",
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// 503 while the database does not answer a trivial query.
async fn ready(State(storage): State<Storage>) -> impl IntoResponse {
    let dialect = dialect_name(storage.dialect());
    match storage.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                status: "ok",
                database: "ok",
                dialect,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "degraded",
                    database: "unavailable",
                    dialect,
                }),
            )
        }
    }
}

async fn version() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /health` and `GET /version`.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}

/// [`common_routes`] plus `GET /ready`, which pings `storage`.
pub fn common_routes_with_ready(storage: Storage) -> Router {
    common_routes().merge(Router::new().route("/ready", get(ready)).with_state(storage))
}
