//! Five-endpoint REST router for one entity type.

use crate::handlers::crud::{create, delete as delete_handler, list, read, update};
use crate::model::Entity;
use crate::service::Crud;
use crate::state::CrudState;
use axum::{routing::get, Router};
use serde::Serialize;
use std::any::type_name;

/// One mounted endpoint, for documentation and startup logs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: String,
    pub request: Option<&'static str>,
    pub response: &'static str,
    pub tags: Vec<String>,
}

/// Builds `POST /`, `GET /`, `GET /:id`, `PUT /:id`, `DELETE /:id` for entity `E` under a prefix.
///
/// ```rust,ignore
/// let router = CrudRouter::new(Crud::<Book>::new(storage))
///     .prefix("/books")
///     .tags(["books"])
///     .into_router();
/// ```
pub struct CrudRouter<E> {
    state: CrudState<E>,
    prefix: String,
    tags: Vec<String>,
}

impl<E: Entity> CrudRouter<E> {
    /// Router mounted at `/<table name>` with the default paging bounds.
    pub fn new(crud: Crud<E>) -> Self {
        let prefix = format!("/{}", E::table().name());
        Self {
            state: CrudState::new(crud),
            prefix,
            tags: Vec::new(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = normalize_prefix(&prefix.into());
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Page size used when a list request gives none.
    pub fn limit(mut self, limit: u64) -> Self {
        self.state.default_limit = limit;
        self
    }

    /// Upper bound applied to every list request.
    pub fn max_limit(mut self, max_limit: u64) -> Self {
        self.state.max_limit = max_limit;
        self
    }

    pub fn path_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        let read = type_name::<E::Read>();
        let write = type_name::<E::Write>();
        let base = if self.prefix == "/" { "" } else { self.prefix.as_str() };
        let item = format!("{}/:id", base);
        let collection = if base.is_empty() { "/".to_string() } else { base.to_string() };
        let route = |method, path: &str, request, response| RouteInfo {
            method,
            path: path.to_string(),
            request,
            response,
            tags: self.tags.clone(),
        };
        vec![
            route("POST", &collection, Some(write), read),
            route("GET", &collection, None, read),
            route("GET", &item, None, read),
            route("PUT", &item, Some(write), read),
            route("DELETE", &item, None, "bool"),
        ]
    }

    pub fn into_router(self) -> Router {
        for r in self.routes() {
            tracing::info!(method = r.method, path = %r.path, response = r.response, "route mounted");
        }
        let inner = Router::new()
            .route("/", get(list::<E>).post(create::<E>))
            .route("/:id", get(read::<E>).put(update::<E>).delete(delete_handler::<E>))
            .with_state(self.state);
        if self.prefix == "/" {
            inner
        } else {
            Router::new().nest(&self.prefix, inner)
        }
    }
}

/// Leading slash, no trailing slash; empty means root.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
