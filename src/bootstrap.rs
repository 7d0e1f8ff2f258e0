//! Wire an application together: storage, schema, routers from a directory, middleware.

use crate::config::{load_router_specs, Settings};
use crate::error::{AppError, ConfigError};
use crate::model::Entity;
use crate::registry::ModelRegistry;
use crate::routes::{common_routes, common_routes_with_ready};
use crate::store::{Storage, DEFAULT_MAX_CONNECTIONS};
use axum::Router;
use std::collections::HashSet;
use std::path::Path;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application under construction.
///
/// ```rust,ignore
/// let mut app = App::new();
/// app.register::<Author>()?.register::<Book>()?;
/// app.configure_storage("sqlite::memory:", None).await?;
/// app.include_routers(Path::new("routers"))?;
/// axum::serve(listener, app.with_cors().into_router()).await?;
/// ```
pub struct App {
    registry: ModelRegistry,
    storage: Option<Storage>,
    router: Router,
    prefixes: HashSet<String>,
    cors: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            registry: ModelRegistry::new(),
            storage: None,
            router: Router::new(),
            prefixes: HashSet::new(),
            cors: false,
        }
    }

    pub fn register<E: Entity>(&mut self) -> Result<&mut Self, ConfigError> {
        self.registry.register::<E>()?;
        Ok(self)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    pub async fn configure_storage(&mut self, url: &str, models: Option<&[&str]>) -> Result<Storage, AppError> {
        self.configure_storage_with(url, models, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Connect to `url` and create the tables of the registered models, or of the named subset.
    pub async fn configure_storage_with(
        &mut self,
        url: &str,
        models: Option<&[&str]>,
        max_connections: u32,
    ) -> Result<Storage, AppError> {
        let tables = self.registry.tables(models)?;
        let storage = Storage::connect_with(url, max_connections).await?;
        storage.generate_schemas(&tables).await?;
        self.storage = Some(storage.clone());
        Ok(storage)
    }

    /// Mount one router per definition file in `dir`. Returns how many were mounted.
    ///
    /// Mount order follows the directory listing, which is platform dependent.
    /// On error nothing from `dir` is mounted.
    pub fn include_routers(&mut self, dir: &Path) -> Result<usize, ConfigError> {
        let storage = self.storage.clone().ok_or(ConfigError::StorageMissing)?;
        let specs = load_router_specs(dir)?;
        let mut prefixes = self.prefixes.clone();
        let mut mounted = Router::new();
        for (path, spec) in &specs {
            let mount = self.registry.router(storage.clone(), spec)?;
            if !prefixes.insert(mount.prefix.clone()) {
                return Err(ConfigError::Validation(format!(
                    "{}: prefix '{}' is already mounted",
                    path.display(),
                    mount.prefix
                )));
            }
            tracing::info!(file = %path.display(), model = %spec.model, prefix = %mount.prefix, "router included");
            mounted = mounted.merge(mount.router);
        }
        self.prefixes = prefixes;
        self.router = std::mem::take(&mut self.router).merge(mounted);
        Ok(specs.len())
    }

    /// Merge a hand-built router (custom endpoints next to the generated ones).
    pub fn include_router(&mut self, router: Router) -> &mut Self {
        self.router = std::mem::take(&mut self.router).merge(router);
        self
    }

    /// Allow any origin, method and header, with credentials (origin is mirrored).
    pub fn with_cors(&mut self) -> &mut Self {
        self.cors = true;
        self
    }

    /// Storage, schema, routers and CORS from process settings.
    pub async fn setup(&mut self, settings: &Settings) -> Result<(), AppError> {
        let models: Option<Vec<&str>> = settings
            .models
            .as_ref()
            .map(|names| names.iter().map(String::as_str).collect());
        self.configure_storage_with(&settings.database_url, models.as_deref(), settings.max_connections)
            .await?;
        self.include_routers(&settings.routers_dir)?;
        self.with_cors();
        Ok(())
    }

    /// Final router: mounted CRUD routers, health/readiness/version, request tracing.
    pub fn into_router(self) -> Router {
        let common = match &self.storage {
            Some(storage) => common_routes_with_ready(storage.clone()),
            None => common_routes(),
        };
        let app = self.router.merge(common).layer(TraceLayer::new_for_http());
        if self.cors {
            app.layer(CorsLayer::very_permissive())
        } else {
            app
        }
    }
}
