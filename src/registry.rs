//! Registered entity types: their tables and how to build their routers.

use crate::config::RouterSpec;
use crate::error::ConfigError;
use crate::model::{Entity, Table};
use crate::routes::CrudRouter;
use crate::service::Crud;
use crate::store::Storage;
use axum::Router;
use std::sync::Arc;

type RouterFactory = Arc<dyn Fn(Storage, &RouterSpec) -> CrudMount + Send + Sync>;

/// A built router together with the prefix it is mounted under.
pub struct CrudMount {
    pub prefix: String,
    pub router: Router,
}

#[derive(Clone)]
struct ModelEntry {
    table: &'static Table,
    factory: RouterFactory,
}

/// Entity types known to the application, in registration order, keyed by table name.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelEntry>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E: Entity>(&mut self) -> Result<(), ConfigError> {
        let table = E::table();
        if self.table(table.name()).is_some() {
            return Err(ConfigError::Validation(format!(
                "model '{}' registered twice",
                table.name()
            )));
        }
        let factory: RouterFactory = Arc::new(|storage: Storage, spec: &RouterSpec| {
            let mut router = CrudRouter::new(Crud::<E>::new(storage)).tags(spec.tags.clone());
            if let Some(prefix) = &spec.prefix {
                router = router.prefix(prefix.as_str());
            }
            if let Some(limit) = spec.limit {
                router = router.limit(limit);
            }
            if let Some(max) = spec.max_limit {
                router = router.max_limit(max);
            }
            CrudMount {
                prefix: router.path_prefix().to_string(),
                router: router.into_router(),
            }
        });
        self.models.push(ModelEntry { table, factory });
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.table.name()).collect()
    }

    pub fn table(&self, name: &str) -> Option<&'static Table> {
        self.models
            .iter()
            .find(|m| m.table.name() == name)
            .map(|m| m.table)
    }

    /// Tables to create: every registered one, or only the named subset.
    pub fn tables(&self, only: Option<&[&str]>) -> Result<Vec<&'static Table>, ConfigError> {
        match only {
            None => Ok(self.models.iter().map(|m| m.table).collect()),
            Some(names) => names
                .iter()
                .map(|n| self.table(n).ok_or_else(|| ConfigError::UnknownModel(n.to_string())))
                .collect(),
        }
    }

    /// Build the router a definition file asks for.
    pub fn router(&self, storage: Storage, spec: &RouterSpec) -> Result<CrudMount, ConfigError> {
        let entry = self
            .models
            .iter()
            .find(|m| m.table.name() == spec.model)
            .ok_or_else(|| ConfigError::UnknownModel(spec.model.clone()))?;
        Ok((entry.factory)(storage, spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    struct Shelf;
    static SHELVES: Table = Table::new("shelves", &[Column::text("label")]);

    impl Entity for Shelf {
        type Read = serde_json::Value;
        type Write = serde_json::Value;

        fn table() -> &'static Table {
            &SHELVES
        }
    }

    #[test]
    fn registers_once() {
        let mut registry = ModelRegistry::new();
        registry.register::<Shelf>().unwrap();
        assert!(registry.register::<Shelf>().is_err());
        assert_eq!(registry.names(), vec!["shelves"]);
    }

    #[test]
    fn table_selection() {
        let mut registry = ModelRegistry::new();
        registry.register::<Shelf>().unwrap();
        assert_eq!(registry.tables(None).unwrap().len(), 1);
        assert_eq!(registry.tables(Some(&["shelves"])).unwrap().len(), 1);
        assert!(matches!(
            registry.tables(Some(&["books"])),
            Err(ConfigError::UnknownModel(name)) if name == "books"
        ));
    }

    #[tokio::test]
    async fn router_prefix_defaults_to_model_name() {
        let storage = Storage::connect("sqlite::memory:").await.unwrap();
        let mut registry = ModelRegistry::new();
        registry.register::<Shelf>().unwrap();

        let mount = registry.router(storage.clone(), &RouterSpec::new("shelves")).unwrap();
        assert_eq!(mount.prefix, "/shelves");

        let spec = RouterSpec {
            prefix: Some("api/shelves/".into()),
            ..RouterSpec::new("shelves")
        };
        assert_eq!(registry.router(storage.clone(), &spec).unwrap().prefix, "/api/shelves");
        assert!(registry.router(storage, &RouterSpec::new("books")).is_err());
    }
}
