//! Declarative CRUD microservice core: entity tables, generic accessors, REST routers, bootstrap.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod registry;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use bootstrap::App;
pub use config::{load_router_specs, RouterSpec, Settings};
pub use error::{AppError, ConfigError};
pub use model::{Column, ColumnKind, Entity, LocalizedEntity, Table};
pub use registry::{CrudMount, ModelRegistry};
pub use response::{success_one, success_one_ok, success_page, PageMeta};
pub use routes::{common_routes, common_routes_with_ready, CrudRouter, RouteInfo};
pub use service::{Criteria, Crud, ListParams, LocalizedCrud};
pub use store::Storage;
