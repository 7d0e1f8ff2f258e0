//! Route builders: per-entity CRUD routers and common service routes.

pub mod common;
pub mod crud;

pub use common::{common_routes, common_routes_with_ready};
pub use crud::{CrudRouter, RouteInfo};
