//! Typed CRUD accessors over the SQL builder.

mod criteria;
mod crud;
mod localized;

pub use criteria::{Criteria, ListParams, DEFAULT_LIMIT};
pub use crud::Crud;
pub use localized::LocalizedCrud;
pub(crate) use localized::scoped;
