//! Safe SQL builder and parameter binding.

mod builder;
mod params;

pub use builder::{count, create_table, delete, insert, select, select_where_in, update, Dialect, Filter, QueryBuf};
pub use params::{bind_all, BindValue};
