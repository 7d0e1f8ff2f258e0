//! Per-entity router state.

use crate::service::{Crud, DEFAULT_LIMIT};

pub const DEFAULT_MAX_LIMIT: u64 = 1000;

/// Accessor plus the paging bounds of one mounted router.
pub struct CrudState<E> {
    pub crud: Crud<E>,
    pub default_limit: u64,
    pub max_limit: u64,
}

impl<E> Clone for CrudState<E> {
    fn clone(&self) -> Self {
        Self {
            crud: self.crud.clone(),
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

impl<E> CrudState<E> {
    pub fn new(crud: Crud<E>) -> Self {
        Self {
            crud,
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    /// Requested limit, or the default, clamped to the maximum.
    pub fn clamp_limit(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Entity, Table};
    use crate::store::Storage;

    struct Thing;
    static THINGS: Table = Table::new("things", &[Column::text("name")]);

    impl Entity for Thing {
        type Read = serde_json::Value;
        type Write = serde_json::Value;

        fn table() -> &'static Table {
            &THINGS
        }
    }

    #[tokio::test]
    async fn limit_defaults_and_clamps() {
        let storage = Storage::connect("sqlite::memory:").await.unwrap();
        let mut state = CrudState::new(Crud::<Thing>::new(storage));
        assert_eq!(state.clamp_limit(None), 50);
        assert_eq!(state.clamp_limit(Some(5000)), 1000);
        state.max_limit = 20;
        assert_eq!(state.clamp_limit(None), 20);
        assert_eq!(state.clamp_limit(Some(0)), 0);
    }
}
