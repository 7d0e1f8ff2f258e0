//! CRUD accessor for localized entities: lookups and listings scoped by language tag.

use crate::error::AppError;
use crate::model::{LocalizedEntity, LANG_COLUMN};
use crate::service::criteria::{Criteria, ListParams};
use crate::service::crud::Crud;
use crate::store::Storage;
use std::ops::Deref;

/// [`Crud`] plus language-aware variants of its lookups.
///
/// Every base operation stays reachable through `Deref`; the methods defined here shadow
/// the base ones of the same name and take an extra `lang`. `None` applies no language filter.
pub struct LocalizedCrud<E> {
    base: Crud<E>,
}

impl<E> Clone for LocalizedCrud<E> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<E> Deref for LocalizedCrud<E> {
    type Target = Crud<E>;

    fn deref(&self) -> &Crud<E> {
        &self.base
    }
}

impl<E: LocalizedEntity> LocalizedCrud<E> {
    pub fn new(storage: Storage) -> Self {
        Self {
            base: Crud::new(storage),
        }
    }

    pub fn base(&self) -> &Crud<E> {
        &self.base
    }

    /// Row with this id, absent when its language tag differs from `lang`.
    pub async fn get_by_id(&self, id: i64, lang: Option<&str>) -> Result<Option<E::Read>, AppError> {
        self.base.get_by(&scoped(Criteria::id(id), lang)).await
    }

    pub async fn get_by(&self, criteria: &Criteria, lang: Option<&str>) -> Result<Option<E::Read>, AppError> {
        self.base.get_by(&scoped(criteria.clone(), lang)).await
    }

    pub async fn get_all(
        &self,
        params: &ListParams,
        extra_filters: &Criteria,
        lang: Option<&str>,
    ) -> Result<Vec<E::Read>, AppError> {
        self.base
            .get_all(params, &scoped(extra_filters.clone(), lang))
            .await
    }

    pub async fn filter_by(&self, criteria: &Criteria, lang: Option<&str>) -> Result<Option<Vec<E::Read>>, AppError> {
        self.base.filter_by(&scoped(criteria.clone(), lang)).await
    }

    pub async fn count(&self, criteria: &Criteria, lang: Option<&str>) -> Result<u64, AppError> {
        self.base.count(&scoped(criteria.clone(), lang)).await
    }
}

/// Add the language condition, overriding any `tuple_lang` already in `criteria`.
pub(crate) fn scoped(criteria: Criteria, lang: Option<&str>) -> Criteria {
    match lang {
        Some(lang) => criteria.eq(LANG_COLUMN, lang),
        None => criteria,
    }
}
