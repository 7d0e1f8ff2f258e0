//! Entity CRUD handlers: create, list, read, update, delete.
//!
//! Every handler is generic over the entity, so axum's extractors validate
//! the path, query and body against that entity's own read and write views.

use crate::error::AppError;
use crate::model::{Entity, Table, ID_COLUMN};
use crate::response::{success_one, success_one_ok, success_page};
use crate::service::{scoped, Criteria, ListParams};
use crate::state::CrudState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub prefetch: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Language filter for localized tables; asking for one elsewhere is a bad request.
fn lang_filter(table: &Table, lang: Option<&str>) -> Result<Criteria, AppError> {
    if lang.is_some() && !table.is_localized() {
        return Err(AppError::BadRequest(format!("{} is not localized", table.name())));
    }
    Ok(scoped(Criteria::new(), lang))
}

pub async fn create<E: Entity>(
    State(state): State<CrudState<E>>,
    Json(payload): Json<E::Write>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.crud.create(&payload).await?;
    Ok(success_one(row))
}

pub async fn list<E: Entity>(
    State(state): State<CrudState<E>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = lang_filter(state.crud.table(), query.lang.as_deref())?;
    let params = ListParams {
        prefetch: query.prefetch,
        limit: state.clamp_limit(query.limit),
        offset: query.offset.unwrap_or(0),
    };
    let rows = state.crud.get_all(&params, &filters).await?;
    let total = state.crud.count(&filters).await?;
    Ok(success_page(rows, total, params.limit, params.offset))
}

pub async fn read<E: Entity>(
    State(state): State<CrudState<E>>,
    Path(id): Path<i64>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, AppError> {
    let table = state.crud.table();
    let criteria = lang_filter(table, query.lang.as_deref())?.eq(ID_COLUMN, id);
    let row = state
        .crud
        .get_by(&criteria)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", table.name(), id)))?;
    Ok(success_one_ok(row))
}

pub async fn update<E: Entity>(
    State(state): State<CrudState<E>>,
    Path(id): Path<i64>,
    Json(payload): Json<E::Write>,
) -> Result<impl IntoResponse, AppError> {
    let table = state.crud.table();
    let row = state
        .crud
        .update_by(&payload, &Criteria::id(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", table.name(), id)))?;
    Ok(success_one_ok(row))
}

pub async fn delete<E: Entity>(
    State(state): State<CrudState<E>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.crud.delete_by(&Criteria::id(id)).await?;
    Ok(success_one_ok(deleted))
}
