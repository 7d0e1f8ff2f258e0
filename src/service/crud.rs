//! Generic CRUD accessor for one entity type.

use crate::error::AppError;
use crate::model::{Column, ColumnKind, Entity, Table, CREATED_AT_COLUMN, ID_COLUMN};
use crate::service::criteria::{Criteria, ListParams};
use crate::sql::{self, bind_all, BindValue, QueryBuf};
use crate::store::Storage;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::any::AnyRow;
use std::collections::BTreeSet;
use std::marker::PhantomData;

type JsonRow = Map<String, Value>;

/// CRUD operations for entity `E` against its table.
///
/// Absence is never an error: lookups return `None`, deletes return `false`.
/// Integrity violations from the database propagate as [`AppError::Db`].
pub struct Crud<E> {
    storage: Storage,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Crud<E> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Crud<E> {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            _entity: PhantomData,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn table(&self) -> &'static Table {
        E::table()
    }

    /// Insert the non-null fields of `payload`; returns the stored row with relations resolved.
    pub async fn create(&self, payload: &E::Write) -> Result<E::Read, AppError> {
        self.create_with(payload, Map::new()).await
    }

    /// Like [`create`](Self::create) with additional fields the payload does not carry,
    /// e.g. a foreign key resolved by the caller.
    pub async fn create_with(&self, payload: &E::Write, extra: Map<String, Value>) -> Result<E::Read, AppError> {
        let mut fields = payload_fields(payload)?;
        for (k, v) in extra {
            if fields.contains_key(&k) {
                return Err(AppError::Validation(format!("field '{}' given twice", k)));
            }
            if !v.is_null() {
                fields.insert(k, v);
            }
        }
        let row = self.insert_row(&fields).await?;
        self.into_read(row).await
    }

    /// Find one row matching `criteria` or insert one built from it. The flag is true when created.
    pub async fn get_or_create(&self, criteria: &Criteria) -> Result<(E::Read, bool), AppError> {
        if let Some(row) = self.find_one(criteria).await? {
            return Ok((self.into_read(row).await?, false));
        }
        match self.insert_row(&criteria.to_fields()).await {
            Ok(row) => Ok((self.into_read(row).await?, true)),
            Err(e) if e.is_unique_violation() => {
                // Lost a race with a concurrent insert of the same row.
                let row = self.find_one(criteria).await?.ok_or(e)?;
                Ok((self.into_read(row).await?, false))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<E::Read>, AppError> {
        self.get_by(&Criteria::id(id)).await
    }

    /// Single-row lookup. More than one match is a conflict.
    pub async fn get_by(&self, criteria: &Criteria) -> Result<Option<E::Read>, AppError> {
        match self.find_one(criteria).await? {
            Some(row) => Ok(Some(self.into_read(row).await?)),
            None => Ok(None),
        }
    }

    /// One page of rows ordered by id. Relations are only resolved when `params.prefetch` is set.
    pub async fn get_all(&self, params: &ListParams, extra_filters: &Criteria) -> Result<Vec<E::Read>, AppError> {
        let table = E::table();
        let filters = extra_filters.resolve(table)?;
        let q = sql::select(
            table,
            self.storage.dialect(),
            &filters,
            Some(params.limit),
            Some(params.offset),
        );
        let mut rows = self.fetch_all(&q, table).await?;
        if params.prefetch {
            self.prefetch(&mut rows).await?;
        }
        rows.into_iter().map(decode_read::<E>).collect()
    }

    pub async fn count(&self, criteria: &Criteria) -> Result<u64, AppError> {
        use sqlx::Row;
        let table = E::table();
        let filters = criteria.resolve(table)?;
        let q = sql::count(table, self.storage.dialect(), &filters);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_one(self.storage.pool())
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// Every matching row, relations resolved.
    ///
    /// The SQL backends report no match as `Some(vec![])`. `None` is reserved for a store that
    /// signals missing rows as `RowNotFound`; callers must still keep the two apart.
    pub async fn filter_by(&self, criteria: &Criteria) -> Result<Option<Vec<E::Read>>, AppError> {
        let table = E::table();
        let filters = criteria.resolve(table)?;
        let q = sql::select(table, self.storage.dialect(), &filters, None, None);
        let mut rows = match self.fetch_all(&q, table).await {
            Ok(rows) => rows,
            Err(AppError::Db(sqlx::Error::RowNotFound)) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.prefetch(&mut rows).await?;
        rows.into_iter()
            .map(decode_read::<E>)
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Overwrite the present, non-null fields of `payload` on the row matching `criteria`.
    ///
    /// `payload` may be a write view or any JSON object. Returns `None` when nothing matched.
    pub async fn update_by<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        criteria: &Criteria,
    ) -> Result<Option<E::Read>, AppError> {
        let Some(current) = self.find_one(criteria).await? else {
            return Ok(None);
        };
        let table = E::table();
        let fields = writable_fields(table, &payload_fields(payload)?)?;
        if fields.is_empty() {
            return self.into_read(current).await.map(Some);
        }
        let id = row_id(&current)?;
        let q = sql::update(table, self.storage.dialect(), id, &fields);
        match self.fetch_optional(&q, table).await? {
            Some(row) => self.into_read(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Delete the row matching `criteria`. False when nothing matched.
    pub async fn delete_by(&self, criteria: &Criteria) -> Result<bool, AppError> {
        let Some(current) = self.find_one(criteria).await? else {
            return Ok(false);
        };
        let q = sql::delete(E::table(), self.storage.dialect(), row_id(&current)?);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let done = bind_all(sqlx::query(&q.sql), &q.params)
            .execute(self.storage.pool())
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_row(&self, fields: &JsonRow) -> Result<JsonRow, AppError> {
        let table = E::table();
        let mut binds = writable_fields(table, fields)?;
        let created_at = table
            .column(CREATED_AT_COLUMN)
            .ok_or_else(|| AppError::Validation("table has no created_at column".into()))?;
        binds.insert(0, (created_at, BindValue::timestamp(Utc::now())));
        let q = sql::insert(table, self.storage.dialect(), &binds);
        self.fetch_optional(&q, table)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn find_one(&self, criteria: &Criteria) -> Result<Option<JsonRow>, AppError> {
        let table = E::table();
        let filters = criteria.resolve(table)?;
        let q = sql::select(table, self.storage.dialect(), &filters, Some(2), None);
        let mut rows = self.fetch_all(&q, table).await?;
        if rows.len() > 1 {
            return Err(AppError::Conflict(format!(
                "more than one {} row matches",
                table.name()
            )));
        }
        Ok(rows.pop())
    }

    async fn into_read(&self, row: JsonRow) -> Result<E::Read, AppError> {
        let mut rows = vec![row];
        self.prefetch(&mut rows).await?;
        rows.pop()
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
            .and_then(decode_read::<E>)
    }

    /// Nest each referenced row under its relation name, one query per foreign key.
    async fn prefetch(&self, rows: &mut [JsonRow]) -> Result<(), AppError> {
        let table = E::table();
        for (column, fk) in table.foreign_keys() {
            let ids: BTreeSet<i64> = rows
                .iter()
                .filter_map(|r| r.get(column.name).and_then(Value::as_i64))
                .collect();
            let related_table = (fk.table)();
            let related: Vec<JsonRow> = if ids.is_empty() {
                Vec::new()
            } else {
                let id_column = related_table
                    .column(ID_COLUMN)
                    .ok_or_else(|| AppError::Validation("related table has no id column".into()))?;
                let values: Vec<BindValue> = ids.iter().map(|id| BindValue::I64(*id)).collect();
                let q = sql::select_where_in(related_table, self.storage.dialect(), id_column, &values);
                self.fetch_all(&q, related_table).await?
            };
            for row in rows.iter_mut() {
                let target = row.get(column.name).and_then(Value::as_i64);
                let nested = target
                    .and_then(|id| related.iter().find(|r| r.get(ID_COLUMN).and_then(Value::as_i64) == Some(id)))
                    .map(|r| Value::Object(r.clone()))
                    .unwrap_or(Value::Null);
                row.insert(fk.relation.to_string(), nested);
            }
        }
        Ok(())
    }

    async fn fetch_all(&self, q: &QueryBuf, table: &Table) -> Result<Vec<JsonRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(self.storage.pool())
            .await?;
        Ok(rows.iter().map(|r| row_to_json(r, table)).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf, table: &Table) -> Result<Option<JsonRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(self.storage.pool())
            .await?;
        Ok(row.map(|r| row_to_json(&r, table)))
    }
}

/// Serialize a payload to a JSON object, dropping null fields.
fn payload_fields<P: Serialize + ?Sized>(payload: &P) -> Result<JsonRow, AppError> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        _ => Err(AppError::Validation("payload must be a JSON object".into())),
    }
}

/// Check payload fields against the table: known, writable, right kind.
fn writable_fields(table: &Table, fields: &JsonRow) -> Result<Vec<(&'static Column, BindValue)>, AppError> {
    let mut out = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let column = table
            .column(name)
            .ok_or_else(|| AppError::Validation(format!("unknown field '{}' on {}", name, table.name())))?;
        if column.generated {
            return Err(AppError::Validation(format!("field '{}' is read-only", name)));
        }
        if let Some(bound) = BindValue::for_column(column, value)? {
            out.push((column, bound));
        }
    }
    Ok(out)
}

fn row_id(row: &JsonRow) -> Result<i64, AppError> {
    row.get(ID_COLUMN)
        .and_then(Value::as_i64)
        .ok_or(AppError::Db(sqlx::Error::RowNotFound))
}

/// A row that does not fit the read view is a server-side fault, not a client one.
fn decode_read<E: Entity>(row: JsonRow) -> Result<E::Read, AppError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| AppError::Db(sqlx::Error::Decode(Box::new(e))))
}

fn row_to_json(row: &AnyRow, table: &Table) -> JsonRow {
    table
        .columns()
        .into_iter()
        .map(|c| (c.name.to_string(), cell_to_value(row, c)))
        .collect()
}

fn cell_to_value(row: &AnyRow, column: &Column) -> Value {
    use sqlx::Row;
    let name = column.name;
    match column.kind {
        ColumnKind::Integer => {
            if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
                return Value::from(n);
            }
        }
        ColumnKind::Float => {
            if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
                if let Some(n) = serde_json::Number::from_f64(n) {
                    return Value::Number(n);
                }
            }
            if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
                return Value::from(n as f64);
            }
        }
        ColumnKind::Boolean => {
            if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
                return Value::Bool(b);
            }
            // SQLite stores booleans as INTEGER.
            if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
                return Value::Bool(n != 0);
            }
        }
        ColumnKind::Text | ColumnKind::Timestamp => {
            if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
                return Value::String(s);
            }
        }
    }
    Value::Null
}
