//! Builds parameterized CREATE TABLE, INSERT, SELECT, UPDATE, DELETE from table metadata.

use crate::model::{Column, ColumnKind, Table, ID_COLUMN};
use crate::sql::params::BindValue;

/// SQL flavour of the connected database, detected from the connection URL scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn detect(url: &str) -> Option<Self> {
        let s = url.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Some(Dialect::Postgres)
        } else if s.starts_with("sqlite:") {
            Some(Dialect::Sqlite)
        } else {
            None
        }
    }

    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::Sqlite => format!("?{}", n),
        }
    }

    fn column_type(self, column: &Column) -> String {
        match (self, column.kind) {
            (Dialect::Postgres, ColumnKind::Integer) => "BIGINT".into(),
            (Dialect::Sqlite, ColumnKind::Integer) => "INTEGER".into(),
            (Dialect::Postgres, ColumnKind::Float) => "DOUBLE PRECISION".into(),
            (Dialect::Sqlite, ColumnKind::Float) => "REAL".into(),
            (Dialect::Postgres, ColumnKind::Boolean) => "BOOLEAN".into(),
            // the Any driver cannot decode sqlite's declared BOOLEAN
            (Dialect::Sqlite, ColumnKind::Boolean) => "INTEGER".into(),
            (Dialect::Postgres, ColumnKind::Text) => match column.max_len {
                Some(n) => format!("VARCHAR({})", n),
                None => "TEXT".into(),
            },
            (Dialect::Sqlite, ColumnKind::Text) => "TEXT".into(),
            (_, ColumnKind::Timestamp) => "TEXT".into(),
        }
    }

    fn primary_key(self) -> &'static str {
        match self {
            Dialect::Postgres => "BIGSERIAL PRIMARY KEY",
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }
}

/// Equality condition on one column; `None` compiles to `IS NULL`.
#[derive(Clone, Debug)]
pub struct Filter {
    pub column: &'static Column,
    pub value: Option<BindValue>,
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, dialect: Dialect, v: BindValue) -> String {
        self.params.push(v);
        dialect.placeholder(self.params.len())
    }
}

/// Quote identifier (safe: names only come from static table metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn select_column_list(table: &Table) -> String {
    table
        .columns()
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_where(q: &mut QueryBuf, dialect: Dialect, filters: &[Filter]) {
    if filters.is_empty() {
        return;
    }
    let mut conditions = Vec::with_capacity(filters.len());
    for f in filters {
        let col = quoted(f.column.name);
        match &f.value {
            Some(v) => {
                let ph = q.push_param(dialect, v.clone());
                conditions.push(format!("{} = {}", col, ph));
            }
            None => conditions.push(format!("{} IS NULL", col)),
        }
    }
    q.sql.push_str(" WHERE ");
    q.sql.push_str(&conditions.join(" AND "));
}

/// CREATE TABLE IF NOT EXISTS with implicit columns, constraints and foreign keys.
pub fn create_table(table: &Table, dialect: Dialect) -> String {
    let defs: Vec<String> = table
        .columns()
        .iter()
        .map(|c| {
            if c.name == ID_COLUMN {
                return format!("{} {}", quoted(c.name), dialect.primary_key());
            }
            let mut def = format!("{} {}", quoted(c.name), dialect.column_type(c));
            if !c.nullable {
                def.push_str(" NOT NULL");
            }
            if c.unique {
                def.push_str(" UNIQUE");
            }
            if let Some(fk) = &c.foreign_key {
                def.push_str(&format!(
                    " REFERENCES {} ({}) ON DELETE CASCADE",
                    quoted((fk.table)().name()),
                    quoted(ID_COLUMN)
                ));
            }
            def
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(table.name()),
        defs.join(", ")
    )
}

/// INSERT one row, returning every column.
pub fn insert(table: &Table, dialect: Dialect, fields: &[(&'static Column, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let names: Vec<String> = fields.iter().map(|(c, _)| quoted(c.name)).collect();
    let placeholders: Vec<String> = fields
        .iter()
        .map(|(_, v)| q.push_param(dialect, v.clone()))
        .collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.name()),
        names.join(", "),
        placeholders.join(", "),
        select_column_list(table)
    );
    q
}

/// SELECT with equality filters, ordered by id, optionally windowed.
pub fn select(
    table: &Table,
    dialect: Dialect,
    filters: &[Filter],
    limit: Option<u64>,
    offset: Option<u64>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {}", select_column_list(table), quoted(table.name()));
    push_where(&mut q, dialect, filters);
    q.sql.push_str(&format!(" ORDER BY {}", quoted(ID_COLUMN)));
    // SQLite only accepts OFFSET after LIMIT; -1 means unbounded there.
    match (limit, offset) {
        (None, None) => {}
        (limit, offset) => {
            let limit = match (limit, dialect) {
                (Some(n), _) => BindValue::I64(i64::try_from(n).unwrap_or(i64::MAX)),
                (None, Dialect::Sqlite) => BindValue::I64(-1),
                (None, Dialect::Postgres) => BindValue::I64(i64::MAX),
            };
            let ph = q.push_param(dialect, limit);
            q.sql.push_str(&format!(" LIMIT {}", ph));
            if let Some(off) = offset {
                let ph = q.push_param(dialect, BindValue::I64(i64::try_from(off).unwrap_or(i64::MAX)));
                q.sql.push_str(&format!(" OFFSET {}", ph));
            }
        }
    }
    q
}

/// SELECT rows whose `column` is one of `values`. Used for batch-loading related rows.
pub fn select_where_in(table: &Table, dialect: Dialect, column: &Column, values: &[BindValue]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders: Vec<String> = values
        .iter()
        .map(|v| q.push_param(dialect, v.clone()))
        .collect();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({})",
        select_column_list(table),
        quoted(table.name()),
        quoted(column.name),
        placeholders.join(", ")
    );
    q
}

/// SELECT COUNT(*) with equality filters.
pub fn count(table: &Table, dialect: Dialect, filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) AS total FROM {}", quoted(table.name()));
    push_where(&mut q, dialect, filters);
    q
}

/// UPDATE one row by id, returning every column.
pub fn update(table: &Table, dialect: Dialect, id: i64, fields: &[(&'static Column, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let sets: Vec<String> = fields
        .iter()
        .map(|(c, v)| format!("{} = {}", quoted(c.name), q.push_param(dialect, v.clone())))
        .collect();
    let id_ph = q.push_param(dialect, BindValue::I64(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name()),
        sets.join(", "),
        quoted(ID_COLUMN),
        id_ph,
        select_column_list(table)
    );
    q
}

/// DELETE one row by id.
pub fn delete(table: &Table, dialect: Dialect, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(dialect, BindValue::I64(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(table.name()),
        quoted(ID_COLUMN),
        ph
    );
    q
}
