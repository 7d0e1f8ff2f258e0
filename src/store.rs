//! Database connection and schema creation for registered tables.

use crate::error::{AppError, ConfigError};
use crate::model::Table;
use crate::sql::{create_table, Dialect};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::collections::HashSet;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection pool plus the SQL dialect it speaks. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Storage {
    pool: AnyPool,
    dialect: Dialect,
}

impl Storage {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        Self::connect_with(url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Connect to `url` (`postgres://`, `postgresql://` or `sqlite:`).
    ///
    /// In-memory SQLite gets exactly one connection that is never recycled:
    /// every connection would otherwise open its own empty database.
    pub async fn connect_with(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let dialect = Dialect::detect(url).ok_or_else(|| ConfigError::UnsupportedUrl(url.to_string()))?;
        sqlx::any::install_default_drivers();

        let options = if is_in_memory(url) {
            AnyPoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = options.connect(url).await?;
        tracing::info!(?dialect, "storage connected");
        Ok(Self { pool, dialect })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// CREATE TABLE IF NOT EXISTS for each table, referenced tables first.
    pub async fn generate_schemas(&self, tables: &[&'static Table]) -> Result<(), AppError> {
        for table in schema_order(tables) {
            let ddl = create_table(table, self.dialect);
            tracing::debug!(sql = %ddl, "create table");
            sqlx::query(&ddl).execute(&self.pool).await?;
            tracing::info!(table = table.name(), "table ready");
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// Order tables so every foreign key target in the set precedes the tables pointing at it.
pub fn schema_order(tables: &[&'static Table]) -> Vec<&'static Table> {
    fn visit(
        table: &'static Table,
        wanted: &HashSet<&'static str>,
        seen: &mut HashSet<&'static str>,
        out: &mut Vec<&'static Table>,
    ) {
        if !seen.insert(table.name()) {
            return;
        }
        for (_, fk) in table.foreign_keys() {
            let target = (fk.table)();
            if wanted.contains(target.name()) {
                visit(target, wanted, seen, out);
            }
        }
        out.push(table);
    }

    let wanted: HashSet<&'static str> = tables.iter().map(|t| t.name()).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tables.len());
    for table in tables {
        visit(table, &wanted, &mut seen, &mut out);
    }
    out
}
