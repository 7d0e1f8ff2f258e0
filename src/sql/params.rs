//! Convert serde_json::Value to types that sqlx can bind, checked against the target column.

use crate::error::AppError;
use crate::model::{Column, ColumnKind};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

/// A non-null value that can be bound to a query through the `Any` driver.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl BindValue {
    /// Validate `v` against the column kind. Returns `None` for JSON null.
    pub fn for_column(column: &Column, v: &Value) -> Result<Option<Self>, AppError> {
        let invalid = |expected: &str| {
            AppError::Validation(format!("{}: expected {}, got {}", column.name, expected, v))
        };
        let bound = match (column.kind, v) {
            (_, Value::Null) => return Ok(None),
            (ColumnKind::Integer, Value::Number(n)) => {
                BindValue::I64(n.as_i64().ok_or_else(|| invalid("integer"))?)
            }
            (ColumnKind::Integer, _) => return Err(invalid("integer")),
            (ColumnKind::Float, Value::Number(n)) => {
                BindValue::F64(n.as_f64().ok_or_else(|| invalid("number"))?)
            }
            (ColumnKind::Float, _) => return Err(invalid("number")),
            (ColumnKind::Boolean, Value::Bool(b)) => BindValue::Bool(*b),
            (ColumnKind::Boolean, _) => return Err(invalid("boolean")),
            (ColumnKind::Text, Value::String(s)) => {
                if let Some(max) = column.max_len {
                    if s.chars().count() > max {
                        return Err(AppError::Validation(format!(
                            "{}: length must be at most {}",
                            column.name, max
                        )));
                    }
                }
                BindValue::String(s.clone())
            }
            (ColumnKind::Text, _) => return Err(invalid("string")),
            (ColumnKind::Timestamp, Value::String(s)) => {
                let ts = DateTime::parse_from_rfc3339(s).map_err(|_| invalid("RFC 3339 timestamp"))?;
                BindValue::timestamp(ts.with_timezone(&Utc))
            }
            (ColumnKind::Timestamp, _) => return Err(invalid("RFC 3339 timestamp")),
        };
        Ok(Some(bound))
    }

    /// Canonical storage form of a timestamp: UTC, microseconds, `Z` suffix.
    pub fn timestamp(ts: DateTime<Utc>) -> Self {
        BindValue::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

/// Bind every param in order.
pub fn bind_all<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[BindValue],
) -> Query<'q, Any, AnyArguments<'q>> {
    for p in params {
        query = match p {
            BindValue::Bool(b) => query.bind(*b),
            BindValue::I64(n) => query.bind(*n),
            BindValue::F64(n) => query.bind(*n),
            BindValue::String(s) => query.bind(s.clone()),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_must_match_column_kind() {
        let pages = Column::integer("pages");
        assert_eq!(BindValue::for_column(&pages, &json!(12)).unwrap(), Some(BindValue::I64(12)));
        assert!(BindValue::for_column(&pages, &json!("12")).is_err());
        assert!(BindValue::for_column(&pages, &json!(1.5)).is_err());

        let flag = Column::boolean("flag");
        assert_eq!(BindValue::for_column(&flag, &json!(true)).unwrap(), Some(BindValue::Bool(true)));
        assert!(BindValue::for_column(&flag, &json!(1)).is_err());

        let ratio = Column::float("ratio");
        assert_eq!(BindValue::for_column(&ratio, &json!(2)).unwrap(), Some(BindValue::F64(2.0)));
    }

    #[test]
    fn null_binds_nothing() {
        let title = Column::text("title");
        assert_eq!(BindValue::for_column(&title, &Value::Null).unwrap(), None);
    }

    #[test]
    fn text_respects_max_len() {
        let lang = Column::text("tuple_lang").max_len(3);
        assert!(BindValue::for_column(&lang, &json!("bul")).is_ok());
        assert!(BindValue::for_column(&lang, &json!("bulg")).is_err());
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        let at = Column::timestamp("published_at");
        let v = BindValue::for_column(&at, &json!("2024-03-01T12:00:00+02:00")).unwrap();
        assert_eq!(v, Some(BindValue::String("2024-03-01T10:00:00.000000Z".into())));
        assert!(BindValue::for_column(&at, &json!("yesterday")).is_err());
    }
}
