//! Equality criteria and list windows passed to the accessors.

use crate::error::AppError;
use crate::model::{Table, ID_COLUMN};
use crate::sql::{BindValue, Filter};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_LIMIT: u64 = 50;

/// Column = value conditions, ANDed together. A null value matches `IS NULL`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    conditions: Vec<(String, Value)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(id: i64) -> Self {
        Self::new().eq(ID_COLUMN, id)
    }

    /// Add `column = value`, replacing any earlier condition on the same column.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = value,
            None => self.conditions.push((column, value)),
        }
        self
    }

    /// Criteria from the fields of any serializable object.
    pub fn from_payload<P: Serialize + ?Sized>(payload: &P) -> Result<Self, AppError> {
        match serde_json::to_value(payload)? {
            Value::Object(map) => Ok(map.into_iter().fold(Self::new(), |c, (k, v)| c.eq(k, v))),
            _ => Err(AppError::Validation("criteria must be a JSON object".into())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Non-null conditions as an insert payload.
    pub(crate) fn to_fields(&self) -> Map<String, Value> {
        self.conditions
            .iter()
            .filter(|(_, v)| !v.is_null())
            .cloned()
            .collect()
    }

    /// Check every column against the table and convert values to bindable form.
    pub(crate) fn resolve(&self, table: &Table) -> Result<Vec<Filter>, AppError> {
        self.conditions
            .iter()
            .map(|(name, value)| {
                let column = table.column(name).ok_or_else(|| {
                    AppError::Validation(format!("unknown column '{}' on {}", name, table.name()))
                })?;
                Ok(Filter {
                    column,
                    value: BindValue::for_column(column, value)?,
                })
            })
            .collect()
    }
}

/// Page window for listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Resolve foreign keys into nested rows.
    pub prefetch: bool,
    pub limit: u64,
    pub offset: u64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            prefetch: false,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListParams {
    pub fn page(limit: u64, offset: u64) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn prefetched(mut self) -> Self {
        self.prefetch = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use serde_json::json;

    static NOTES: Table = Table::localized("notes", &[Column::text("body").nullable()]);

    #[test]
    fn eq_replaces_same_column() {
        let c = Criteria::id(1).eq("tuple_lang", "bg").eq("tuple_lang", "en");
        let pairs: Vec<_> = c.iter().collect();
        assert_eq!(pairs, vec![("id", &json!(1)), ("tuple_lang", &json!("en"))]);
    }

    #[test]
    fn resolve_rejects_unknown_columns() {
        let err = Criteria::new().eq("nope", 1).resolve(&NOTES).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn resolve_keeps_nulls_as_is_null() {
        let filters = Criteria::new().eq("body", Value::Null).resolve(&NOTES).unwrap();
        assert_eq!(filters.len(), 1);
        assert!(filters[0].value.is_none());
    }

    #[test]
    fn resolve_checks_value_kinds() {
        assert!(Criteria::new().eq("id", "one").resolve(&NOTES).is_err());
    }

    #[test]
    fn from_payload_and_to_fields() {
        let c = Criteria::from_payload(&json!({"body": "hi", "tuple_lang": null})).unwrap();
        let fields = c.to_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["body"], json!("hi"));
        assert!(Criteria::from_payload(&json!([1, 2])).is_err());
    }

    #[test]
    fn list_params_defaults() {
        let p = ListParams::default();
        assert_eq!((p.prefetch, p.limit, p.offset), (false, 50, 0));
        assert!(ListParams::page(5, 10).prefetched().prefetch);
    }
}
