//! Static description of an entity table: name, columns, foreign keys.

/// Primary key column present on every table.
pub const ID_COLUMN: &str = "id";
/// Insert timestamp column present on every table.
pub const CREATED_AT_COLUMN: &str = "created_at";
/// Language tag column present on localized tables.
pub const LANG_COLUMN: &str = "tuple_lang";

const LANG_MAX_LEN: usize = 3;

static ID: Column = Column::integer(ID_COLUMN).generated();
static CREATED_AT: Column = Column::timestamp(CREATED_AT_COLUMN).generated();
static LANG: Column = Column::text(LANG_COLUMN).max_len(LANG_MAX_LEN);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// Stored as RFC 3339 text so every backend round-trips it the same way.
    Timestamp,
}

/// Foreign key to another entity's `id`.
#[derive(Clone, Copy, Debug)]
pub struct ForeignKey {
    /// Key under which the referenced row is nested when prefetching.
    pub relation: &'static str,
    pub table: fn() -> &'static Table,
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub unique: bool,
    pub max_len: Option<usize>,
    pub foreign_key: Option<ForeignKey>,
    /// Filled in by storage; never accepted from a payload.
    pub generated: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            unique: false,
            max_len: None,
            foreign_key: None,
            generated: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn float(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Float)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Boolean)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Timestamp)
    }

    /// Integer column referencing `table`'s `id`; prefetched rows land under `relation`.
    pub const fn foreign_key(
        name: &'static str,
        relation: &'static str,
        table: fn() -> &'static Table,
    ) -> Self {
        let mut column = Self::new(name, ColumnKind::Integer);
        column.foreign_key = Some(ForeignKey { relation, table });
        column
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }
}

#[derive(Debug)]
pub struct Table {
    name: &'static str,
    localized: bool,
    columns: &'static [Column],
}

impl Table {
    pub const fn new(name: &'static str, columns: &'static [Column]) -> Self {
        Self {
            name,
            localized: false,
            columns,
        }
    }

    /// Table whose rows also carry a `tuple_lang` tag of at most three characters.
    pub const fn localized(name: &'static str, columns: &'static [Column]) -> Self {
        Self {
            name,
            localized: true,
            columns,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_localized(&self) -> bool {
        self.localized
    }

    /// All columns in storage order: `id`, `created_at`, `tuple_lang` if localized, then declared ones.
    pub fn columns(&self) -> Vec<&'static Column> {
        let mut out: Vec<&'static Column> = vec![&ID, &CREATED_AT];
        if self.localized {
            out.push(&LANG);
        }
        out.extend(self.columns.iter());
        out
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().into_iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static Column, ForeignKey)> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.foreign_key.map(|fk| (c, fk)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static AUTHORS: Table = Table::new("authors", &[Column::text("name").unique()]);
    static POSTS: Table = Table::localized(
        "posts",
        &[
            Column::text("title"),
            Column::foreign_key("author_id", "author", authors),
        ],
    );

    fn authors() -> &'static Table {
        &AUTHORS
    }

    #[test]
    fn implicit_columns_come_first() {
        let names: Vec<_> = AUTHORS.columns().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["id", "created_at", "name"]);
        assert!(AUTHORS.column("id").is_some_and(|c| c.generated));
    }

    #[test]
    fn localized_table_adds_lang_column() {
        let lang = POSTS.column(LANG_COLUMN).expect("lang column");
        assert_eq!(lang.max_len, Some(3));
        assert!(!lang.generated);
        assert!(AUTHORS.column(LANG_COLUMN).is_none());
    }

    #[test]
    fn foreign_keys_point_at_referenced_table() {
        let fks: Vec<_> = POSTS.foreign_keys().collect();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].0.name, "author_id");
        assert_eq!(fks[0].1.relation, "author");
        assert_eq!((fks[0].1.table)().name(), "authors");
    }
}
