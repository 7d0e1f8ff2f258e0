//! Entity traits and static table metadata.

mod table;

pub use table::{Column, ColumnKind, ForeignKey, Table, CREATED_AT_COLUMN, ID_COLUMN, LANG_COLUMN};

use serde::{de::DeserializeOwned, Serialize};

/// A persisted record type: one table row with an `id` and a `created_at` stamp.
///
/// The read view is what leaves the service (it carries the generated fields),
/// the write view is what comes in on create and update (it never does).
///
/// ```rust,ignore
/// static BOOKS: Table = Table::new(
///     "books",
///     &[Column::text("title"), Column::integer("pages").nullable()],
/// );
///
/// impl Entity for Book {
///     type Read = BookRead;
///     type Write = BookWrite;
///
///     fn table() -> &'static Table {
///         &BOOKS
///     }
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    type Read: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Write: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn table() -> &'static Table;
}

/// Entity whose rows carry a language tag (`tuple_lang`).
///
/// The table must be declared with [`Table::localized`].
pub trait LocalizedEntity: Entity {}
