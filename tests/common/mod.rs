#![allow(dead_code)]

use chrono::{DateTime, Utc};
use ms_core::{Column, Entity, LocalizedEntity, Storage, Table};
use serde::{Deserialize, Serialize};

static AUTHORS: Table = Table::new(
    "authors",
    &[Column::text("name").unique(), Column::boolean("active").nullable()],
);

static BOOKS: Table = Table::new(
    "books",
    &[
        Column::text("title"),
        Column::integer("pages").nullable(),
        Column::foreign_key("author_id", "author", <Author as Entity>::table),
    ],
);

static PHRASES: Table = Table::localized(
    "phrases",
    &[
        Column::text("text"),
        Column::foreign_key("author_id", "author", <Author as Entity>::table).nullable(),
    ],
);

pub struct Author;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorRead {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthorWrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl AuthorWrite {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            active: None,
        }
    }
}

impl Entity for Author {
    type Read = AuthorRead;
    type Write = AuthorWrite;

    fn table() -> &'static Table {
        &AUTHORS
    }
}

pub struct Book;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRead {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub pages: Option<i64>,
    pub author_id: i64,
    pub author: Option<AuthorRead>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookWrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

impl BookWrite {
    pub fn new(title: &str, author_id: i64) -> Self {
        Self {
            title: Some(title.to_string()),
            pages: None,
            author_id: Some(author_id),
        }
    }
}

impl Entity for Book {
    type Read = BookRead;
    type Write = BookWrite;

    fn table() -> &'static Table {
        &BOOKS
    }
}

pub struct Phrase;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhraseRead {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tuple_lang: String,
    pub text: String,
    pub author_id: Option<i64>,
    pub author: Option<AuthorRead>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PhraseWrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuple_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

impl PhraseWrite {
    pub fn new(lang: &str, text: &str) -> Self {
        Self {
            tuple_lang: Some(lang.to_string()),
            text: Some(text.to_string()),
            author_id: None,
        }
    }
}

impl Entity for Phrase {
    type Read = PhraseRead;
    type Write = PhraseWrite;

    fn table() -> &'static Table {
        &PHRASES
    }
}

impl LocalizedEntity for Phrase {}

/// Fresh in-memory database with every fixture table created.
pub async fn storage() -> Storage {
    let storage = Storage::connect("sqlite::memory:").await.unwrap();
    storage
        .generate_schemas(&[Author::table(), Book::table(), Phrase::table()])
        .await
        .unwrap();
    storage
}
