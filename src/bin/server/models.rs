//! Demo entities served by the binary.

use chrono::{DateTime, Utc};
use ms_core::{Column, Entity, LocalizedEntity, Table};
use serde::{Deserialize, Serialize};

static TEST2: Table = Table::new("test2", &[Column::integer("test")]);

static TEST1: Table = Table::localized(
    "test1",
    &[
        Column::text("test"),
        Column::foreign_key("test2_id", "test2", <Test2 as Entity>::table),
    ],
);

pub struct Test2;

#[derive(Debug, Serialize, Deserialize)]
pub struct Test2Read {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub test: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Test2Write {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<i64>,
}

impl Entity for Test2 {
    type Read = Test2Read;
    type Write = Test2Write;

    fn table() -> &'static Table {
        &TEST2
    }
}

pub struct Test1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Test1Read {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tuple_lang: String,
    pub test: String,
    pub test2_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test2: Option<Test2Read>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Test1Write {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuple_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test2_id: Option<i64>,
}

impl Entity for Test1 {
    type Read = Test1Read;
    type Write = Test1Write;

    fn table() -> &'static Table {
        &TEST1
    }
}

impl LocalizedEntity for Test1 {}
