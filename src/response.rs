//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// `count` is the size of this page, `total` the number of rows matching the filters.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub count: u64,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::CREATED, Json(SuccessOne { data }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data }))
}

pub fn success_page<T: Serialize>(
    data: Vec<T>,
    total: u64,
    limit: u64,
    offset: u64,
) -> (StatusCode, Json<SuccessMany<T>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: PageMeta {
                count,
                total,
                limit,
                offset,
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_meta_counts_items() {
        let (status, Json(body)) = success_page(vec![1, 2, 3], 10, 3, 6);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.meta,
            PageMeta {
                count: 3,
                total: 10,
                limit: 3,
                offset: 6
            }
        );
    }

    #[test]
    fn single_envelopes() {
        assert_eq!(success_one("x").0, StatusCode::CREATED);
        let (status, Json(body)) = success_one_ok(true);
        assert_eq!(status, StatusCode::OK);
        assert!(body.data);
    }
}
