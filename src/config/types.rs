//! Router definition file format.

use serde::{Deserialize, Serialize};

/// Contents of one `*.json` file in the routers directory.
///
/// ```json
/// { "model": "test1", "prefix": "/test1", "tags": ["test1"], "limit": 50 }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterSpec {
    /// Table name of a registered model.
    pub model: String,
    /// Mount path; defaults to `/<model>`.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Default page size of the list endpoint.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Upper bound on the page size of the list endpoint.
    #[serde(default)]
    pub max_limit: Option<u64>,
}

impl RouterSpec {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}
