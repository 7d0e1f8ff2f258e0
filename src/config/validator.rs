//! Router definition validation.

use crate::config::RouterSpec;
use crate::error::ConfigError;
use regex::Regex;
use std::sync::OnceLock;

fn model_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/?([A-Za-z0-9_\-.~]+/?)*$").expect("valid regex"))
}

/// Paths served by the common routes; a router mounted there would collide with them.
const RESERVED_PATHS: [&str; 3] = ["health", "ready", "version"];

pub fn validate(spec: &RouterSpec) -> Result<(), ConfigError> {
    if !model_name_re().is_match(&spec.model) {
        return Err(ConfigError::Validation(format!("invalid model name '{}'", spec.model)));
    }
    if let Some(prefix) = &spec.prefix {
        if !prefix_re().is_match(prefix) || prefix.contains(':') {
            return Err(ConfigError::Validation(format!("invalid prefix '{}'", prefix)));
        }
    }
    let mount = spec.prefix.as_deref().unwrap_or(spec.model.as_str()).trim_matches('/');
    if RESERVED_PATHS.contains(&mount) {
        return Err(ConfigError::Validation(format!("prefix '/{}' is reserved", mount)));
    }
    if let (Some(limit), Some(max)) = (spec.limit, spec.max_limit) {
        if limit > max {
            return Err(ConfigError::Validation(format!(
                "limit {} exceeds max_limit {}",
                limit, max
            )));
        }
    }
    if spec.max_limit == Some(0) {
        return Err(ConfigError::Validation("max_limit must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(model: &str, prefix: Option<&str>) -> RouterSpec {
        RouterSpec {
            prefix: prefix.map(String::from),
            ..RouterSpec::new(model)
        }
    }

    #[test]
    fn accepts_plain_specs() {
        assert!(validate(&spec("test1", None)).is_ok());
        assert!(validate(&spec("test1", Some("/api/v1/test1"))).is_ok());
        assert!(validate(&spec("test1", Some("test1/"))).is_ok());
        assert!(validate(&spec("test1", Some("/"))).is_ok());
    }

    #[test]
    fn rejects_bad_names_and_prefixes() {
        assert!(validate(&spec("1test", None)).is_err());
        assert!(validate(&spec("te st", None)).is_err());
        assert!(validate(&spec("test1", Some("/a b"))).is_err());
        assert!(validate(&spec("test1", Some("/:id"))).is_err());
        assert!(validate(&spec("test1", Some("//x"))).is_err());
    }

    #[test]
    fn service_paths_are_reserved() {
        assert!(validate(&spec("test1", Some("/health"))).is_err());
        assert!(validate(&spec("test1", Some("ready/"))).is_err());
        assert!(validate(&spec("version", None)).is_err());
        assert!(validate(&spec("test1", Some("/api/health"))).is_ok());
    }

    #[test]
    fn limit_must_fit_max() {
        let s = RouterSpec {
            limit: Some(100),
            max_limit: Some(10),
            ..RouterSpec::new("test1")
        };
        assert!(validate(&s).is_err());
        let s = RouterSpec {
            max_limit: Some(0),
            ..RouterSpec::new("test1")
        };
        assert!(validate(&s).is_err());
    }
}
