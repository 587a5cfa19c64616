//! Raw product record decoded from a product page's embedded JSON
//!
//! The record's shape is owned by the target site and can change without
//! notice, so every access goes through a path lookup that returns
//! `ProjectionError` instead of panicking on a missing key.

use serde_json::{Map, Value};

use crate::infrastructure::config::pnj::PRODUCT_DATA_PATH;
use crate::infrastructure::errors::{ProjectionError, ProjectionResult};

/// Look up a dot-separated path (`a.b.0.c`) inside `value`.
/// Numeric segments index arrays; an empty path returns `value` itself.
pub fn lookup<'a>(value: &'a Value, path: &str) -> ProjectionResult<&'a Value> {
    if path.is_empty() {
        return Ok(value);
    }

    let mut current = value;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| ProjectionError::NotFound {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
    }
    Ok(current)
}

/// Integer view of a value; accepts integral floats and numeric strings
pub fn as_i64(value: &Value, path: &str) -> ProjectionResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()).map(|f| f as i64))
            .ok_or_else(|| ProjectionError::wrong_type(path, "an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ProjectionError::wrong_type(path, "an integer")),
        _ => Err(ProjectionError::wrong_type(path, "an integer")),
    }
}

/// Text view of a value; numbers are rendered, other types rejected
pub fn as_text(value: &Value, path: &str) -> ProjectionResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ProjectionError::wrong_type(path, "a string")),
    }
}

/// One product page's decoded `__NEXT_DATA__` tree
#[derive(Debug, Clone, PartialEq)]
pub struct RawProductRecord {
    source_url: String,
    root: Value,
}

impl RawProductRecord {
    pub fn new(source_url: impl Into<String>, root: Value) -> Self {
        Self {
            source_url: source_url.into(),
            root,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look up a path from the document root
    pub fn get(&self, path: &str) -> ProjectionResult<&Value> {
        lookup(&self.root, path)
    }

    /// Look up a key under the product data object
    pub fn product_field(&self, key: &str) -> ProjectionResult<&Value> {
        self.get(&format!("{}.{}", PRODUCT_DATA_PATH, key))
    }

    pub fn product_i64(&self, key: &str) -> ProjectionResult<i64> {
        as_i64(self.product_field(key)?, key)
    }

    pub fn product_text(&self, key: &str) -> ProjectionResult<String> {
        as_text(self.product_field(key)?, key)
    }

    pub fn product_array(&self, key: &str) -> ProjectionResult<&Vec<Value>> {
        self.product_field(key)?
            .as_array()
            .ok_or_else(|| ProjectionError::wrong_type(key, "an array"))
    }

    pub fn product_object(&self, key: &str) -> ProjectionResult<&Map<String, Value>> {
        self.product_field(key)?
            .as_object()
            .ok_or_else(|| ProjectionError::wrong_type(key, "an object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> RawProductRecord {
        RawProductRecord::new(
            "https://www.pnj.com.vn/nhan/a/",
            json!({
                "props": {"pageProps": {"dataServerSide": {
                    "product_id": "100001",
                    "price": 1250000.0,
                    "images": ["a.png", "b.png"],
                    "size_price": {"10": 1},
                }}}
            }),
        )
    }

    #[test]
    fn test_lookup_through_arrays() {
        let r = record();
        assert_eq!(r.get("props.pageProps.dataServerSide.images.1").unwrap(), &json!("b.png"));
    }

    #[test]
    fn test_lookup_reports_missing_segment() {
        let err = record().get("props.pageProps.missing.x").unwrap_err();
        assert_eq!(
            err,
            ProjectionError::NotFound {
                path: "props.pageProps.missing.x".into(),
                segment: "missing".into()
            }
        );
    }

    #[test]
    fn test_numeric_views() {
        let r = record();
        assert_eq!(r.product_i64("product_id").unwrap(), 100_001);
        assert_eq!(r.product_i64("price").unwrap(), 1_250_000);
        assert!(matches!(r.product_i64("images"), Err(ProjectionError::WrongType { .. })));
    }

    #[test]
    fn test_container_views() {
        let r = record();
        assert_eq!(r.product_array("images").unwrap().len(), 2);
        assert!(r.product_object("size_price").is_ok());
        assert!(r.product_object("images").is_err());
    }
}
