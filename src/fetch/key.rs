//! Cache key generation
//!
//! Builds deterministic keys from an operation tag and its parameters.

use serde::Serialize;
use serde_json::Value;

use crate::error::{FetchError, Result};

/// Builds `<operation>_<canonical params>`, e.g. `products_{}`.
///
/// Object keys are sorted recursively, so parameter sets that differ only in
/// field order produce the same key.
pub fn derive_key<P>(operation: &str, params: &P) -> Result<String>
where
    P: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(params).map_err(|e| FetchError::InvalidParams(e.to_string()))?;
    let mut key = format!("{}_", operation);
    write_canonical(&value, &mut key);
    Ok(key)
}

/// True if `key` was derived for exactly `operation`.
///
/// The text after `<operation>_` must open a canonical JSON value, so the
/// `product` tag leaves `products_{}`, `product_reviews_{}` and
/// `product_settings` alone.
pub(crate) fn is_operation_key(key: &str, operation: &str) -> bool {
    key.strip_prefix(operation)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|params| match params.chars().next() {
            Some('{' | '[' | '"' | '-') => true,
            Some(c) if c.is_ascii_digit() => true,
            _ => matches!(params, "true" | "false" | "null"),
        })
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<_> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
