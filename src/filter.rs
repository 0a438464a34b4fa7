//! Input validation and filter-expression building.
//!
//! Namespace tags end up interpolated into the backend's filter-query syntax,
//! so they are restricted to a charset that cannot form filter
//! metacharacters. Validation happens both at write time and at filter-build
//! time; a value that passes one always passes the other.

use crate::config::{MAX_INDEX_NAME_LEN, MAX_NAMESPACE_LEN};
use crate::error::{Result, StoreError};

/// Checks an index name: non-empty, length-capped, `[A-Za-z0-9._-]` only.
pub fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidName("name is empty".to_string()));
    }
    if name.chars().count() > MAX_INDEX_NAME_LEN {
        return Err(StoreError::InvalidName(format!(
            "name exceeds {} characters",
            MAX_INDEX_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| !is_safe_char(*c)) {
        return Err(StoreError::InvalidName(format!(
            "character {:?} not allowed in '{}'",
            c, name
        )));
    }
    Ok(())
}

/// Checks a namespace tag against the same restricted charset.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(StoreError::InvalidNamespace("namespace is empty".to_string()));
    }
    if namespace.chars().count() > MAX_NAMESPACE_LEN {
        return Err(StoreError::InvalidNamespace(format!(
            "namespace exceeds {} characters",
            MAX_NAMESPACE_LEN
        )));
    }
    if let Some(c) = namespace.chars().find(|c| !is_safe_char(*c)) {
        return Err(StoreError::InvalidNamespace(format!(
            "character {:?} not allowed in '{}'",
            c, namespace
        )));
    }
    Ok(())
}

/// Builds the equality predicate `namespace:<value>` for a validated tag.
pub fn namespace_filter(namespace: &str) -> Result<String> {
    validate_namespace(namespace)?;
    Ok(format!("{}:{}", crate::config::FIELD_NAMESPACE, namespace))
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
