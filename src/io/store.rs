//! Object storage capability.

use crate::error::AppError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Minimal bucket/key object store.
///
/// `write` is not required to refuse overwrites; callers gate it with
/// `exists`.
pub trait ObjectStore {
    fn exists(&self, bucket: &str, key: &str) -> Result<bool, AppError>;

    fn write(
        &self,
        bucket: &str,
        key: &str,
        payload: &str,
        content_type: &str,
    ) -> Result<(), AppError>;
}

/// Reject keys that could escape a bucket prefix or a filesystem root.
pub fn validate_key(key: &str) -> Result<(), AppError> {
    if key.trim().is_empty() {
        return Err(AppError::storage("object key is empty"));
    }
    if key.starts_with('/') {
        return Err(AppError::storage(format!(
            "object key '{key}' must not start with '/'"
        )));
    }
    if key.contains('\\') {
        return Err(AppError::storage(format!(
            "object key '{key}' must not contain '\\'"
        )));
    }
    if key.split('/').any(|seg| seg == "..") {
        return Err(AppError::storage(format!(
            "object key '{key}' must not contain '..' segments"
        )));
    }
    Ok(())
}
