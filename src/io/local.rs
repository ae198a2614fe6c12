//! Filesystem-backed object store for local runs.
//!
//! Objects live at `<root>/<bucket>/<key>`. Content type is not persisted.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::AppError;
use crate::io::store::{ObjectStore, validate_key};

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, bucket: &str, key: &str) -> Result<PathBuf, AppError> {
        validate_key(bucket)?;
        if bucket.contains('/') {
            return Err(AppError::storage(format!(
                "bucket name '{bucket}' must not contain '/'"
            )));
        }
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for LocalStore {
    fn exists(&self, bucket: &str, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(bucket, key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::storage(format!(
                "Failed to stat '{}': {e}",
                path.display()
            ))),
        }
    }

    fn write(
        &self,
        bucket: &str,
        key: &str,
        payload: &str,
        content_type: &str,
    ) -> Result<(), AppError> {
        let path = self.path_for(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::storage(format!("Failed to create '{}': {e}", parent.display()))
            })?;
        }
        fs::write(&path, payload.as_bytes()).map_err(|e| {
            AppError::storage(format!("Failed to write '{}': {e}", path.display()))
        })?;
        debug!(path = %path.display(), content_type, "wrote local object");
        Ok(())
    }
}
