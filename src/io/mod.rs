//! Object storage backends.
//!
//! - the capability trait and key checks (`store`)
//! - Google Cloud Storage JSON API (`gcs`)
//! - local filesystem, for development runs (`local`)

pub mod gcs;
pub mod local;
pub mod store;

pub use gcs::{GcsAuth, GcsSettings, GcsStore};
pub use local::LocalStore;
pub use store::{JSON_CONTENT_TYPE, ObjectStore};
