//! Database repositories
//!
//! Every persisted value is a JSON snapshot under a string key. The storage
//! repository is the only table-level access the rest of the crate uses.

pub mod storage;

pub use storage::{SqlxStorageRepository, StorageRepository, StoredEntry};
