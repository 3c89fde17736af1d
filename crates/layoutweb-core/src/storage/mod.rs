//! Key-value persistence for saved projects.

mod memory;
mod project;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStore;
pub use project::{PROJECT_KEY, Project, load_project, save_project};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// String values stored under string keys.
///
/// On native platforms implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// All stored keys.
    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// String values stored under string keys (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<String>>;

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, StorageResult<()>>;

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}
