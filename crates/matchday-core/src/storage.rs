//! Durable key/value storage behind a capability trait.
//!
//! Two production variants exist: [`KeyringStore`] keeps values in the OS
//! secret store, [`SqliteStore`] keeps them in a local SQLite file. Which one
//! holds credentials is decided once at startup by [`StorageBackends::detect`];
//! favorites and preferences always live in the general store.
//!
//! No layer here caches values. Every call reaches the backend.

mod memory;
mod secure;
mod sqlite;

pub use memory::MemoryStore;
pub use secure::KeyringStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::{AppConfig, BackendChoice};
use crate::error::CoreError;

/// Persisted key names.
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const USER_DATA: &str = "user_data";
    pub const FAVORITES: &str = "favorites";
    pub const THEME_PREFERENCE: &str = "theme_preference";
}

/// Errors from a storage backend. A missing key is never an error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("secret store error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage worker closed")]
    Closed,

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Which kind of platform facility a store is backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// OS secret store, encrypted at rest.
    Secure,
    /// Local database file, no encryption guarantee.
    General,
    /// Process memory only.
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secure => write!(f, "secure"),
            Self::General => write!(f, "general"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// String key/value store.
///
/// Implementations must be usable without any setup call and must treat
/// deleting an absent key as success.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    fn kind(&self) -> BackendKind;
}

/// Read and deserialize a JSON value. Absent keys yield `None`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a value as JSON and store it.
pub async fn write_json<T: Serialize + Sync + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// The pair of stores handed to the state stores at startup.
#[derive(Clone)]
pub struct StorageBackends {
    /// Token and profile.
    pub secrets: Arc<dyn KeyValueStore>,
    /// Favorites and theme preference.
    pub prefs: Arc<dyn KeyValueStore>,
}

impl StorageBackends {
    pub fn new(secrets: Arc<dyn KeyValueStore>, prefs: Arc<dyn KeyValueStore>) -> Self {
        Self { secrets, prefs }
    }

    /// Use one store for everything.
    pub fn single(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            secrets: store.clone(),
            prefs: store,
        }
    }

    /// Open the general store and pick the credential store for this platform.
    pub fn detect(config: &AppConfig) -> Result<Self, CoreError> {
        let db_path = config.ensure_db_path()?;
        let general: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&db_path)?);
        let secrets = select_secret_store(
            config.storage.backend,
            &config.storage.keyring_service,
            general.clone(),
        );
        tracing::info!(
            secrets = %secrets.kind(),
            prefs = %general.kind(),
            db = %db_path.display(),
            "storage backends selected"
        );
        Ok(Self::new(secrets, general))
    }
}

/// The Linux keyring backend is the kernel keyutils store, which is
/// in-memory only and loses its entries on reboot.
const KEYRING_PERSISTS: bool = !cfg!(target_os = "linux");

fn select_secret_store(
    choice: BackendChoice,
    service: &str,
    general: Arc<dyn KeyValueStore>,
) -> Arc<dyn KeyValueStore> {
    match choice {
        BackendChoice::General => general,
        BackendChoice::Secure => Arc::new(KeyringStore::new(service)),
        BackendChoice::Auto => {
            if !KEYRING_PERSISTS {
                tracing::info!("OS secret store does not survive reboots, keeping credentials in general store");
                general
            } else if KeyringStore::probe(service) {
                Arc::new(KeyringStore::new(service))
            } else {
                tracing::info!("OS secret store unavailable, keeping credentials in general store");
                general
            }
        }
    }
}
