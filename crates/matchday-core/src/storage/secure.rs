use async_trait::async_trait;
use keyring::Entry;

use super::{BackendKind, KeyValueStore, StorageError};

const PROBE_KEY: &str = "__matchday_probe__";

/// Credential store backed by the OS secret facility (Keychain, Credential
/// Manager, kernel keyutils).
///
/// Each key maps to one keyring entry under the configured service name.
/// Keyring calls block, so they run on the blocking pool.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Check whether the platform secret store answers at all.
    ///
    /// A missing probe entry counts as available; any other failure means the
    /// platform has no usable secret store.
    pub fn probe(service: &str) -> bool {
        let entry = match Entry::new(service, PROBE_KEY) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "secret store probe failed");
                return false;
            }
        };
        match entry.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => true,
            Err(e) => {
                tracing::debug!(error = %e, "secret store probe failed");
                false
            }
        }
    }

    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, StorageError> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key)?;
            op(entry)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("secret store task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let value = value.to_string();
        self.with_entry(key, move |entry| {
            entry.set_password(&value).map_err(Into::into)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Secure
    }
}
