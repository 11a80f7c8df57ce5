use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::{mpsc, oneshot};

use super::{BackendKind, KeyValueStore, StorageError};

const SCHEMA_V1: &str = include_str!("../../../../migrations/001_kv_store.sql");

/// General-purpose persistent store backed by a SQLite file.
///
/// The connection lives on a dedicated thread; callers talk to it through a
/// channel, so requests are applied one at a time in arrival order.
#[derive(Clone)]
pub struct SqliteStore {
    tx: mpsc::UnboundedSender<KvCommand>,
}

enum KvCommand {
    Get {
        key: String,
        reply: oneshot::Sender<Result<Option<String>, StorageError>>,
    },
    Set {
        key: String,
        value: String,
        reply: oneshot::Sender<Result<(), StorageError>>,
    },
    Delete {
        key: String,
        reply: oneshot::Sender<Result<(), StorageError>>,
    },
}

impl SqliteStore {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Self::spawn(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Self::spawn(conn)
    }

    fn spawn(conn: Connection) -> Result<Self, StorageError> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("kv-actor".into())
            .spawn(move || actor_loop(conn, rx))
            .map_err(|e| StorageError::Backend(format!("failed to spawn storage thread: {e}")))?;
        Ok(Self { tx })
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StorageError>>) -> KvCommand,
    ) -> Result<T, StorageError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| StorageError::Closed)?;
        rx.await.unwrap_or(Err(StorageError::Closed))
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        self.request(|reply| KvCommand::Get { key, reply }).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        let value = value.to_string();
        self.request(|reply| KvCommand::Set { key, value, reply })
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.request(|reply| KvCommand::Delete { key, reply }).await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::General
    }
}

fn actor_loop(conn: Connection, mut rx: mpsc::UnboundedReceiver<KvCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            KvCommand::Get { key, reply } => {
                let _ = reply.send(get_value(&conn, &key));
            }
            KvCommand::Set { key, value, reply } => {
                let _ = reply.send(set_value(&conn, &key, &value));
            }
            KvCommand::Delete { key, reply } => {
                let _ = reply.send(delete_value(&conn, &key));
            }
        }
    }
    tracing::debug!("kv actor shutting down");
}

fn get_value(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

fn set_value(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

fn delete_value(conn: &Connection, key: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(())
}

fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}
