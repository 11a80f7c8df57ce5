//! Light/dark override, persisted in the background.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use matchday_core::models::{ColorScheme, ThemePreference};
use matchday_core::storage::{keys, KeyValueStore};

enum ThemeCommand {
    Persist(ThemePreference),
    Flush(oneshot::Sender<()>),
}

/// Holds the appearance override.
///
/// Changes apply to memory immediately; the write to storage is queued on a
/// background task and its failures are only logged. A crash before the
/// queue drains loses the last change.
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<ThemePreference>,
    writer: mpsc::UnboundedSender<ThemeCommand>,
    generation: AtomicU64,
}

impl ThemeStore {
    /// Must be called inside a tokio runtime; spawns the writer task.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (writer, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(storage.clone(), rx));
        Self {
            storage,
            state: watch::Sender::new(ThemePreference::default()),
            writer,
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemePreference> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ThemePreference {
        *self.state.borrow()
    }

    /// The scheme to render with right now.
    pub fn effective_scheme(&self) -> ColorScheme {
        self.current().resolve(system_scheme())
    }

    pub fn set_override(&self, preference: ThemePreference) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(preference);
        if self.writer.send(ThemeCommand::Persist(preference)).is_err() {
            tracing::warn!(%preference, "theme writer stopped, preference not saved");
        }
    }

    pub fn clear_override(&self) {
        self.set_override(ThemePreference::System);
    }

    /// Apply the persisted preference. Keeps the current value when nothing
    /// usable is stored, or when an override was set while reading.
    pub async fn load(&self) -> ThemePreference {
        let started_at = self.generation.load(Ordering::SeqCst);

        let stored = match self.storage.get(keys::THEME_PREFERENCE).await {
            Ok(Some(raw)) => {
                let parsed = ThemePreference::from_storage_str(&raw);
                if parsed.is_none() {
                    tracing::warn!(value = %raw, "ignoring unknown theme preference");
                }
                parsed
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read theme preference");
                None
            }
        };

        if let Some(preference) = stored {
            if self.generation.load(Ordering::SeqCst) == started_at {
                self.state.send_replace(preference);
                tracing::debug!(%preference, "theme preference loaded");
            }
        }
        self.current()
    }

    /// Wait until every queued write has been attempted.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.writer.send(ThemeCommand::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run_writer(
    storage: Arc<dyn KeyValueStore>,
    mut rx: mpsc::UnboundedReceiver<ThemeCommand>,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            ThemeCommand::Persist(preference) => {
                if let Err(e) = storage
                    .set(keys::THEME_PREFERENCE, preference.as_storage_str())
                    .await
                {
                    tracing::warn!(%preference, error = %e, "failed to save theme preference");
                }
            }
            ThemeCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Platform appearance, if the desktop reports one.
pub fn system_scheme() -> Option<ColorScheme> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Light) => Some(ColorScheme::Light),
        Ok(dark_light::Mode::Dark) => Some(ColorScheme::Dark),
        _ => None,
    }
}
