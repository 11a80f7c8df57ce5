//! The user's favorited matches.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;

use matchday_core::models::FavoriteMatch;
use matchday_core::storage::{self, keys, KeyValueStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("favorites storage failed: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
    /// Insertion order, at most one entry per `id_event`.
    pub items: Vec<FavoriteMatch>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FavoritesState {
    pub fn contains(&self, event_id: &str) -> bool {
        self.items.iter().any(|m| m.id_event == event_id)
    }
}

/// In-memory favorites with explicit persistence.
///
/// `add`, `remove` and `clear` touch memory only. [`save`](Self::save) is
/// the one write path and always takes the full list; [`toggle`](Self::toggle)
/// combines both for a single user action.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<FavoritesState>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: watch::Sender::new(FavoritesState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FavoritesState {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<FavoriteMatch> {
        self.state.borrow().items.clone()
    }

    /// Replace memory with the persisted list. A missing key is an empty list.
    pub async fn load(&self) -> Result<usize, FavoritesError> {
        self.state.send_modify(|s| s.loading = true);

        match storage::read_json::<Vec<FavoriteMatch>>(&*self.storage, keys::FAVORITES).await {
            Ok(stored) => {
                let items = dedupe(stored.unwrap_or_default());
                let count = items.len();
                self.state.send_modify(|s| {
                    s.items = items;
                    s.loading = false;
                    s.error = None;
                });
                tracing::debug!(count, "favorites loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load favorites");
                let message = e.to_string();
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(e.into())
            }
        }
    }

    /// Insert unless a match with the same id is already present.
    pub fn add(&self, item: FavoriteMatch) -> bool {
        self.state.send_if_modified(|s| {
            if s.contains(&item.id_event) {
                return false;
            }
            s.items.push(item);
            true
        })
    }

    pub fn remove(&self, event_id: &str) -> bool {
        self.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|m| m.id_event != event_id);
            s.items.len() != before
        })
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.state.borrow().contains(event_id)
    }

    /// Drop everything from memory. Storage is untouched.
    pub fn clear(&self) {
        self.state.send_if_modified(|s| {
            let had_items = !s.items.is_empty();
            s.items.clear();
            had_items
        });
    }

    /// Persist `items` verbatim and make it the in-memory list.
    ///
    /// On a write failure memory is left as it was and the error is recorded.
    pub async fn save(&self, items: Vec<FavoriteMatch>) -> Result<(), FavoritesError> {
        let items = dedupe(items);
        match storage::write_json(&*self.storage, keys::FAVORITES, &items).await {
            Ok(()) => {
                tracing::debug!(count = items.len(), "favorites saved");
                self.state.send_modify(|s| {
                    s.items = items;
                    s.error = None;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save favorites");
                let message = e.to_string();
                self.state.send_modify(|s| s.error = Some(message));
                Err(e.into())
            }
        }
    }

    /// Add the match if absent, remove it if present, then persist.
    ///
    /// Returns whether the match is a favorite afterwards. Memory only
    /// changes once the write has succeeded.
    pub async fn toggle(&self, item: FavoriteMatch) -> Result<bool, FavoritesError> {
        let mut updated = self.items();
        let before = updated.len();
        updated.retain(|m| m.id_event != item.id_event);
        let now_favorite = updated.len() == before;
        if now_favorite {
            updated.push(item);
        }
        self.save(updated).await?;
        Ok(now_favorite)
    }
}

/// Keep the first occurrence of every id.
fn dedupe(items: Vec<FavoriteMatch>) -> Vec<FavoriteMatch> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|m| seen.insert(m.id_event.clone()))
        .collect()
}
