//! Startup rehydration and navigation gating.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::watch;

use matchday_api::traits::AuthGateway;
use matchday_core::models::ThemePreference;

use crate::favorites::FavoritesStore;
use crate::session::{SessionState, SessionStore};
use crate::theme::ThemeStore;

/// Top-level navigation graph to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Session restoration has not finished yet.
    Loading,
    Unauthenticated,
    Authenticated,
}

impl Route {
    pub fn from_session(state: &SessionState) -> Self {
        if !state.initialized() {
            Self::Loading
        } else if state.token().is_some() {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }
}

/// Outcome of one restoration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub signed_in: bool,
    /// Favorites loaded, or `None` if they could not be read.
    pub favorites: Option<usize>,
    pub theme: ThemePreference,
}

/// Runs restoration at most once per process.
#[derive(Debug, Default)]
pub struct Restoration {
    started: AtomicBool,
}

impl Restoration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all three stores concurrently.
    ///
    /// Returns `None` if restoration already ran.
    pub async fn run<A: AuthGateway>(
        &self,
        session: &SessionStore<A>,
        favorites: &FavoritesStore,
        theme: &ThemeStore,
    ) -> Option<RestoreReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("restoration already started, skipping");
            return None;
        }

        let (signed_in, favorites, theme) =
            futures::join!(session.restore(), favorites.load(), theme.load());

        let report = RestoreReport {
            signed_in,
            favorites: favorites.ok(),
            theme,
        };
        tracing::info!(
            signed_in = report.signed_in,
            favorites = ?report.favorites,
            theme = %report.theme,
            "restoration complete"
        );
        Some(report)
    }
}

/// Wait until the session is initialized and return the route to show.
pub async fn wait_for_route(mut rx: watch::Receiver<SessionState>) -> Route {
    if rx.wait_for(|s| s.initialized()).await.is_err() {
        tracing::debug!("session store dropped before initializing");
    }
    let state = rx.borrow();
    Route::from_session(&state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{fixture, profile, FaultyStore, ScriptedAuth};
    use matchday_core::storage::{self, keys, KeyValueStore, MemoryStore};

    struct Stores {
        session: SessionStore<ScriptedAuth>,
        favorites: FavoritesStore,
        theme: ThemeStore,
    }

    fn stores(storage: Arc<dyn KeyValueStore>) -> Stores {
        Stores {
            session: SessionStore::new(Arc::new(ScriptedAuth::new()), storage.clone()),
            favorites: FavoritesStore::new(storage.clone()),
            theme: ThemeStore::new(storage),
        }
    }

    #[tokio::test]
    async fn test_route_is_loading_before_restore() {
        let s = stores(Arc::new(MemoryStore::new()));
        assert_eq!(Route::from_session(&s.session.snapshot()), Route::Loading);
    }

    #[tokio::test]
    async fn test_empty_storage_routes_to_unauthenticated() {
        let s = stores(Arc::new(MemoryStore::new()));
        let report = Restoration::new()
            .run(&s.session, &s.favorites, &s.theme)
            .await
            .unwrap();

        assert!(!report.signed_in);
        assert_eq!(report.favorites, Some(0));
        assert_eq!(report.theme, ThemePreference::System);
        assert_eq!(
            wait_for_route(s.session.subscribe()).await,
            Route::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_full_storage_restores_everything() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        storage.set(keys::AUTH_TOKEN, "abc").await.unwrap();
        storage::write_json(&*storage, keys::USER_DATA, &profile(1, "emilys"))
            .await
            .unwrap();
        storage::write_json(&*storage, keys::FAVORITES, &vec![fixture("1"), fixture("2")])
            .await
            .unwrap();
        storage.set(keys::THEME_PREFERENCE, "dark").await.unwrap();

        let s = stores(storage);
        let report = Restoration::new()
            .run(&s.session, &s.favorites, &s.theme)
            .await
            .unwrap();

        assert!(report.signed_in);
        assert_eq!(report.favorites, Some(2));
        assert_eq!(report.theme, ThemePreference::Dark);
        assert_eq!(
            wait_for_route(s.session.subscribe()).await,
            Route::Authenticated
        );
    }

    #[tokio::test]
    async fn test_storage_fault_still_ungates() {
        let storage = Arc::new(FaultyStore::new());
        storage.fail_reads(true);
        let s = stores(storage);

        let report = Restoration::new()
            .run(&s.session, &s.favorites, &s.theme)
            .await
            .unwrap();
        assert_eq!(report.favorites, None);
        assert_eq!(
            wait_for_route(s.session.subscribe()).await,
            Route::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_runs_only_once() {
        let s = stores(Arc::new(MemoryStore::new()));
        let restoration = Restoration::new();
        assert!(restoration
            .run(&s.session, &s.favorites, &s.theme)
            .await
            .is_some());
        assert!(restoration
            .run(&s.session, &s.favorites, &s.theme)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_waiter_wakes_when_restore_finishes() {
        let s = stores(Arc::new(MemoryStore::new()));
        let waiter = tokio::spawn(wait_for_route(s.session.subscribe()));

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        s.session.restore().await;
        assert_eq!(waiter.await.unwrap(), Route::Unauthenticated);
    }
}
