pub mod favorites;
pub mod matches;
pub mod restore;
pub mod session;
pub mod theme;
pub mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use matchday_api::dummyjson::DummyJsonClient;
use matchday_api::sportsdb::SportsDbClient;
use matchday_api::traits::{AuthGateway, FixturesGateway};
use matchday_core::config::AppConfig;
use matchday_core::storage::StorageBackends;

pub use favorites::{FavoritesError, FavoritesState, FavoritesStore};
pub use matches::{MatchesError, MatchesState, MatchesStore};
pub use restore::{Restoration, RestoreReport, Route};
pub use session::{SessionError, SessionPhase, SessionState, SessionStore};
pub use theme::ThemeStore;
pub use validation::{LoginForm, RegisterForm, ValidationError, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Application context: every store, built once at startup and passed to
/// whatever front end drives it.
pub struct Runtime<A = DummyJsonClient, F = SportsDbClient> {
    config: AppConfig,
    backends: StorageBackends,
    session: SessionStore<A>,
    favorites: FavoritesStore,
    theme: ThemeStore,
    matches: MatchesStore<F>,
    restoration: Restoration,
}

impl Runtime {
    /// Must be called inside a tokio runtime.
    pub fn new(config: AppConfig) -> Result<Self, RuntimeError> {
        let backends =
            StorageBackends::detect(&config).map_err(|e| RuntimeError::Storage(e.to_string()))?;
        let auth = DummyJsonClient::new(&config.auth.base_url);
        let fixtures = SportsDbClient::new(&config.fixtures.base_url, &config.fixtures.api_key);
        Ok(Self::with_parts(
            config,
            backends,
            Arc::new(auth),
            Arc::new(fixtures),
        ))
    }
}

impl<A: AuthGateway, F: FixturesGateway> Runtime<A, F> {
    pub fn with_parts(
        config: AppConfig,
        backends: StorageBackends,
        auth: Arc<A>,
        fixtures: Arc<F>,
    ) -> Self {
        let session = SessionStore::new(auth, backends.secrets.clone())
            .with_registration_fallback(config.auth.registration_fallback);
        Self {
            favorites: FavoritesStore::new(backends.prefs.clone()),
            theme: ThemeStore::new(backends.prefs.clone()),
            matches: MatchesStore::new(fixtures),
            restoration: Restoration::new(),
            session,
            backends,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backends(&self) -> &StorageBackends {
        &self.backends
    }

    pub fn session(&self) -> &SessionStore<A> {
        &self.session
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn matches(&self) -> &MatchesStore<F> {
        &self.matches
    }

    /// Rehydrate every store. Only the first call does anything.
    pub async fn restore(&self) -> Option<RestoreReport> {
        self.restoration
            .run(&self.session, &self.favorites, &self.theme)
            .await
    }

    pub fn route(&self) -> Route {
        Route::from_session(&self.session.snapshot())
    }

    pub async fn wait_for_route(&self) -> Route {
        restore::wait_for_route(self.session.subscribe()).await
    }

    /// Refresh both fixture lists for a league, the configured one by default.
    pub async fn refresh_matches(
        &self,
        league_id: Option<&str>,
    ) -> Result<(usize, usize), MatchesError> {
        let league = league_id.unwrap_or(&self.config.fixtures.default_league);
        let upcoming = self.matches.refresh_upcoming(league).await?;
        let past = self.matches.refresh_past(league).await?;
        Ok((upcoming, past))
    }

    /// Wait for queued background writes.
    pub async fn flush(&self) {
        self.theme.flush().await;
    }
}
