//! Fixture lists fetched from the schedule service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use matchday_api::traits::FixturesGateway;
use matchday_core::models::Match;

#[derive(Debug, thiserror::Error)]
pub enum MatchesError {
    #[error("{0}")]
    Remote(String),
    #[error("match {0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchesState {
    pub upcoming: Vec<Match>,
    pub past: Vec<Match>,
    pub selected: Option<Match>,
    /// True while any request on the store is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

/// Which list a refresh targets.
#[derive(Debug, Clone, Copy)]
enum Listing {
    Upcoming,
    Past,
}

pub struct MatchesStore<F> {
    gateway: Arc<F>,
    state: watch::Sender<MatchesState>,
    in_flight: AtomicUsize,
}

impl<F: FixturesGateway> MatchesStore<F> {
    pub fn new(gateway: Arc<F>) -> Self {
        Self {
            gateway,
            state: watch::Sender::new(MatchesState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MatchesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MatchesState {
        self.state.borrow().clone()
    }

    pub async fn refresh_upcoming(&self, league_id: &str) -> Result<usize, MatchesError> {
        self.refresh(Listing::Upcoming, league_id).await
    }

    pub async fn refresh_past(&self, league_id: &str) -> Result<usize, MatchesError> {
        self.refresh(Listing::Past, league_id).await
    }

    /// Look up one event and make it the selection.
    pub async fn select(&self, event_id: &str) -> Result<Match, MatchesError> {
        self.begin();
        let result = match self.gateway.match_details(event_id).await {
            Ok(Some(found)) => Ok(found),
            Ok(None) => Err(MatchesError::NotFound(event_id.to_string())),
            Err(e) => Err(MatchesError::Remote(e.to_string())),
        };

        match result {
            Ok(found) => {
                self.state.send_modify(|s| {
                    s.selected = Some(found.clone());
                    s.loading = self.end();
                });
                Ok(found)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn clear_selected(&self) {
        self.state.send_if_modified(|s| s.selected.take().is_some());
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    async fn refresh(&self, listing: Listing, league_id: &str) -> Result<usize, MatchesError> {
        self.begin();
        let fetched = match listing {
            Listing::Upcoming => self.gateway.upcoming_matches(league_id).await,
            Listing::Past => self.gateway.past_matches(league_id).await,
        };

        match fetched {
            Ok(events) => {
                let count = events.len();
                tracing::debug!(?listing, league_id, count, "fixtures refreshed");
                self.state.send_modify(|s| {
                    match listing {
                        Listing::Upcoming => s.upcoming = events,
                        Listing::Past => s.past = events,
                    }
                    s.loading = self.end();
                });
                Ok(count)
            }
            Err(e) => Err(self.fail(MatchesError::Remote(e.to_string()))),
        }
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            s.loading = true;
            s.error = None;
        });
    }

    /// Retire one request. Call inside `send_modify` so the count and the
    /// flag change under the same lock. Returns whether others remain.
    fn end(&self) -> bool {
        self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1
    }

    fn fail(&self, err: MatchesError) -> MatchesError {
        tracing::warn!(error = %err, "fixtures request failed");
        let message = err.to_string();
        self.state.send_modify(|s| {
            s.loading = self.end();
            s.error = Some(message);
        });
        err
    }
}
