use serde::Deserialize;

use matchday_core::models::Match;

/// Envelope for the events endpoints. `events` is `null` when nothing matches.
#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Option<Vec<Match>>,
}

impl EventsResponse {
    pub fn into_events(self) -> Vec<Match> {
        self.events.unwrap_or_default()
    }

    pub fn into_first(self) -> Option<Match> {
        self.events.and_then(|events| events.into_iter().next())
    }
}
