use reqwest::Client;
use serde::de::DeserializeOwned;

use matchday_core::models::Match;

use super::error::SportsDbError;
use super::types::EventsResponse;
use crate::traits::FixturesGateway;

pub const DEFAULT_BASE_URL: &str = "https://www.thesportsdb.com/api/v1/json";

/// Free-tier API key.
pub const DEFAULT_API_KEY: &str = "3";

/// TheSportsDB v1 JSON client.
pub struct SportsDbClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl Default for SportsDbClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_API_KEY)
    }
}

impl SportsDbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}/{name}.php", self.base_url, self.api_key)
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SportsDbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "TheSportsDB API error");
            Err(SportsDbError::Api {
                status,
                message: body,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: &str,
    ) -> Result<T, SportsDbError> {
        tracing::debug!(endpoint, id, "TheSportsDB request");
        let resp = self
            .http
            .get(self.endpoint(endpoint))
            .query(&[("id", id)])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| SportsDbError::Parse(e.to_string()))
    }
}

impl FixturesGateway for SportsDbClient {
    type Error = SportsDbError;

    async fn upcoming_matches(&self, league_id: &str) -> Result<Vec<Match>, SportsDbError> {
        let body: EventsResponse = self.get_json("eventsnextleague", league_id).await?;
        Ok(body.into_events())
    }

    async fn past_matches(&self, league_id: &str) -> Result<Vec<Match>, SportsDbError> {
        let body: EventsResponse = self.get_json("eventspastleague", league_id).await?;
        Ok(body.into_events())
    }

    async fn match_details(&self, event_id: &str) -> Result<Option<Match>, SportsDbError> {
        let body: EventsResponse = self.get_json("lookupevent", event_id).await?;
        Ok(body.into_first())
    }
}
