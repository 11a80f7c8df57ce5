//! Trait definitions for the remote services.
//!
//! The state stores only see these traits, so tests can swap in scripted
//! gateways and the HTTP clients stay replaceable.

use std::future::Future;

use matchday_core::models::{Credentials, Match, RegistrationData, UserProfile};

/// The remote identity service.
pub trait AuthGateway: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Exchange credentials for a token and profile.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthSession, Self::Error>> + Send;

    /// Create an account. Registration-only backends return no token.
    fn register(
        &self,
        data: &RegistrationData,
    ) -> impl Future<Output = Result<Registration, Self::Error>> + Send;
}

/// The remote sports-schedule service.
pub trait FixturesGateway: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Next scheduled events of a league.
    fn upcoming_matches(
        &self,
        league_id: &str,
    ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send;

    /// Most recent finished events of a league.
    fn past_matches(
        &self,
        league_id: &str,
    ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send;

    /// A single event by id, or `None` if the service does not know it.
    fn match_details(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send;
}

/// A successful sign-in: token and profile always travel together.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Result of account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user: UserProfile,
    pub token: Option<String>,
}
