use reqwest::Client;

use matchday_core::models::{Credentials, RegistrationData, UserProfile};

use super::error::DummyJsonError;
use super::types::{ErrorBody, LoginRequest, LoginResponse, RegisterRequest};
use crate::traits::{AuthGateway, AuthSession, Registration};

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// DummyJSON auth and users client.
pub struct DummyJsonClient {
    base_url: String,
    http: Client,
}

impl Default for DummyJsonClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl DummyJsonClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Map a non-success response to `Api`, preferring the service's message.
    async fn check_response(
        resp: reqwest::Response,
        fallback: &str,
    ) -> Result<reqwest::Response, DummyJsonError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| fallback.to_string());
        tracing::warn!(status, %message, "DummyJSON API error");
        Err(DummyJsonError::Api { status, message })
    }

    /// Profile of the user owning `token` (`GET /auth/me`).
    pub async fn current_user(&self, token: &str) -> Result<UserProfile, DummyJsonError> {
        let resp = self
            .http
            .get(format!("{}/auth/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let resp = Self::check_response(resp, "Failed to fetch user profile").await?;
        resp.json()
            .await
            .map_err(|e| DummyJsonError::Parse(e.to_string()))
    }
}

impl AuthGateway for DummyJsonClient {
    type Error = DummyJsonError;

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, DummyJsonError> {
        tracing::debug!(username = %credentials.username, "DummyJSON login");
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        let resp = Self::check_response(resp, "Login failed").await?;
        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| DummyJsonError::Parse(e.to_string()))?;

        body.into_session()
            .ok_or_else(|| DummyJsonError::Parse("login response carried no token".into()))
    }

    async fn register(&self, data: &RegistrationData) -> Result<Registration, DummyJsonError> {
        tracing::debug!(username = %data.username, "DummyJSON register");
        let resp = self
            .http
            .post(format!("{}/users/add", self.base_url))
            .json(&RegisterRequest::from_data(data))
            .send()
            .await?;

        let resp = Self::check_response(resp, "Registration failed").await?;
        let user: UserProfile = resp
            .json()
            .await
            .map_err(|e| DummyJsonError::Parse(e.to_string()))?;

        // users/add creates the account but never issues a token.
        Ok(Registration { user, token: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve_once;

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (base, seen) = serve_once(
            "200 OK",
            r#"{"id":1,"username":"emilys","email":"emily.johnson@x.dummyjson.com","firstName":"Emily","lastName":"Johnson","accessToken":"tok","refreshToken":"ref"}"#,
        )
        .await;
        let client = DummyJsonClient::new(base);

        let session = client
            .login(&Credentials::new("emilys", "emilyspass"))
            .await
            .unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user.first_name, "Emily");

        let request = seen.await.unwrap();
        assert!(request.head.starts_with("POST /auth/login "));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["username"], "emilys");
        assert_eq!(body["password"], "emilyspass");
    }

    #[tokio::test]
    async fn test_login_rejection_carries_service_message() {
        let (base, _seen) =
            serve_once("400 Bad Request", r#"{"message":"Invalid credentials"}"#).await;
        let client = DummyJsonClient::new(base);

        let err = client
            .login(&Credentials::new("emilys", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        match err {
            DummyJsonError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_error_body_uses_fallback() {
        let (base, _seen) = serve_once("502 Bad Gateway", "upstream down").await;
        let client = DummyJsonClient::new(base);

        let err = client
            .login(&Credentials::new("emilys", "emilyspass"))
            .await
            .unwrap_err();
        assert!(matches!(err, DummyJsonError::Api { status: 502, ref message } if message == "Login failed"));
    }

    #[tokio::test]
    async fn test_register_returns_no_token() {
        let (base, seen) = serve_once(
            "201 Created",
            r#"{"id":209,"username":"newfan","email":"newfan@example.com","firstName":"newfan","lastName":"User","age":25}"#,
        )
        .await;
        let client = DummyJsonClient::new(base);
        let data = RegistrationData {
            username: "newfan".into(),
            email: "newfan@example.com".into(),
            password: "secret1".into(),
            first_name: None,
            last_name: None,
        };

        let registration = client.register(&data).await.unwrap();
        assert_eq!(registration.user.id, 209);
        assert!(registration.token.is_none());

        let request = seen.await.unwrap();
        assert!(request.head.starts_with("POST /users/add "));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["gender"], "male");
        assert_eq!(body["lastName"], "User");
    }

    #[tokio::test]
    async fn test_current_user_sends_bearer_token() {
        let (base, seen) = serve_once(
            "200 OK",
            r#"{"id":1,"username":"emilys","email":"emily.johnson@x.dummyjson.com","firstName":"Emily","lastName":"Johnson"}"#,
        )
        .await;
        let client = DummyJsonClient::new(format!("{base}/"));

        let user = client.current_user("tok").await.unwrap();
        assert_eq!(user.username, "emilys");

        let request = seen.await.unwrap();
        assert!(request.head.starts_with("GET /auth/me "));
        assert!(request
            .head
            .to_ascii_lowercase()
            .contains("authorization: bearer tok"));
    }
}
