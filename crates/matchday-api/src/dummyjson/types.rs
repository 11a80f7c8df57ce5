use serde::{Deserialize, Serialize};

use matchday_core::models::{RegistrationData, UserProfile};

use crate::traits::AuthSession;

/// Filler the users endpoint insists on.
const DEFAULT_AGE: u32 = 25;
const DEFAULT_GENDER: &str = "male";
const DEFAULT_PHONE: &str = "+1 234 567 890";
const DEFAULT_BIRTH_DATE: &str = "1995-01-01";
const DEFAULT_IMAGE: &str = "https://via.placeholder.com/150";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` response. Older deployments call the token `token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: Option<String>,
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl LoginResponse {
    /// Split into a session, or `None` when the response carried no token.
    pub fn into_session(self) -> Option<AuthSession> {
        let token = self.access_token.filter(|t| !t.is_empty())?;
        Some(AuthSession {
            token,
            user: UserProfile {
                id: self.id,
                username: self.username,
                email: self.email,
                first_name: self.first_name,
                last_name: self.last_name,
            },
        })
    }
}

/// `POST /users/add` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub age: u32,
    pub gender: &'a str,
    pub phone: &'a str,
    pub birth_date: &'a str,
    pub image: &'a str,
}

impl<'a> RegisterRequest<'a> {
    pub fn from_data(data: &'a RegistrationData) -> Self {
        Self {
            username: &data.username,
            email: &data.email,
            password: &data.password,
            first_name: data.first_name_or_default(),
            last_name: data.last_name_or_default(),
            age: DEFAULT_AGE,
            gender: DEFAULT_GENDER,
            phone: DEFAULT_PHONE,
            birth_date: DEFAULT_BIRTH_DATE,
            image: DEFAULT_IMAGE,
        }
    }
}

/// Error body shape: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_login_response() {
        let json = r#"{
            "id": 1,
            "username": "emilys",
            "email": "emily.johnson@x.dummyjson.com",
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
            "image": "https://dummyjson.com/icon/emilys/128",
            "accessToken": "eyJhbGciOi.access",
            "refreshToken": "eyJhbGciOi.refresh"
        }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        let session = resp.into_session().unwrap();
        assert_eq!(session.token, "eyJhbGciOi.access");
        assert_eq!(session.user.id, 1);
        assert_eq!(session.user.last_name, "Johnson");
    }

    #[test]
    fn test_legacy_token_field() {
        let json = r#"{ "id": 7, "username": "kai", "token": "legacy" }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        let session = resp.into_session().unwrap();
        assert_eq!(session.token, "legacy");
        assert_eq!(session.user.email, "");
    }

    #[test]
    fn test_missing_token_yields_no_session() {
        let json = r#"{ "id": 7, "username": "kai" }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(resp.into_session().is_none());
    }

    #[test]
    fn test_register_request_fills_defaults() {
        let data = RegistrationData {
            username: "kai".into(),
            email: "kai@example.com".into(),
            password: "secret1".into(),
            first_name: None,
            last_name: None,
        };
        let body = serde_json::to_value(RegisterRequest::from_data(&data)).unwrap();
        assert_eq!(body["firstName"], "kai");
        assert_eq!(body["lastName"], "User");
        assert_eq!(body["age"], 25);
        assert_eq!(body["birthDate"], "1995-01-01");
    }
}
