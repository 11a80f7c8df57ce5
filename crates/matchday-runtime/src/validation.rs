//! Form checks run before any request leaves the client.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use matchday_core::models::{Credentials, RegistrationData};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// One problem with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required,
    TooShort { min: usize },
    InvalidEmail,
    Mismatch,
}

/// Problems keyed by form field name, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, (&'static str, ValidationError)>,
}

impl ValidationErrors {
    fn check(&mut self, field: &'static str, label: &'static str, err: Option<ValidationError>) {
        if let Some(err) = err {
            self.fields.insert(field, (label, err));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.fields.get(field).map(|(_, err)| err)
    }

    /// Human-readable message for one field.
    pub fn message(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .map(|(label, err)| describe(label, err))
    }

    pub fn messages(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        self.fields
            .iter()
            .map(|(field, (label, err))| (*field, describe(label, err)))
    }

    fn into_result<T>(self, ok: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(ok())
        } else {
            Err(self)
        }
    }
}

fn describe(label: &str, err: &ValidationError) -> String {
    match err {
        ValidationError::Required => format!("{label} is required"),
        ValidationError::TooShort { min } => format!("{label} must be at least {min} characters"),
        ValidationError::InvalidEmail => "Invalid email address".to_string(),
        ValidationError::Mismatch => "Passwords must match".to_string(),
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.messages().map(|(_, m)| m).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn min_len(value: &str, min: usize) -> Option<ValidationError> {
    if value.is_empty() {
        Some(ValidationError::Required)
    } else if value.chars().count() < min {
        Some(ValidationError::TooShort { min })
    } else {
        None
    }
}

fn email(value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        Some(ValidationError::Required)
    } else if !RE_EMAIL.is_match(value) {
        Some(ValidationError::InvalidEmail)
    } else {
        None
    }
}

/// Raw login input.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let username = self.username.trim();
        let mut errors = ValidationErrors::default();
        errors.check("username", "Username", min_len(username, MIN_USERNAME_LEN));
        errors.check("password", "Password", min_len(&self.password, MIN_PASSWORD_LEN));
        errors.into_result(|| Credentials::new(username, self.password.clone()))
    }
}

/// Raw registration input.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegistrationData, ValidationErrors> {
        let username = self.username.trim();
        let email_addr = self.email.trim();
        let mut errors = ValidationErrors::default();
        errors.check("username", "Username", min_len(username, MIN_USERNAME_LEN));
        errors.check("email", "Email", email(email_addr));
        errors.check("password", "Password", min_len(&self.password, MIN_PASSWORD_LEN));

        let confirm = if self.confirm_password.is_empty() {
            Some(ValidationError::Required)
        } else if self.confirm_password != self.password {
            Some(ValidationError::Mismatch)
        } else {
            None
        };
        errors.check("confirmPassword", "Confirm password", confirm);

        errors.into_result(|| RegistrationData {
            username: username.to_string(),
            email: email_addr.to_string(),
            password: self.password.clone(),
            first_name: non_blank(self.first_name.as_deref()),
            last_name: non_blank(self.last_name.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
