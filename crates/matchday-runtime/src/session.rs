//! Authentication state and its persistence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use matchday_api::traits::{AuthGateway, AuthSession, Registration};
use matchday_core::models::{Credentials, RegistrationData, UserProfile};
use matchday_core::storage::{self, keys, KeyValueStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Remote(String),
    #[error("could not save session: {0}")]
    Storage(#[from] StorageError),
}

/// What the session store is busy with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    Restoring,
    Authenticating,
    LoggingOut,
}

/// Coarse state-machine view of a [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated { initialized: bool },
    Authenticating,
    Authenticated,
    LoggingOut,
}

/// Snapshot of the session.
///
/// Token and profile are held as one [`AuthSession`], so a state with a
/// token but no user (or the reverse) cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    auth: Option<AuthSession>,
    activity: Activity,
    error: Option<String>,
    initialized: bool,
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.auth.as_ref().map(|a| &a.user)
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.auth.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn loading(&self) -> bool {
        self.activity != Activity::Idle
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once the first restoration attempt has finished. Never resets.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn phase(&self) -> SessionPhase {
        match self.activity {
            Activity::Authenticating => SessionPhase::Authenticating,
            Activity::LoggingOut => SessionPhase::LoggingOut,
            Activity::Idle | Activity::Restoring if self.auth.is_some() => {
                SessionPhase::Authenticated
            }
            Activity::Idle | Activity::Restoring => SessionPhase::Unauthenticated {
                initialized: self.initialized,
            },
        }
    }
}

/// Owns the session and keeps it in step with the credential store.
pub struct SessionStore<A> {
    gateway: Arc<A>,
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
    registration_fallback: bool,
}

impl<A: AuthGateway> SessionStore<A> {
    pub fn new(gateway: Arc<A>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            gateway,
            storage,
            state: watch::Sender::new(SessionState::default()),
            registration_fallback: false,
        }
    }

    /// Sign in locally when the registration endpoint itself is unreachable.
    pub fn with_registration_fallback(mut self, enabled: bool) -> Self {
        self.registration_fallback = enabled;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Rehydrate from storage. Returns whether a session was found.
    ///
    /// Always marks the store initialized, whatever the outcome. A read
    /// failure or a half-written pair counts as signed out.
    pub async fn restore(&self) -> bool {
        self.state.send_modify(|s| s.activity = Activity::Restoring);

        let restored = match self.read_persisted().await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted session");
                None
            }
        };
        let signed_in = restored.is_some();

        self.state.send_modify(|s| {
            // A sign-in or logout started while we were reading wins.
            if s.activity == Activity::Restoring {
                s.auth = restored;
                s.activity = Activity::Idle;
            }
            s.initialized = true;
        });
        tracing::info!(signed_in, "session restored");
        signed_in
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, SessionError> {
        self.begin(Activity::Authenticating);
        match self.gateway.login(credentials).await {
            Ok(session) => self.finish_sign_in(session).await,
            Err(e) => Err(self.fail(SessionError::Remote(e.to_string()))),
        }
    }

    /// Create an account and sign in with it.
    ///
    /// Backends that only create the account get a follow-up login. If that
    /// login fails too, the new profile is signed in under a locally
    /// generated placeholder token.
    pub async fn register(&self, data: &RegistrationData) -> Result<AuthSession, SessionError> {
        self.begin(Activity::Authenticating);
        match self.gateway.register(data).await {
            Ok(Registration {
                user,
                token: Some(token),
            }) => self.finish_sign_in(AuthSession { token, user }).await,
            Ok(Registration { user, token: None }) => {
                match self.gateway.login(&data.credentials()).await {
                    Ok(session) => self.finish_sign_in(session).await,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            username = %user.username,
                            "login after registration failed, using placeholder token"
                        );
                        let token = placeholder_token();
                        self.finish_sign_in(AuthSession { token, user }).await
                    }
                }
            }
            Err(e) if self.registration_fallback => {
                tracing::warn!(error = %e, "registration endpoint failed, creating local account");
                let session = AuthSession {
                    token: placeholder_token(),
                    user: local_profile(data),
                };
                self.finish_sign_in(session).await
            }
            Err(e) => Err(self.fail(SessionError::Remote(e.to_string()))),
        }
    }

    /// Sign out. Memory is cleared even when the store refuses the deletes.
    pub async fn logout(&self) {
        self.begin(Activity::LoggingOut);

        for key in [keys::AUTH_TOKEN, keys::USER_DATA] {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(key, error = %e, "failed to clear persisted session entry");
            }
        }

        self.state.send_modify(|s| {
            s.auth = None;
            s.activity = Activity::Idle;
            s.error = None;
        });
        tracing::info!("signed out");
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    fn begin(&self, activity: Activity) {
        self.state.send_modify(|s| {
            s.activity = activity;
            s.error = None;
        });
    }

    fn fail(&self, err: SessionError) -> SessionError {
        tracing::warn!(error = %err, "session operation failed");
        let message = err.to_string();
        self.state.send_modify(|s| {
            s.activity = Activity::Idle;
            s.error = Some(message);
        });
        err
    }

    async fn finish_sign_in(&self, session: AuthSession) -> Result<AuthSession, SessionError> {
        if let Err(e) = self.persist(&session).await {
            return Err(self.fail(e.into()));
        }
        self.state.send_modify(|s| {
            s.auth = Some(session.clone());
            s.activity = Activity::Idle;
            s.error = None;
        });
        tracing::info!(username = %session.user.username, "signed in");
        Ok(session)
    }

    async fn persist(&self, session: &AuthSession) -> Result<(), StorageError> {
        self.storage.set(keys::AUTH_TOKEN, &session.token).await?;
        if let Err(e) = storage::write_json(&*self.storage, keys::USER_DATA, &session.user).await {
            // Don't leave a token behind without its profile.
            if let Err(cleanup) = self.storage.delete(keys::AUTH_TOKEN).await {
                tracing::warn!(error = %cleanup, "failed to remove orphaned token");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn read_persisted(&self) -> Result<Option<AuthSession>, StorageError> {
        let token = self.storage.get(keys::AUTH_TOKEN).await?;
        let user: Option<UserProfile> =
            storage::read_json(&*self.storage, keys::USER_DATA).await?;

        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => Ok(Some(AuthSession { token, user })),
            (None, None) => Ok(None),
            _ => {
                tracing::debug!("incomplete persisted session, treating as signed out");
                Ok(None)
            }
        }
    }
}

/// Process-unique token for sessions the backend never issued one for.
fn placeholder_token() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("local_{}_{n}", Utc::now().timestamp_millis())
}

fn local_profile(data: &RegistrationData) -> UserProfile {
    UserProfile {
        id: Utc::now().timestamp_millis().unsigned_abs(),
        username: data.username.clone(),
        email: data.email.clone(),
        first_name: data.first_name_or_default().to_string(),
        last_name: data.last_name_or_default().to_string(),
    }
}
