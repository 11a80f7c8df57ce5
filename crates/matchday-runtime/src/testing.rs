//! Test doubles shared by the store tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use matchday_api::traits::{AuthGateway, AuthSession, FixturesGateway, Registration};
use matchday_core::models::{Credentials, Match, RegistrationData, UserProfile};
use matchday_core::storage::{BackendKind, KeyValueStore, MemoryStore, StorageError};

pub fn profile(id: u64, username: &str) -> UserProfile {
    UserProfile {
        id,
        username: username.into(),
        email: format!("{username}@example.com"),
        first_name: "Test".into(),
        last_name: "User".into(),
    }
}

pub fn session(token: &str, username: &str) -> AuthSession {
    AuthSession {
        token: token.into(),
        user: profile(1, username),
    }
}

pub fn fixture(id: &str) -> Match {
    Match::new(id, "Arsenal", "Chelsea")
}

/// Memory store with switchable failures.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    fail_writes_to: Mutex<Option<String>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, on: bool) {
        self.fail_deletes.store(on, Ordering::SeqCst);
    }

    /// Fail every write to one key only.
    pub fn fail_writes_to(&self, key: &str) {
        *self.fail_writes_to.lock().unwrap() = Some(key.to_string());
    }
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected read failure".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let targeted = self.fail_writes_to.lock().unwrap().as_deref() == Some(key);
        if targeted || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected write failure".into()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected delete failure".into()));
        }
        self.inner.delete(key).await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ScriptedError(pub String);

/// Auth gateway answering from queued responses.
#[derive(Default)]
pub struct ScriptedAuth {
    logins: Mutex<VecDeque<Result<AuthSession, String>>>,
    registrations: Mutex<VecDeque<Result<Registration, String>>>,
    login_calls: AtomicUsize,
}

impl ScriptedAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: Result<AuthSession, &str>) {
        self.logins
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    pub fn push_registration(&self, result: Result<Registration, &str>) {
        self.registrations
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

impl AuthGateway for ScriptedAuth {
    type Error = ScriptedError;

    async fn login(&self, _credentials: &Credentials) -> Result<AuthSession, ScriptedError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.logins.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err("no scripted login".into()))
            .map_err(ScriptedError)
    }

    async fn register(&self, _data: &RegistrationData) -> Result<Registration, ScriptedError> {
        let next = self.registrations.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err("no scripted registration".into()))
            .map_err(ScriptedError)
    }
}

/// Fixtures gateway serving canned events.
#[derive(Default)]
pub struct ScriptedFixtures {
    pub upcoming: Mutex<HashMap<String, Vec<Match>>>,
    pub past: Mutex<HashMap<String, Vec<Match>>>,
    pub offline: AtomicBool,
    upcoming_gate: Option<Arc<Notify>>,
}

impl ScriptedFixtures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every upcoming-list request until `gate` is notified.
    pub fn with_upcoming_gate(mut self, gate: Arc<Notify>) -> Self {
        self.upcoming_gate = Some(gate);
        self
    }

    pub fn with_upcoming(self, league: &str, events: Vec<Match>) -> Self {
        self.upcoming
            .lock()
            .unwrap()
            .insert(league.to_string(), events);
        self
    }

    pub fn with_past(self, league: &str, events: Vec<Match>) -> Self {
        self.past.lock().unwrap().insert(league.to_string(), events);
        self
    }

    fn check_online(&self) -> Result<(), ScriptedError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ScriptedError("HTTP error: connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl FixturesGateway for ScriptedFixtures {
    type Error = ScriptedError;

    async fn upcoming_matches(&self, league_id: &str) -> Result<Vec<Match>, ScriptedError> {
        if let Some(gate) = &self.upcoming_gate {
            gate.notified().await;
        }
        self.check_online()?;
        let events = self.upcoming.lock().unwrap().get(league_id).cloned();
        Ok(events.unwrap_or_default())
    }

    async fn past_matches(&self, league_id: &str) -> Result<Vec<Match>, ScriptedError> {
        self.check_online()?;
        let events = self.past.lock().unwrap().get(league_id).cloned();
        Ok(events.unwrap_or_default())
    }

    async fn match_details(&self, event_id: &str) -> Result<Option<Match>, ScriptedError> {
        self.check_online()?;
        let upcoming = self.upcoming.lock().unwrap();
        let past = self.past.lock().unwrap();
        Ok(upcoming
            .values()
            .chain(past.values())
            .flatten()
            .find(|m| m.id_event == event_id)
            .cloned())
    }
}
