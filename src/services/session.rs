// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context: bearer token plus the signed-in user.
//!
//! The context is created explicitly and handed to whatever needs it.
//! Lifecycle:
//! - [`SessionContext::restore`] loads the persisted session at startup and
//!   verifies the token against `GET /api/me`
//! - [`SessionContext::login`] / [`SessionContext::signup`] replace it
//! - [`SessionContext::logout`] clears memory and storage

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{ClientError, Result};
use crate::models::{AuthResponse, Profile, Role, User};
use crate::services::api::{AuthorizedClient, HerculesClient};
use crate::services::auth::{LoginForm, SignupForm};

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// What storage held. Token and user are stored independently; a corrupt
/// user record reads back as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSession {
    pub access_token: Option<String>,
    pub user: Option<User>,
}

/// Persistence for the session between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<PersistedSession>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<PersistedSession> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedSession::default())
            }
            Err(e) => return Err(ClientError::Session(e.to_string())),
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                return Ok(PersistedSession::default());
            }
        };

        Ok(PersistedSession {
            access_token: value
                .get("access_token")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            user: value
                .get("user")
                .cloned()
                .and_then(|u| serde_json::from_value(u).ok()),
        })
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::Session(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| ClientError::Session(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<PersistedSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with something already "persisted".
    pub fn with(persisted: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(persisted),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PersistedSession>> {
        self.inner
            .lock()
            .map_err(|_| ClientError::Session("session store lock poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<PersistedSession> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.lock()? = PersistedSession {
            access_token: Some(session.access_token.clone()),
            user: Some(session.user.clone()),
        };
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = PersistedSession::default();
        Ok(())
    }
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Not restored yet
    Loading,
    Anonymous,
    Authenticated(Session),
}

/// Explicit, injected session context.
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    state: SessionState,
    profile: Option<Profile>,
}

impl SessionContext {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            state: SessionState::Loading,
            profile: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    /// Role of the signed-in user; `None` without a session.
    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    /// Full profile, when it has been fetched this run.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Client bound to the session token.
    pub fn authorized(&self, client: &HerculesClient) -> Result<AuthorizedClient> {
        self.session()
            .map(|s| client.authorized(s.access_token.clone()))
            .ok_or_else(ClientError::unauthorized)
    }

    /// Restore the persisted session and verify the token.
    ///
    /// A token the server rejects clears storage. Any other failure keeps
    /// the stored session and uses it as-is.
    pub async fn restore(&mut self, client: &HerculesClient) -> Result<&SessionState> {
        let persisted = self.store.load()?;

        let Some(token) = persisted.access_token else {
            self.state = SessionState::Anonymous;
            return Ok(&self.state);
        };

        match client.me(&token).await {
            Ok(profile) => {
                tracing::info!(user_id = %profile.user.id, role = %profile.user.role, "Session restored");
                let session = Session {
                    access_token: token,
                    user: profile.user.clone(),
                };
                self.store.save(&session)?;
                self.profile = Some(profile);
                self.state = SessionState::Authenticated(session);
            }
            Err(
                e @ (ClientError::Unauthorized { .. }
                | ClientError::Forbidden { .. }
                | ClientError::NotFound { .. }),
            ) => {
                tracing::info!(error = %e, "Stored session is no longer valid, clearing");
                self.store.clear()?;
                self.profile = None;
                self.state = SessionState::Anonymous;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not verify session, using stored session");
                self.state = match persisted.user {
                    Some(user) => SessionState::Authenticated(Session {
                        access_token: token,
                        user,
                    }),
                    None => SessionState::Anonymous,
                };
            }
        }

        Ok(&self.state)
    }

    /// Log in and replace the current session.
    pub async fn login(&mut self, client: &HerculesClient, form: &LoginForm) -> Result<&User> {
        form.check()?;
        let response = client.login(&form.email, &form.password).await?;
        self.replace(response)
    }

    /// Create an account and sign in as the new user.
    pub async fn signup(&mut self, client: &HerculesClient, form: &SignupForm) -> Result<&User> {
        if self.is_authenticated() {
            return Err(ClientError::Validation(
                "Already logged in. Log out to create a new account.".to_string(),
            ));
        }
        form.check()?;
        let response = client.signup(&form.to_request()).await?;
        self.replace(response)
    }

    /// Replace the cached user (after re-fetching the profile).
    pub fn set_user(&mut self, user: User) -> Result<()> {
        let SessionState::Authenticated(session) = &mut self.state else {
            return Err(ClientError::unauthorized());
        };
        session.user = user;
        self.store.save(session)
    }

    /// Re-fetch the profile and update the cached user.
    pub async fn refresh_profile(&mut self, client: &HerculesClient) -> Result<&Profile> {
        let token = self
            .session()
            .map(|s| s.access_token.clone())
            .ok_or_else(ClientError::unauthorized)?;
        let profile = client.me(&token).await?;
        self.set_user(profile.user.clone())?;
        Ok(self.profile.insert(profile))
    }

    /// Clear the session from memory and storage.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = self.user() {
            tracing::info!(user_id = %user.id, "Logging out");
        }
        self.state = SessionState::Anonymous;
        self.profile = None;
        self.store.clear()
    }

    fn replace(&mut self, response: AuthResponse) -> Result<&User> {
        let session = Session {
            access_token: response.access_token,
            user: response.user,
        };
        self.store.save(&session)?;
        tracing::info!(user_id = %session.user.id, role = %session.user.role, "Signed in");

        self.profile = None;
        self.state = SessionState::Authenticated(session);
        self.user().ok_or_else(ClientError::unauthorized)
    }
}
