//! Identity session holder.
//!
//! [`AuthService`] owns the signed-in [`Session`] and talks to an
//! [`IdentityProvider`] (the Cognito user pool in production). It is a cheap
//! clone-able handle; all clones see the same session.
//!
//! A failed login never changes the authentication state: a user who was
//! signed out stays signed out and a signed-in user keeps their session.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

pub mod cognito;
pub mod session_store;

pub use cognito::CognitoProvider;
pub use session_store::SessionStore;

use crate::backend::UserContext;
use crate::constants::{LOGIN_FAILED, LOGIN_PASSWORD_UPDATE_REQUIRED, LOGIN_SUCCESS, SIGNUP_FAILED_FALLBACK};

/// Sessions this close to expiry are refreshed before use
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Errors reported by the identity provider.
///
/// Provider-originated variants display the provider's own message, which the
/// sign-up view shows to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    UserNotConfirmed(String),

    #[error("{0}")]
    UsernameExists(String),

    #[error("{0}")]
    InvalidPassword(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{code}: {message}")]
    Service { code: String, message: String },
}

/// Tokens of a signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Username the user signed in with (their email); used as the task owner id
    pub username: String,
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn needs_refresh(&self) -> bool {
        Utc::now() + Duration::seconds(REFRESH_MARGIN_SECONDS) >= self.expires_at
    }
}

/// Result of a password login
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Session),
    /// The provider wants the user to choose a new password first
    NewPasswordRequired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// False until the user confirms their email address
    pub user_confirmed: bool,
    pub user_sub: Option<String>,
}

/// Hosted identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError>;

    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Exchange the refresh token of `session` for fresh tokens
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;

    /// Invalidate the tokens of `session` on the provider side
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

/// Colour class of the login status line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginStatus {
    Success,
    Failure,
    Warning,
}

impl LoginStatus {
    /// Status line for the outcome of a login attempt
    pub fn for_result(result: &Result<LoginOutcome, AuthError>) -> (LoginStatus, &'static str) {
        match result {
            Ok(LoginOutcome::Authenticated(_)) => (LoginStatus::Success, LOGIN_SUCCESS),
            Ok(LoginOutcome::NewPasswordRequired) => (LoginStatus::Warning, LOGIN_PASSWORD_UPDATE_REQUIRED),
            Err(_) => (LoginStatus::Failure, LOGIN_FAILED),
        }
    }
}

/// Message shown when sign-up fails.
///
/// Provider messages look like `"Password did not conform with policy: Password
/// not long enough"`; the part after the first colon is shown.
pub fn signup_error_message(provider_message: &str) -> String {
    let detail = match provider_message.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => provider_message.trim(),
    };
    if detail.is_empty() {
        SIGNUP_FAILED_FALLBACK.to_string()
    } else {
        detail.to_string()
    }
}

/// Clone-able handle to the current session
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    store: Option<SessionStore>,
    session: Arc<RwLock<Option<Session>>>,
}

impl AuthService {
    /// `store` persists the session between runs; `None` keeps it in memory only
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Option<SessionStore>) -> Self {
        Self {
            provider,
            store,
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Owner id for task requests; `None` unless authenticated
    pub fn user_id(&self) -> Option<String> {
        self.session().map(|s| s.username)
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    /// Identity passed to the task backend
    pub fn user_context(&self) -> Option<UserContext> {
        self.session().map(|s| UserContext {
            user_id: s.username,
            id_token: Some(s.id_token),
        })
    }

    /// Like [`user_context`](Self::user_context), refreshing tokens that are about to expire.
    ///
    /// A failed refresh keeps the current tokens; the backend will reject them
    /// if they really expired.
    pub async fn fresh_user_context(&self) -> Option<UserContext> {
        let session = self.session()?;
        if session.needs_refresh() && session.refresh_token.is_some() {
            match self.provider.refresh(&session).await {
                Ok(refreshed) => {
                    info!("🔑 Refreshed session for {}", refreshed.username);
                    self.set_session(Some(refreshed));
                }
                Err(e) => warn!("⚠️  Session refresh failed: {}", e),
            }
        }
        self.user_context()
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let outcome = self.provider.authenticate(email, password).await;
        match &outcome {
            Ok(LoginOutcome::Authenticated(session)) => {
                info!("🔓 Signed in as {}", session.username);
                self.set_session(Some(session.clone()));
            }
            Ok(LoginOutcome::NewPasswordRequired) => info!("🔑 New password required for {}", email),
            Err(e) => warn!("❌ Login failed for {}: {}", email, e),
        }
        outcome
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let request = SignUpRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let outcome = self.provider.sign_up(&request).await;
        match &outcome {
            Ok(_) => info!("✅ Created account for {}", request.email),
            Err(e) => warn!("❌ Sign-up failed for {}: {}", request.email, e),
        }
        outcome
    }

    /// Sign out locally; the provider-side sign-out is best effort
    pub async fn logout(&self) {
        if let Some(session) = self.session() {
            if let Err(e) = self.provider.sign_out(&session).await {
                warn!("⚠️  Remote sign-out failed: {}", e);
            }
            info!("🔒 Signed out {}", session.username);
        }
        self.set_session(None);
    }

    /// Restore the session saved by a previous run.
    ///
    /// Returns whether the user is authenticated afterwards.
    pub async fn restore_session(&self) -> bool {
        let Some(stored) = self.store.as_ref().and_then(SessionStore::load) else {
            return false;
        };

        if !stored.is_expired() {
            info!("🔓 Restored session for {}", stored.username);
            self.set_session(Some(stored));
            return true;
        }

        if stored.refresh_token.is_some() {
            match self.provider.refresh(&stored).await {
                Ok(refreshed) => {
                    info!("🔓 Restored and refreshed session for {}", refreshed.username);
                    self.set_session(Some(refreshed));
                    return true;
                }
                Err(e) => warn!("⚠️  Stored session could not be refreshed: {}", e),
            }
        }

        self.set_session(None);
        false
    }

    fn set_session(&self, session: Option<Session>) {
        if let Some(store) = &self.store {
            let persisted = match &session {
                Some(session) => store.save(session),
                None => store.clear(),
            };
            if let Err(e) = persisted {
                warn!("⚠️  {:#}", e);
            }
        }
        if let Ok(mut current) = self.session.write() {
            *current = session;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_error_uses_text_after_colon() {
        assert_eq!(
            signup_error_message("Password did not conform with policy: Password not long enough"),
            "Password not long enough"
        );
        assert_eq!(signup_error_message("User already exists"), "User already exists");
        assert_eq!(signup_error_message(""), SIGNUP_FAILED_FALLBACK);
        assert_eq!(signup_error_message("Oops:"), SIGNUP_FAILED_FALLBACK);
    }
}
