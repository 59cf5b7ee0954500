//! Session controller: authentication state and the token lifecycle.
//!
//! The session is the only writer of the token store. State is derived from
//! the store on every read, since another process can log in or out behind
//! our back, and every observed change is published on a `watch` channel.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::config::Config;
use crate::forum::User;
use crate::token_store::{FileTokenStore, TokenStore};

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const ME_PATH: &str = "/api/auth/me";

/// Authentication state, decided solely by token presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.is_empty() => SessionState::Authenticated,
            _ => SessionState::Anonymous,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self == SessionState::Authenticated
    }
}

/// Where the user should be taken after an operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The question listing.
    Home,
    /// The login form.
    Login,
    /// A single question with its answers.
    Question(u64),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: User,
}

/// Login/register/logout plus the derived authentication state.
pub struct Session {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", &self.api)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session talking to `base_url`, with state seeded from `tokens`.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let api = ApiClient::new(base_url, Arc::clone(&tokens));
        let initial = read_state(tokens.as_ref());
        let (state, _) = watch::channel(initial);
        Self { api, tokens, state }
    }

    /// Session over the default credentials file and the configured origin.
    ///
    /// # Errors
    /// Returns an error if the effective base URL is invalid.
    pub fn from_config(config: &Config, base_url_override: Option<&str>) -> Result<Self> {
        let base_url = config.effective_base_url(base_url_override)?;
        Ok(Self::new(base_url, Arc::new(FileTokenStore::new())))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Current state, re-read from the token store.
    ///
    /// Publishes to subscribers if the store changed since the last read.
    pub fn state(&self) -> SessionState {
        let observed = read_state(self.tokens.as_ref());
        self.publish(observed);
        observed
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Receiver that sees every state transition this session observes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The held token, if any. Read failures count as "no token".
    pub fn token(&self) -> Option<String> {
        match self.tokens.get() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "failed to read token store");
                None
            }
        }
    }

    /// Logs in with a username or email; the backend disambiguates.
    ///
    /// On success the returned token replaces any stored one.
    ///
    /// # Errors
    /// Returns the API error unchanged (with "Login failed" as fallback
    /// message); the token store is not touched.
    pub async fn login(&self, identifier: &str, password: &str) -> ApiResult<Navigation> {
        let request = LoginRequest {
            identifier,
            password,
        };
        let response: TokenResponse = self
            .api
            .post_json(LOGIN_PATH, &request, false)
            .await
            .map_err(|e| e.or_fallback("Login failed"))?;

        self.store_token(&response.access_token)?;
        info!("logged in");
        Ok(Navigation::Home)
    }

    /// Creates an account. Registration also logs the user in.
    ///
    /// # Errors
    /// Returns the API error unchanged (with "Registration failed" as
    /// fallback message); the token store is not touched.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<Navigation> {
        let request = RegisterRequest {
            username,
            email,
            password,
        };
        let response: TokenResponse = self
            .api
            .post_json(REGISTER_PATH, &request, false)
            .await
            .map_err(|e| e.or_fallback("Registration failed"))?;

        self.store_token(&response.access_token)?;
        info!(username, "registered");
        Ok(Navigation::Home)
    }

    /// Forgets the token. Purely local; the server is not contacted.
    ///
    /// # Errors
    /// Returns a `Storage` error if the token store cannot be written.
    pub fn logout(&self) -> ApiResult<Navigation> {
        self.tokens.clear().map_err(|e| ApiError::storage(&e))?;
        self.publish(SessionState::Anonymous);
        info!("logged out");
        Ok(Navigation::Login)
    }

    /// Fetches the profile behind the held token.
    ///
    /// # Errors
    /// `NotAuthenticated` without a token (no request is sent), otherwise the
    /// API error.
    pub async fn current_user(&self) -> ApiResult<User> {
        self.require_token("You must be logged in to view your profile.")?;
        let response: MeResponse = self.api.get_json(ME_PATH, true).await?;
        Ok(response.user)
    }

    /// Fails fast with `message` when no token is held.
    pub(crate) fn require_token(&self, message: &str) -> ApiResult<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            debug!("short-circuiting: not authenticated");
            Err(ApiError::not_authenticated(message))
        }
    }

    fn store_token(&self, token: &str) -> ApiResult<()> {
        if token.is_empty() {
            warn!("server returned an empty access token");
            return Err(ApiError::invalid_response());
        }
        self.tokens.set(token).map_err(|e| ApiError::storage(&e))?;
        self.publish(SessionState::Authenticated);
        Ok(())
    }

    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                debug!(from = ?*current, to = ?next, "session state changed");
                *current = next;
                true
            }
        });
    }
}

fn read_state(tokens: &dyn TokenStore) -> SessionState {
    match tokens.get() {
        Ok(token) => SessionState::from_token(token.as_deref()),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "failed to read token store");
            SessionState::Anonymous
        }
    }
}
