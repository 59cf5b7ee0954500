//! HTTP client for the StackIt backend.
//!
//! Every call goes through [`ApiClient::request`], which attaches the bearer
//! token when asked to, parses the body as JSON whatever the status, and folds
//! failures into [`ApiError`].

mod error;

use std::sync::Arc;

pub use error::{ApiError, ApiErrorKind, ApiResult, TRANSPORT_MESSAGE};
pub use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::token_store::TokenStore;

/// Standard User-Agent header for StackIt API requests.
pub const USER_AGENT: &str = concat!("stackit/", env!("CARGO_PKG_VERSION"));

/// StackIt API client.
///
/// Reads the token store to authorize requests but never writes to it.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues `method path` and returns the parsed JSON body.
    ///
    /// With `requires_auth`, the stored token (if any) is sent as a bearer
    /// credential. A missing token is not checked here; the request goes out
    /// without the header and the server decides.
    ///
    /// # Errors
    /// - `Server` for non-2xx responses.
    /// - `Transport` when no response was received.
    /// - `InvalidResponse` for a 2xx body that is not JSON.
    /// - `Storage` when the token store cannot be read.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json");

        if requires_auth {
            match self.tokens.get().map_err(|e| ApiError::storage(&e))? {
                Some(token) => builder = builder.bearer_auth(token),
                None => debug!(%method, path, "no token held; sending without authorization"),
            }
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "request failed before a response arrived");
            ApiError::transport()
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            warn!(%method, path, %status, error = %e, "failed to read response body");
            ApiError::transport()
        })?;
        debug!(%method, path, status = status.as_u16(), "response received");

        let parsed = parse_body(&text);

        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16(), parsed.as_ref()));
        }

        match parsed {
            Some(value) => Ok(value),
            None if text.trim().is_empty() => Ok(Value::Null),
            None => {
                warn!(%method, path, "success response was not JSON");
                Err(ApiError::invalid_response())
            }
        }
    }

    /// `GET path`, decoded into `T`.
    ///
    /// # Errors
    /// As [`ApiClient::request`]; a body that does not match `T` is
    /// `InvalidResponse`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        requires_auth: bool,
    ) -> ApiResult<T> {
        let value = self.request(Method::GET, path, None, requires_auth).await?;
        decode(path, value)
    }

    /// `POST path` with a JSON body, decoded into `T`.
    ///
    /// # Errors
    /// As [`ApiClient::request`]; a body that does not match `T` is
    /// `InvalidResponse`.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        requires_auth: bool,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|e| {
            warn!(path, error = %e, "failed to encode request body");
            ApiError::invalid_response()
        })?;
        let value = self
            .request(Method::POST, path, Some(&body), requires_auth)
            .await?;
        decode(path, value)
    }
}

fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        warn!(path, error = %e, "unexpected response shape");
        ApiError::invalid_response()
    })
}
