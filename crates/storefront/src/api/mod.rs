//! Backend REST API client.
//!
//! Covers the calls the storefront makes on its own behalf: logging in,
//! checking the current session, logging out, and placing a bulk order from
//! the cart. Everything else on the backend is out of reach of this crate.

mod types;

pub use types::{BulkOrderItem, BulkOrderRequest, LoginResponse, OrderSummary, User};

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;
use types::{ErrorBody, LoginRequest};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Missing or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to build a URL or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<SecretString>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("techverse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Use `token` for subsequent authenticated calls.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Whether a bearer token is configured.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for rejected credentials, or another error if
    /// the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("api/auth/login/")?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let login: LoginResponse = Self::parse_response(response).await?;
        debug!(user_id = %login.user.id, "Login accepted");
        Ok(login)
    }

    /// Fetch the user the configured token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if there is no token or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let token = self.token()?;
        let url = self.endpoint("api/auth/user/")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// End the server-side session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("api/auth/logout/")?;
        let mut request = self.client.post(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Create one order covering every line in `request`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if there is no token, or another error if the
    /// backend rejects the order.
    #[instrument(skip(self, request), fields(address_id = %request.address_id, lines = request.items.len()))]
    pub async fn create_bulk_order(
        &self,
        request: &BulkOrderRequest,
    ) -> Result<OrderSummary, ApiError> {
        let token = self.token()?;
        let url = self.endpoint("api/orders/create-bulk/")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Resolve `path` against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Parse(format!("invalid endpoint {path}: {e}")))
    }

    fn token(&self) -> Result<&SecretString, ApiError> {
        self.access_token
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("not logged in".to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or(text);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = client("https://shop.example.in/backend");
        assert_eq!(
            api.endpoint("api/auth/user/").unwrap().as_str(),
            "https://shop.example.in/backend/api/auth/user/"
        );
    }

    #[test]
    fn test_token_required() {
        let api = client("http://127.0.0.1:8000");
        assert!(!api.has_token());
        assert!(matches!(api.token(), Err(ApiError::Unauthorized(_))));

        let api = api.with_token(SecretString::from("token"));
        assert!(api.has_token());
        assert!(api.token().is_ok());
    }

    #[tokio::test]
    async fn test_current_user_without_token_fails_fast() {
        let api = client("http://127.0.0.1:9");
        let err = api.current_user().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let api = client("http://127.0.0.1:8000").with_token(SecretString::from("s3cr3t-token"));
        let debug_output = format!("{api:?}");
        assert!(!debug_output.contains("s3cr3t-token"));
        assert!(debug_output.contains("has_token: true"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: "Address not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - Address not found");
    }
}
