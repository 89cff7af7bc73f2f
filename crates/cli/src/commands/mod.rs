//! CLI command implementations.
//!
//! Every invocation rehydrates the cart from the data directory, applies one
//! command, and exits. The tokens from `session login` are kept in the same
//! directory, next to the cart blob, each as a JSON string.

pub mod cart;
pub mod checkout;
pub mod session;
pub mod storage;

use secrecy::SecretString;
use techverse_storefront::api::ApiClient;
use techverse_storefront::cart::CartEngine;
use techverse_storefront::config::StorefrontConfig;
use techverse_storefront::error::{AppError, Result};
use techverse_storefront::session::IdentityNotifier;
use techverse_storefront::storage::{FileStore, KeyValueStore};
use tracing::warn;

/// Storage key for the backend access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the backend refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Everything a command needs.
pub struct Context {
    pub config: StorefrontConfig,
    pub cart: CartEngine<FileStore>,
    pub notifier: IdentityNotifier,
    /// Second handle on the data directory for non-cart keys.
    tokens: FileStore,
}

impl Context {
    /// Open the data directory and rehydrate the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        let tokens = store.clone();

        Ok(Self {
            cart: CartEngine::load(store),
            notifier: IdentityNotifier::new(),
            tokens,
            config,
        })
    }

    /// Backend client, authenticated with the stored token if there is one,
    /// else with `TECHVERSE_ACCESS_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn api(&self) -> Result<ApiClient> {
        let api = ApiClient::new(&self.config.api)?;
        Ok(match self.stored_token() {
            Some(token) => api.with_token(token),
            None => api,
        })
    }

    /// Persist tokens from a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn save_tokens(&mut self, access: &str, refresh: Option<&str>) -> Result<()> {
        self.write_token(ACCESS_TOKEN_KEY, access)?;
        match refresh {
            Some(refresh) => self.write_token(REFRESH_TOKEN_KEY, refresh)?,
            None => self.tokens.remove(REFRESH_TOKEN_KEY)?,
        }
        Ok(())
    }

    /// Forget stored tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub fn clear_tokens(&mut self) -> Result<()> {
        self.tokens.remove(ACCESS_TOKEN_KEY)?;
        self.tokens.remove(REFRESH_TOKEN_KEY)?;
        Ok(())
    }

    fn write_token(&mut self, key: &str, token: &str) -> Result<()> {
        let json = serde_json::to_string(token)
            .map_err(|e| AppError::BadRequest(format!("unencodable token: {e}")))?;
        self.tokens.write(key, &json)?;
        Ok(())
    }

    fn stored_token(&self) -> Option<SecretString> {
        let raw = match self.tokens.read(ACCESS_TOKEN_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored access token");
                return None;
            }
        };

        match serde_json::from_str::<String>(&raw) {
            Ok(token) if !token.trim().is_empty() => Some(SecretString::from(token)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored access token");
                None
            }
        }
    }
}
