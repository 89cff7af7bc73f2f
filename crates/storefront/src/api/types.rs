//! Request and response payloads for the backend REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use techverse_core::{AddressId, OrderId, UserId};

/// Authenticated user as returned by `/api/auth/user/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
}

impl User {
    /// Whether the account belongs to a repair technician.
    #[must_use]
    pub fn is_technician(&self) -> bool {
        self.role.eq_ignore_ascii_case("TECHNICIAN")
    }
}

/// Body of `POST /api/auth/login/`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Tokens and user returned by a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: User,
}

/// One line of a bulk order, identified by product slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOrderItem {
    pub product_slug: String,
    pub quantity: u32,
}

/// Body of `POST /api/orders/create-bulk/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOrderRequest {
    pub address_id: AddressId,
    pub items: Vec<BulkOrderItem>,
}

/// Order created by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Error body shapes used by the backend.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub non_field_errors: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message in the body, if any.
    pub fn message(self) -> Option<String> {
        self.detail
            .or(self.error)
            .or_else(|| self.non_field_errors.into_iter().next())
    }
}
