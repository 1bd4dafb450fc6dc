//! Request/response shapes, one per endpoint.
//!
//! Journal and chart types live in `ledgerdesk-accounting` and are
//! re-exported here so callers can import every wire type from one place.

use serde::{Deserialize, Serialize};

use ledgerdesk_core::{CompanyId, UserId};

pub use ledgerdesk_accounting::{Account, CreateInvoice, CreateLedgerEntry, PostedEntry, SaveAccount};

/// `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "access_token", alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl core::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// `GET /auth/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub default_company_id: Option<CompanyId>,
}

/// Response of `POST /invoices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(
        default,
        alias = "total",
        deserialize_with = "ledgerdesk_core::money::serde_amount::deserialize"
    )]
    pub total_amount: f64,
}
