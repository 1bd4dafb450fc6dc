//! `ledgerdesk-client`
//!
//! **Responsibility:** the client side of the accounting API.
//!
//! This crate provides:
//! - A typed HTTP client with an explicit session (token + 401 hook)
//! - Per-endpoint request/response types
//! - The submission gate for journal entries (local balance check, one
//!   request in flight at a time)
//!
//! The server stays the authority; nothing here persists data.

pub mod config;
pub mod dto;
pub mod error;
pub mod gate;
pub mod http;
pub mod session;

pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use gate::{LedgerApi, SubmissionGate, SubmitError};
pub use http::ApiClient;
pub use session::Session;
