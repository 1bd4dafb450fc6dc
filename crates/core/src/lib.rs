//! `ledgerdesk-core`: shared building blocks for the accounting client.
//!
//! Pure types only: identifiers, amounts, and the domain error. No IO.

pub mod error;
pub mod id;
pub mod money;

pub use error::DomainError;
pub use id::{AccountId, CompanyId, DraftId, EntryId, UserId};
pub use money::{BALANCE_TOLERANCE, normalize_amount, parse_amount};
