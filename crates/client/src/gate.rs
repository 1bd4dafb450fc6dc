//! Submission gate: the only path from an edited entry to the server.
//!
//! Order of checks on submit: a request already in flight, a view-only
//! (posted) entry, then the local balance check. Only after all three pass is
//! the persistence collaborator called, once.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use ledgerdesk_accounting::{BalanceError, LedgerEntry, balance};

use crate::dto::{Account, CreateLedgerEntry, PostedEntry};
use crate::error::ApiError;
use crate::http::ApiClient;

/// Shown when the server gives no reason of its own.
pub const GENERIC_SUBMIT_FAILURE: &str = "Failed to save journal entry";

/// Persistence collaborator for journal entries.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Accounts for the line selectors (read-only).
    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError>;

    async fn create_ledger_entry(&self, payload: &CreateLedgerEntry) -> Result<PostedEntry, ApiError>;
}

#[async_trait]
impl LedgerApi for ApiClient {
    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        ApiClient::list_accounts(self).await
    }

    async fn create_ledger_entry(&self, payload: &CreateLedgerEntry) -> Result<PostedEntry, ApiError> {
        self.create_journal_entry(payload).await
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected locally; no request was made.
    #[error(transparent)]
    Validation(#[from] BalanceError),

    #[error("Editing journal entries is not supported. Please reverse and create a new one.")]
    AlreadyPosted,

    #[error("a submission is already in progress")]
    InFlight,

    /// The request was made and failed.
    #[error(transparent)]
    Remote(#[from] ApiError),
}

impl SubmitError {
    /// Inline message for the form.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Remote(err) => err.user_message(GENERIC_SUBMIT_FAILURE),
            other => other.to_string(),
        }
    }

    /// True when nothing was sent to the server.
    pub fn is_local(&self) -> bool {
        !matches!(self, SubmitError::Remote(_))
    }
}

/// Clears the loading flag however the submit future ends.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SubmissionGate<A> {
    api: A,
    pending: AtomicBool,
}

impl<A: LedgerApi> SubmissionGate<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            pending: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Loading flag: a create request is awaiting its answer.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Whether the submit action should be enabled right now.
    pub fn can_submit(&self, entry: &LedgerEntry) -> bool {
        !self.is_pending() && !entry.is_posted() && balance::can_submit(entry)
    }

    /// Validate `entry` and post it. The entry is only borrowed, so on any
    /// error the caller still holds every line for correction and retry.
    pub async fn submit(&self, entry: &LedgerEntry) -> Result<PostedEntry, SubmitError> {
        let draft_id = entry.draft_id();

        if self.is_pending() {
            return Err(SubmitError::InFlight);
        }
        if entry.is_posted() {
            return Err(SubmitError::AlreadyPosted);
        }

        let payload = balance::validate(entry).inspect_err(|e| {
            tracing::info!(%draft_id, reason = %e, "submission blocked by local validation");
        })?;

        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        let _guard = PendingGuard(&self.pending);

        match self.api.create_ledger_entry(&payload).await {
            Ok(record) => {
                tracing::info!(%draft_id, entry_id = %record.id, lines = payload.entries.len(), "journal entry posted");
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(%draft_id, error = %err, "journal entry submission failed");
                Err(SubmitError::Remote(err))
            }
        }
    }
}
