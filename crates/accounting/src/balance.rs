//! Client-side balance validation for journal-entry forms.
//!
//! Everything here is a pure function of the current line set: it is meant to
//! run on every edit for live feedback and once more on submit. The server
//! re-validates; this check only saves obviously invalid round trips.

use thiserror::Error;

use ledgerdesk_core::BALANCE_TOLERANCE;

use crate::ledger::{CreateLedgerEntry, CreateLedgerLine, LedgerEntry, LedgerLine};

/// Independent debit and credit sums over a line set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub debit: f64,
    pub credit: f64,
}

impl Totals {
    pub fn difference(&self) -> f64 {
        difference(self)
    }

    /// Balanced within [`BALANCE_TOLERANCE`].
    pub fn is_balanced(&self) -> bool {
        is_balanced(self, BALANCE_TOLERANCE)
    }
}

/// Why an entry may not be submitted. Shown inline; never a panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    #[error("Debits (${debit}) must equal Credits (${credit}), difference ${difference:.2}")]
    Unbalanced {
        debit: f64,
        credit: f64,
        difference: f64,
    },

    #[error("Journal entry cannot be empty")]
    Empty,

    /// `line` is 1-based, as shown on the form.
    #[error("Line {line} has no account selected")]
    MissingAccount { line: usize },
}

pub fn compute_totals<'a>(lines: impl IntoIterator<Item = &'a LedgerLine>) -> Totals {
    lines.into_iter().fold(Totals::default(), |acc, line| Totals {
        debit: acc.debit + line.debit(),
        credit: acc.credit + line.credit(),
    })
}

pub fn difference(totals: &Totals) -> f64 {
    (totals.debit - totals.credit).abs()
}

pub fn is_balanced(totals: &Totals, tolerance: f64) -> bool {
    difference(totals) <= tolerance
}

/// Whether the submit action should be enabled.
pub fn can_submit(entry: &LedgerEntry) -> bool {
    check(entry).is_ok()
}

/// Run the submission checks, in the order the form reports them:
/// balance, then non-empty, then accounts.
pub fn check(entry: &LedgerEntry) -> Result<Totals, BalanceError> {
    let totals = compute_totals(entry.lines());

    if !totals.is_balanced() {
        return Err(BalanceError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
            difference: totals.difference(),
        });
    }

    if totals.debit <= 0.0 {
        return Err(BalanceError::Empty);
    }

    if let Some(pos) = entry.lines().iter().position(|l| l.account_id.is_blank()) {
        return Err(BalanceError::MissingAccount { line: pos + 1 });
    }

    Ok(totals)
}

/// Check `entry` and build the create request.
///
/// Lines with neither a debit nor a credit are dropped. A line without its own
/// description inherits the entry description.
pub fn validate(entry: &LedgerEntry) -> Result<CreateLedgerEntry, BalanceError> {
    check(entry)?;

    let entries = entry
        .lines()
        .iter()
        .filter(|line| !line.is_blank_amount())
        .map(|line| CreateLedgerLine {
            account_id: line.account_id.clone(),
            debit: line.debit(),
            credit: line.credit(),
            description: if line.description.trim().is_empty() {
                entry.description.clone()
            } else {
                line.description.clone()
            },
        })
        .collect();

    Ok(CreateLedgerEntry {
        date: entry.date,
        reference: entry.reference.clone(),
        description: entry.description.clone(),
        entries,
    })
}
