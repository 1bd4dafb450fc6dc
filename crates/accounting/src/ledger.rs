use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerdesk_core::{AccountId, DraftId, EntryId, normalize_amount, parse_amount};

/// Fewest lines an entry may be edited down to.
pub const MIN_LINES: usize = 2;

/// One row of a journal entry form.
///
/// Invariant: at most one of `debit`/`credit` is non-zero. The fields are
/// private so every write goes through the setters that enforce it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerLine {
    pub account_id: AccountId,
    debit: f64,
    credit: f64,
    pub description: String,
}

impl LedgerLine {
    /// A line with no account and no amount.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn debit_line(account_id: impl Into<AccountId>, amount: f64) -> Self {
        let mut line = Self {
            account_id: account_id.into(),
            ..Self::default()
        };
        line.set_debit(amount);
        line
    }

    pub fn credit_line(account_id: impl Into<AccountId>, amount: f64) -> Self {
        let mut line = Self {
            account_id: account_id.into(),
            ..Self::default()
        };
        line.set_credit(amount);
        line
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn debit(&self) -> f64 {
        self.debit
    }

    pub fn credit(&self) -> f64 {
        self.credit
    }

    /// Set the debit side. A non-zero debit clears the credit.
    pub fn set_debit(&mut self, amount: f64) {
        self.debit = normalize_amount(amount);
        if self.debit > 0.0 {
            self.credit = 0.0;
        }
    }

    /// Set the credit side. A non-zero credit clears the debit.
    pub fn set_credit(&mut self, amount: f64) {
        self.credit = normalize_amount(amount);
        if self.credit > 0.0 {
            self.debit = 0.0;
        }
    }

    /// Set the debit from raw form text (non-numeric reads as zero).
    pub fn set_debit_input(&mut self, input: &str) {
        self.set_debit(parse_amount(input));
    }

    /// Set the credit from raw form text (non-numeric reads as zero).
    pub fn set_credit_input(&mut self, input: &str) {
        self.set_credit(parse_amount(input));
    }

    /// Both sides are zero; such lines are dropped from the payload.
    pub fn is_blank_amount(&self) -> bool {
        self.debit <= 0.0 && self.credit <= 0.0
    }

    /// Same account, sides swapped.
    fn reversed(&self) -> Self {
        Self {
            account_id: self.account_id.clone(),
            debit: self.credit,
            credit: self.debit,
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("line {index} does not exist (entry has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    #[error("a journal entry needs at least two lines")]
    MinimumLines,
}

/// A journal entry being edited on the client.
///
/// Built empty (two blank lines) or from a posted record. A loaded record is
/// view-only: posted entries are corrected by [`LedgerEntry::reversal_of`],
/// never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    draft_id: DraftId,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    lines: Vec<LedgerLine>,
    posted_as: Option<EntryId>,
}

impl LedgerEntry {
    /// Empty entry dated `date` with the minimum number of blank lines.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            draft_id: DraftId::new(),
            date,
            reference: String::new(),
            description: String::new(),
            lines: vec![LedgerLine::blank(); MIN_LINES],
            posted_as: None,
        }
    }

    /// Empty entry dated today (local time).
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Entry pre-populated with `lines`, padded with blank lines up to the minimum.
    pub fn with_lines(
        date: NaiveDate,
        reference: impl Into<String>,
        description: impl Into<String>,
        lines: impl IntoIterator<Item = LedgerLine>,
    ) -> Self {
        let mut lines: Vec<LedgerLine> = lines.into_iter().collect();
        while lines.len() < MIN_LINES {
            lines.push(LedgerLine::blank());
        }
        Self {
            draft_id: DraftId::new(),
            date,
            reference: reference.into(),
            description: description.into(),
            lines,
            posted_as: None,
        }
    }

    /// View of a posted record. Submitting it is refused by the gate.
    pub fn from_posted(record: &PostedEntry) -> Self {
        let mut entry = Self::with_lines(
            record.date,
            record.reference.clone().unwrap_or_default(),
            record.description.clone().unwrap_or_default(),
            record.lines.iter().map(PostedLine::to_line),
        );
        entry.posted_as = Some(record.id.clone());
        entry
    }

    /// New draft that offsets `record`: every debit becomes a credit and
    /// vice versa, against the same accounts.
    pub fn reversal_of(record: &PostedEntry, date: NaiveDate) -> Self {
        let label = record
            .reference
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(record.id.as_str());
        let description = match record.description.as_deref() {
            Some(d) if !d.trim().is_empty() => format!("Reversal of {label}: {d}"),
            _ => format!("Reversal of {label}"),
        };
        Self::with_lines(
            date,
            format!("REV-{label}"),
            description,
            record.lines.iter().map(|l| l.to_line().reversed()),
        )
    }

    pub fn draft_id(&self) -> DraftId {
        self.draft_id
    }

    /// Server id when this entry was loaded from a posted record.
    pub fn posted_as(&self) -> Option<&EntryId> {
        self.posted_as.as_ref()
    }

    pub fn is_posted(&self) -> bool {
        self.posted_as.is_some()
    }

    pub fn lines(&self) -> &[LedgerLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Result<&LedgerLine, LedgerError> {
        let len = self.lines.len();
        self.lines
            .get(index)
            .ok_or(LedgerError::LineOutOfRange { index, len })
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut LedgerLine, LedgerError> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(LedgerError::LineOutOfRange { index, len })
    }

    /// Append a blank line; returns its index.
    pub fn add_line(&mut self) -> usize {
        self.lines.push(LedgerLine::blank());
        self.lines.len() - 1
    }

    /// Removal is disabled once only the minimum number of lines is left.
    pub fn can_remove_line(&self) -> bool {
        self.lines.len() > MIN_LINES
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LedgerLine, LedgerError> {
        let len = self.lines.len();
        if index >= len {
            return Err(LedgerError::LineOutOfRange { index, len });
        }
        if !self.can_remove_line() {
            return Err(LedgerError::MinimumLines);
        }
        Ok(self.lines.remove(index))
    }

    pub fn set_account(
        &mut self,
        index: usize,
        account_id: impl Into<AccountId>,
    ) -> Result<(), LedgerError> {
        self.line_mut(index)?.account_id = account_id.into();
        Ok(())
    }

    pub fn set_debit(&mut self, index: usize, amount: f64) -> Result<(), LedgerError> {
        self.line_mut(index)?.set_debit(amount);
        Ok(())
    }

    pub fn set_credit(&mut self, index: usize, amount: f64) -> Result<(), LedgerError> {
        self.line_mut(index)?.set_credit(amount);
        Ok(())
    }

    pub fn set_debit_input(&mut self, index: usize, input: &str) -> Result<(), LedgerError> {
        self.line_mut(index)?.set_debit_input(input);
        Ok(())
    }

    pub fn set_credit_input(&mut self, index: usize, input: &str) -> Result<(), LedgerError> {
        self.line_mut(index)?.set_credit_input(input);
        Ok(())
    }

    pub fn set_line_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.line_mut(index)?.description = description.into();
        Ok(())
    }
}

/// Create request for `POST /journal`.
///
/// Only produced by [`crate::balance::validate`], so a value of this type has
/// already passed the client-side balance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLedgerEntry {
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub entries: Vec<CreateLedgerLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLedgerLine {
    pub account_id: AccountId,
    pub debit: f64,
    pub credit: f64,
    pub description: String,
}

/// A journal entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedEntry {
    pub id: EntryId,
    #[serde(alias = "entryDate", deserialize_with = "api_date::deserialize")]
    pub date: NaiveDate,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "entries")]
    pub lines: Vec<PostedLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedLine {
    pub account_id: AccountId,
    #[serde(default, deserialize_with = "ledgerdesk_core::money::serde_amount::deserialize")]
    pub debit: f64,
    #[serde(default, deserialize_with = "ledgerdesk_core::money::serde_amount::deserialize")]
    pub credit: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl PostedLine {
    fn to_line(&self) -> LedgerLine {
        let mut line = LedgerLine {
            account_id: self.account_id.clone(),
            description: self.description.clone().unwrap_or_default(),
            ..LedgerLine::default()
        };
        // A malformed record carrying both sides keeps its debit.
        line.set_credit(self.credit);
        line.set_debit(self.debit);
        line
    }
}

/// Dates arrive as `YYYY-MM-DD` or as full RFC 3339 timestamps.
mod api_date {
    use super::*;
    use serde::Deserializer;
    use serde::de::Error as _;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .map_err(|e| D::Error::custom(format!("invalid date {raw:?}: {e}")))
    }
}
