//! `ledgerdesk-post <entry.json>`: validate a journal entry locally and post it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use ledgerdesk_accounting::{LedgerEntry, LedgerLine, compute_totals};
use ledgerdesk_client::{ApiClient, ClientConfig, Session, SubmissionGate};
use ledgerdesk_core::DomainError;

/// On-disk draft. Amounts may be omitted; missing sides count as zero.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftFile {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    description: String,
    lines: Vec<DraftLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftLine {
    #[serde(default)]
    account_id: String,
    #[serde(default, deserialize_with = "ledgerdesk_core::money::serde_amount::deserialize")]
    debit: f64,
    #[serde(default, deserialize_with = "ledgerdesk_core::money::serde_amount::deserialize")]
    credit: f64,
    #[serde(default)]
    description: String,
}

impl DraftFile {
    fn into_entry(self) -> Result<LedgerEntry> {
        let mut lines = Vec::with_capacity(self.lines.len());
        for (i, raw) in self.lines.into_iter().enumerate() {
            if raw.debit > 0.0 && raw.credit > 0.0 {
                return Err(DomainError::validation(format!(
                    "line {} has both a debit and a credit",
                    i + 1
                ))
                .into());
            }
            let line = if raw.credit > 0.0 {
                LedgerLine::credit_line(raw.account_id, raw.credit)
            } else {
                LedgerLine::debit_line(raw.account_id, raw.debit)
            };
            lines.push(line.with_description(raw.description));
        }

        let date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Ok(LedgerEntry::with_lines(
            date,
            self.reference,
            self.description,
            lines,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    ledgerdesk_observability::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: ledgerdesk-post <entry.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let draft: DraftFile =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {path}"))?;
    let entry = draft.into_entry()?;

    let totals = compute_totals(entry.lines());
    tracing::info!(
        draft_id = %entry.draft_id(),
        debit = totals.debit,
        credit = totals.credit,
        difference = totals.difference(),
        "loaded draft"
    );

    let config = ClientConfig::from_env()?;
    let session = Session::new(config.token.clone())
        .on_unauthorized(|| tracing::error!("API rejected the token; set LEDGERDESK_TOKEN and retry"));
    let client = ApiClient::new(&config, session)?;
    let gate = SubmissionGate::new(client);

    match gate.submit(&entry).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(err) => anyhow::bail!(err.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_file_builds_entry() {
        let draft: DraftFile = serde_json::from_str(
            r#"{
                "date": "2024-07-01",
                "reference": "JV-12",
                "description": "Accrued wages",
                "lines": [
                    {"accountId": "6000", "debit": 500},
                    {"accountId": "2100", "credit": 500, "description": "payable"}
                ]
            }"#,
        )
        .unwrap();
        let entry = draft.into_entry().unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(entry.lines()[0].debit(), 500.0);
        assert_eq!(entry.lines()[1].credit(), 500.0);
        assert_eq!(entry.lines()[1].description, "payable");
        assert!(ledgerdesk_accounting::can_submit(&entry));
    }

    #[test]
    fn draft_line_with_both_sides_is_rejected() {
        let draft: DraftFile = serde_json::from_str(
            r#"{"lines": [{"accountId": "1000", "debit": 5, "credit": 5}]}"#,
        )
        .unwrap();
        let err = draft.into_entry().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn draft_amounts_may_be_numeric_strings() {
        let draft: DraftFile = serde_json::from_str(
            r#"{"lines": [
                {"accountId": "6000", "debit": "100.00"},
                {"accountId": "2100", "credit": "100.00", "debit": null}
            ]}"#,
        )
        .unwrap();
        let entry = draft.into_entry().unwrap();
        assert_eq!(entry.lines()[0].debit(), 100.0);
        assert_eq!(entry.lines()[1].credit(), 100.0);
        assert!(ledgerdesk_accounting::can_submit(&entry));
    }
}
