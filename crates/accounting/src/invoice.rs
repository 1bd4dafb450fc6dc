//! Invoice form totals.
//!
//! Same shape as the journal-entry check: a pure recomputation over the
//! current lines, run on every edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceType {
    Sales,
    Purchase,
}

/// One invoice row. Percentages are 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub tax_percentage: f64,
}

impl InvoiceLine {
    /// A fresh row: quantity 1, everything else zero.
    pub fn blank() -> Self {
        Self {
            item_id: None,
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
            discount_percentage: 0.0,
            tax_percentage: 0.0,
        }
    }

    pub fn gross(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn discount(&self) -> f64 {
        self.gross() * (self.discount_percentage / 100.0)
    }

    /// Tax applies to the discounted amount.
    pub fn tax(&self) -> f64 {
        (self.gross() - self.discount()) * (self.tax_percentage / 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub total_discount: f64,
    pub total_tax: f64,
    pub total: f64,
}

pub fn compute_invoice_totals<'a>(lines: impl IntoIterator<Item = &'a InvoiceLine>) -> InvoiceTotals {
    let mut totals = InvoiceTotals::default();
    for line in lines {
        totals.subtotal += line.gross();
        totals.total_discount += line.discount();
        totals.total_tax += line.tax();
    }
    totals.total = totals.subtotal - totals.total_discount + totals.total_tax;
    totals
}

/// Create request for `POST /invoices`.
///
/// Exactly one of `customer_id`/`supplier_id` is expected, matching
/// `invoice_type`; the server enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    pub invoice_type: InvoiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    pub lines: Vec<InvoiceLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: f64, unit_price: f64, discount: f64, tax: f64) -> InvoiceLine {
        InvoiceLine {
            quantity,
            unit_price,
            discount_percentage: discount,
            tax_percentage: tax,
            ..InvoiceLine::blank()
        }
    }

    #[test]
    fn tax_is_charged_after_discount() {
        let l = line(2.0, 50.0, 10.0, 15.0);
        assert_eq!(l.gross(), 100.0);
        assert_eq!(l.discount(), 10.0);
        assert!((l.tax() - 13.5).abs() < 1e-9);
    }

    #[test]
    fn totals_sum_across_lines() {
        let lines = vec![line(2.0, 50.0, 10.0, 15.0), line(1.0, 20.0, 0.0, 0.0)];
        let totals = compute_invoice_totals(&lines);
        assert_eq!(totals.subtotal, 120.0);
        assert_eq!(totals.total_discount, 10.0);
        assert!((totals.total_tax - 13.5).abs() < 1e-9);
        assert!((totals.total - 123.5).abs() < 1e-9);
    }

    #[test]
    fn empty_invoice_totals_zero() {
        assert_eq!(compute_invoice_totals(std::iter::empty()), InvoiceTotals::default());
    }

    #[test]
    fn create_request_omits_unused_party() {
        let req = CreateInvoice {
            invoice_type: InvoiceType::Sales,
            customer_id: Some("c-1".to_string()),
            supplier_id: None,
            invoice_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: String::new(),
            notes: String::new(),
            lines: vec![InvoiceLine::blank()],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["invoiceType"], "SALES");
        assert_eq!(json["customerId"], "c-1");
        assert!(json.get("supplierId").is_none());
        assert_eq!(json["lines"][0]["quantity"], 1.0);
    }
}
