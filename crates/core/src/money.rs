//! Monetary amounts as entered on forms.
//!
//! Amounts are plain `f64` currency units. Comparisons that matter for
//! double-entry go through [`BALANCE_TOLERANCE`] to absorb binary drift.

/// Largest debit/credit difference still treated as balanced.
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// Parse a user-entered amount.
///
/// Blank, non-numeric, non-finite and negative input all count as zero.
pub fn parse_amount(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().map(normalize_amount).unwrap_or(0.0)
}

/// Clamp a raw number into a valid line amount (finite, non-negative).
pub fn normalize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Serde adapter for amounts coming back from the API.
///
/// Decimal columns arrive either as JSON numbers or as numeric strings
/// (`"100.00"`); `null` reads as zero. Anything else is a decode error.
pub mod serde_amount {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(0.0),
            Some(Raw::Number(n)) => Ok(n),
            Some(Raw::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| D::Error::custom(format!("invalid amount: {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "serde_amount::deserialize")]
        amount: f64,
    }

    #[test]
    fn parses_plain_and_padded_numbers() {
        assert_eq!(parse_amount("100"), 100.0);
        assert_eq!(parse_amount(" 12.50 "), 12.5);
    }

    #[test]
    fn garbage_counts_as_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("-5"), 0.0);
    }

    #[test]
    fn api_amounts_accept_numbers_strings_and_null() {
        let row: Row = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        assert_eq!(row.amount, 12.5);
        let row: Row = serde_json::from_str(r#"{"amount": "100.00"}"#).unwrap();
        assert_eq!(row.amount, 100.0);
        let row: Row = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(row.amount, 0.0);
        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(row.amount, 0.0);
    }

    #[test]
    fn api_amounts_reject_garbage() {
        assert!(serde_json::from_str::<Row>(r#"{"amount": "twelve"}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"amount": true}"#).is_err());
    }
}
