use chrono::{DateTime, NaiveDateTime, Utc};
use gastos_core::PaymentMethod;
use serde::Serialize;

/// Tag for records produced by the Spanish bank notification template.
pub const SOURCE_CHANNEL: &str = "spanish_bank";

/// Placeholder used in the description when no merchant was found.
pub const UNKNOWN_MERCHANT: &str = "Unknown";

const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A parsed `transaction_date`: local wall time when the text carried a
/// date, an absolute instant when the parser fell back to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionTime {
    Local(NaiveDateTime),
    Utc(DateTime<Utc>),
}

/// Structured output of the notification parser.
///
/// Built once by the parser and read-only afterwards. Serializes with the
/// key names the expense webhook expects (`source_email`, `raw_data`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    amount: Option<f64>,
    merchant: Option<String>,
    description: String,
    /// `YYYY-MM-DDTHH:MM:SS` when the text carried a date, otherwise the
    /// parse instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    transaction_date: String,
    #[serde(rename = "source_email")]
    source_channel: &'static str,
    #[serde(rename = "raw_data")]
    raw_text: String,
    payment_method: PaymentMethod,
    card_last_four: Option<String>,
}

impl TransactionRecord {
    pub(crate) fn new(
        raw_text: &str,
        amount: Option<f64>,
        merchant: Option<String>,
        transaction_date: String,
        payment_method: PaymentMethod,
        card_last_four: Option<String>,
    ) -> Self {
        let description = format!(
            "Purchase at {}",
            merchant.as_deref().unwrap_or(UNKNOWN_MERCHANT)
        );

        Self {
            amount,
            merchant,
            description,
            transaction_date,
            source_channel: SOURCE_CHANNEL,
            raw_text: raw_text.to_string(),
            payment_method,
            card_last_four,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    pub fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn transaction_date(&self) -> &str {
        &self.transaction_date
    }

    pub fn source_channel(&self) -> &str {
        self.source_channel
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn card_last_four(&self) -> Option<&str> {
        self.card_last_four.as_deref()
    }

    /// Parse `transaction_date` back, keeping track of which form it was.
    ///
    /// Returns `None` for a matched date that is not a real calendar day
    /// (e.g. 31/11).
    pub fn transaction_time(&self) -> Option<TransactionTime> {
        if let Ok(local) = NaiveDateTime::parse_from_str(&self.transaction_date, LOCAL_TIMESTAMP_FORMAT) {
            return Some(TransactionTime::Local(local));
        }
        DateTime::parse_from_rfc3339(&self.transaction_date)
            .ok()
            .map(|dt| TransactionTime::Utc(dt.with_timezone(&Utc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(merchant: Option<&str>, date: &str) -> TransactionRecord {
        TransactionRecord::new(
            "raw",
            Some(1500.0),
            merchant.map(str::to_string),
            date.to_string(),
            PaymentMethod::DebitCard,
            None,
        )
    }

    #[test]
    fn test_description_uses_merchant_or_placeholder() {
        assert_eq!(record(Some("Jumbo"), "2025-01-01T10:00:00").description(), "Purchase at Jumbo");
        assert_eq!(record(None, "2025-01-01T10:00:00").description(), "Purchase at Unknown");
    }

    #[test]
    fn test_serializes_webhook_keys() {
        let v = serde_json::to_value(record(None, "2025-01-01T10:00:00")).unwrap();
        assert_eq!(v["source_email"], "spanish_bank");
        assert_eq!(v["raw_data"], "raw");
        assert_eq!(v["payment_method"], "DEBIT_CARD");
        assert!(v["merchant"].is_null());
        assert!(v["card_last_four"].is_null());
        assert_eq!(v["amount"], 1500.0);
    }

    #[test]
    fn test_transaction_time_both_forms() {
        let local = record(None, "2025-07-19T22:23:00").transaction_time().unwrap();
        let TransactionTime::Local(local) = local else {
            panic!("expected local time, got {local:?}");
        };
        assert_eq!(local.to_string(), "2025-07-19 22:23:00");

        let fallback = record(None, "2026-03-02T08:15:30.250Z").transaction_time().unwrap();
        let TransactionTime::Utc(fallback) = fallback else {
            panic!("expected UTC instant, got {fallback:?}");
        };
        assert_eq!(fallback.to_rfc3339(), "2026-03-02T08:15:30.250+00:00");

        assert!(record(None, "2025-11-31T10:00:00").transaction_time().is_none());
    }
}
