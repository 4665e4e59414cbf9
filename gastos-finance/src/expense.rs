//! Expense assembly: a parsed notification enriched with billing date and
//! category, in the shape the expense store accepts.

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use gastos_core::{PaymentMethod, to_local};
use gastos_ingest::{TransactionRecord, TransactionTime};
use serde::Serialize;

use crate::billing::BillingCycle;
use crate::category_rules::Categorizer;

const MAX_MERCHANT_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub amount: f64,
    pub merchant: String,
    pub description: String,
    pub transaction_date: NaiveDateTime,
    /// When the expense affects the budget
    pub billing_date: NaiveDateTime,
    pub payment_method: PaymentMethod,
    pub card_last_four: Option<String>,
    pub category: Option<String>,
    pub auto_categorized: bool,
    pub confidence_score: Option<f64>,
    pub source_email: String,
    pub raw_data: String,
}

impl Expense {
    /// Fails when the notification lacks a positive amount, a merchant, or a
    /// real calendar date.
    ///
    /// `tz` is the zone notification dates are written in; a fallback
    /// timestamp (UTC) is converted into it before billing.
    pub fn from_record(
        record: &TransactionRecord,
        cycle: &BillingCycle,
        categorizer: &Categorizer,
        tz: &str,
    ) -> Result<Self> {
        let amount = record.amount().context("notification has no amount")?;
        if amount <= 0.0 {
            bail!("amount must be positive, got {amount}");
        }

        let merchant = record.merchant().context("notification has no merchant")?;
        if merchant.chars().count() > MAX_MERCHANT_LEN {
            bail!("merchant longer than {MAX_MERCHANT_LEN} characters");
        }

        let transaction_date = match record.transaction_time() {
            Some(TransactionTime::Local(local)) => local,
            Some(TransactionTime::Utc(instant)) => to_local(instant, tz)?,
            None => bail!("invalid transaction date: {}", record.transaction_date()),
        };

        let payment_method = record.payment_method();
        let matched = categorizer.categorize(merchant);

        Ok(Self {
            amount,
            merchant: merchant.to_string(),
            description: record.description().to_string(),
            transaction_date,
            billing_date: cycle.billing_date(transaction_date, payment_method),
            payment_method,
            card_last_four: record.card_last_four().map(str::to_string),
            auto_categorized: matched.is_some(),
            confidence_score: matched.as_ref().map(|m| m.confidence),
            category: matched.map(|m| m.category),
            source_email: record.source_channel().to_string(),
            raw_data: record.raw_text().to_string(),
        })
    }

    pub fn is_deferred(&self) -> bool {
        self.billing_date > self.transaction_date
    }
}
