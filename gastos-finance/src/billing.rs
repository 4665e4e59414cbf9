//! Billing logic per payment method.
//!
//! Credit-card charges hit the budget on the card's billing day; every other
//! method hits it immediately.

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use gastos_core::PaymentMethod;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::expense::Expense;

pub const DEFAULT_BILLING_DAY: u32 = 25;

/// Monthly credit-card statement cycle closing on a fixed day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCycle {
    billing_day: u32,
}

impl Default for BillingCycle {
    fn default() -> Self {
        Self {
            billing_day: DEFAULT_BILLING_DAY,
        }
    }
}

impl BillingCycle {
    pub fn new(billing_day: u32) -> Result<Self> {
        if !(1..=31).contains(&billing_day) {
            bail!("credit card billing day must be between 1 and 31, got {billing_day}");
        }
        Ok(Self { billing_day })
    }

    pub fn billing_day(&self) -> u32 {
        self.billing_day
    }

    /// When a transaction affects the budget.
    ///
    /// Credit card: this month's billing day if the transaction falls before
    /// it, otherwise next month's. The billing day is clamped to the month's
    /// length. Time of day is kept.
    pub fn billing_date(&self, transaction_date: NaiveDateTime, method: PaymentMethod) -> NaiveDateTime {
        if !method.is_deferred() {
            return transaction_date;
        }

        let (year, month) = (transaction_date.year(), transaction_date.month());
        let this_cycle = self.billing_day.min(days_in_month(year, month));

        let (year, month, day) = if transaction_date.day() >= this_cycle {
            let (ny, nm) = next_month(year, month);
            (ny, nm, self.billing_day.min(days_in_month(ny, nm)))
        } else {
            (year, month, this_cycle)
        };

        NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| d.and_time(transaction_date.time()))
            .unwrap_or(transaction_date)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodTotals {
    pub count: usize,
    pub amount: f64,
}

impl MethodTotals {
    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.amount += amount;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreditTotals {
    #[serde(flatten)]
    pub totals: MethodTotals,
    /// Charges whose billing date is still in the future.
    pub pending_billing: f64,
}

/// Spending analytics grouped by payment method.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillingSummary {
    #[serde(rename = "CREDIT_CARD")]
    pub credit_card: CreditTotals,
    #[serde(rename = "DEBIT_CARD")]
    pub debit_card: MethodTotals,
    #[serde(rename = "BANK_TRANSFER")]
    pub bank_transfer: MethodTotals,
    #[serde(rename = "CASH")]
    pub cash: MethodTotals,
    pub total: MethodTotals,
}

impl BillingSummary {
    /// Summarize expenses as seen at `now` (same local zone as the billing dates).
    pub fn from_expenses(expenses: &[Expense], now: NaiveDateTime) -> Self {
        let mut summary = Self::default();

        for e in expenses {
            summary.total.add(e.amount);
            match e.payment_method {
                PaymentMethod::CreditCard => {
                    summary.credit_card.totals.add(e.amount);
                    if e.billing_date > now {
                        summary.credit_card.pending_billing += e.amount;
                    }
                }
                PaymentMethod::DebitCard => summary.debit_card.add(e.amount),
                PaymentMethod::BankTransfer => summary.bank_transfer.add(e.amount),
                PaymentMethod::Cash => summary.cash.add(e.amount),
            }
        }

        summary
    }
}

/// Spending analytics by category over an optional transaction-date window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub total_amount: f64,
    pub transaction_count: usize,
    pub average_amount: f64,
    /// Category name to amount; uncategorized expenses only count in the totals.
    pub categories: BTreeMap<String, f64>,
}

impl CategorySummary {
    /// Both bounds are inclusive; `None` leaves that side open.
    pub fn from_expenses(
        expenses: &[Expense],
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Self {
        let mut summary = Self::default();

        let in_window = expenses.iter().filter(|e| {
            start.is_none_or(|s| e.transaction_date >= s) && end.is_none_or(|t| e.transaction_date <= t)
        });
        for e in in_window {
            summary.total_amount += e.amount;
            summary.transaction_count += 1;
            if let Some(cat) = &e.category {
                *summary.categories.entry(cat.clone()).or_insert(0.0) += e.amount;
            }
        }

        if summary.transaction_count > 0 {
            summary.average_amount = summary.total_amount / summary.transaction_count as f64;
        }
        summary
    }
}
