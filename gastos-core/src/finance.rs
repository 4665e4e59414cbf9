//! Payment-method types shared by the parser and the billing layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a transaction was paid.
///
/// The notification classifier only ever yields `CreditCard`, `BankTransfer`
/// or `DebitCard`; `Cash` exists for manually entered expenses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cash,
    ];

    /// Wire name, e.g. `CREDIT_CARD`
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cash => "CASH",
        }
    }

    /// True when the charge reaches the budget on a later billing cycle
    /// instead of immediately.
    pub fn is_deferred(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown payment method: {s}"))
    }
}
