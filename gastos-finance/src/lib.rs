//! gastos-finance: credit-card billing cycles, billing summaries, merchant
//! category rules, and expense assembly from parsed notifications

pub mod billing;
pub mod category_rules;
pub mod expense;

pub use billing::{BillingCycle, BillingSummary, CategorySummary, CreditTotals, MethodTotals};
pub use category_rules::{CategoryMatch, Categorizer, MerchantRule, RuleSuggestion, RuleTest, fuzzy_ratio};
pub use expense::Expense;
