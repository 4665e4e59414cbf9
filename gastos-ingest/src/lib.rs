//! gastos-ingest: turns Spanish bank notification text (email/SMS) into
//! structured transaction records.

pub mod error;
pub mod parsers;
pub mod types;

pub use error::IngestError;
pub use parsers::split_messages;
pub use parsers::spanish_bank::{
    classify_payment_method, extract_amount, extract_card_last_four, extract_merchant,
    extract_transaction_date, normalize_merchant, parse_notification, parse_spanish_bank_text,
};
pub use types::{SOURCE_CHANNEL, TransactionRecord, TransactionTime};
