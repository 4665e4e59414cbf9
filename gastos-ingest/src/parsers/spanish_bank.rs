//! Spanish bank notification parser (email/SMS body)
//!
//! Expected text, one purchase per notification:
//!   Te informamos que se ha realizado una compra por $71.000 con Tarjeta de
//!   Crédito ****5646 en EL BACO SANTIAGO CL el 19/07/2025 22:23. Revisa ...
//!
//! Each field is extracted independently; a field whose pattern is missing
//! comes back as `None` without affecting the others.

use std::sync::OnceLock;

use gastos_core::{Clock, PaymentMethod, SystemClock, to_iso_millis_utc};
use regex::Regex;
use tracing::debug;

use crate::error::IngestError;
use crate::types::TransactionRecord;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)por\s*\$(?P<amt>[0-9.,]+)").expect("invalid amount regex"))
}

// Only the literals are case-insensitive; the merchant span itself must be
// upper case, digits, spaces, hyphens or dots.
fn merchant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i:en)\s+(?P<merchant>[A-Z0-9\s\-.]+?)\s+(?i:el)\s+[0-9]")
            .expect("invalid merchant regex")
    })
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i:el)\s+",
            r"(?P<day>[0-9]{1,2})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{4})\s+",
            r"(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{2})"
        ))
        .expect("invalid date regex")
    })
}

fn card_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*{4}[-\s]?(?P<last4>[0-9]{4})").expect("invalid card regex"))
}

/// Keyword groups in priority order. The first group with any hit decides.
const PAYMENT_KEYWORDS: &[(&[&str], PaymentMethod)] = &[
    (
        &["tarjeta de crédito", "credito", "compra", "cargo"],
        PaymentMethod::CreditCard,
    ),
    (
        &["transferencia", "envío", "pago a", "envio"],
        PaymentMethod::BankTransfer,
    ),
    (
        &["tarjeta de débito", "debito", "retiro", "cajero"],
        PaymentMethod::DebitCard,
    ),
];

const DEFAULT_PAYMENT_METHOD: PaymentMethod = PaymentMethod::DebitCard;

/// Amount following `por $`, with dots treated as thousands separators.
///
/// Commas are not decimal separators here: `"71,50"` yields `71`.
pub fn extract_amount(text: &str) -> Option<f64> {
    let caps = amount_re().captures(text)?;
    parse_leading_number(&caps["amt"])
}

fn parse_leading_number(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| *c != '.')
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Merchant between `en` and `el <digit>`, title-cased.
pub fn extract_merchant(text: &str) -> Option<String> {
    let caps = merchant_re().captures(text)?;
    let merchant = normalize_merchant(&caps["merchant"]);
    if merchant.is_empty() {
        return None;
    }
    Some(merchant)
}

/// Lowercase, then capitalize each whitespace-separated word.
pub fn normalize_merchant(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `el D/M/YYYY H:MM` rendered as `YYYY-MM-DDTHH:MM:00`.
///
/// Day, month and hour are zero-padded (`9:05` becomes `09:05:00`) so the
/// result is always a well-formed timestamp. No calendar validation. Without a match, the current instant from
/// `clock` is returned in `YYYY-MM-DDTHH:MM:SS.mmmZ` form.
pub fn extract_transaction_date(text: &str, clock: &dyn Clock) -> String {
    match date_re().captures(text) {
        Some(caps) => format!(
            "{}-{:0>2}-{:0>2}T{:0>2}:{}:00",
            &caps["year"], &caps["month"], &caps["day"], &caps["hour"], &caps["minute"]
        ),
        None => {
            debug!("no transaction date in notification, using current time");
            to_iso_millis_utc(clock.now())
        }
    }
}

/// Last four digits of a `****1234` / `****-1234` / `**** 1234` card mask.
pub fn extract_card_last_four(text: &str) -> Option<String> {
    card_re()
        .captures(text)
        .map(|caps| caps["last4"].to_string())
}

/// Keyword-driven payment method; `DEBIT_CARD` when nothing matches.
pub fn classify_payment_method(text: &str) -> PaymentMethod {
    let lower = text.to_lowercase();
    PAYMENT_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, method)| *method)
        .unwrap_or(DEFAULT_PAYMENT_METHOD)
}

/// Build a record from a notification body supplied by the caller.
///
/// `None` or an empty string is `InputMissing`; any other text yields a
/// record, with unmatched fields left empty.
pub fn parse_notification(
    body: Option<&str>,
    clock: &dyn Clock,
) -> Result<TransactionRecord, IngestError> {
    match body {
        Some(text) if !text.is_empty() => Ok(build_record(text, clock)),
        _ => Err(IngestError::InputMissing),
    }
}

/// Parse notification text using the system clock for the date fallback.
pub fn parse_spanish_bank_text(text: &str) -> TransactionRecord {
    build_record(text, &SystemClock)
}

fn build_record(text: &str, clock: &dyn Clock) -> TransactionRecord {
    let amount = extract_amount(text);
    let merchant = extract_merchant(text);
    let transaction_date = extract_transaction_date(text, clock);
    let payment_method = classify_payment_method(text);
    let card_last_four = extract_card_last_four(text);

    debug!(
        ?amount,
        ?merchant,
        %transaction_date,
        %payment_method,
        ?card_last_four,
        "parsed bank notification"
    );

    TransactionRecord::new(
        text,
        amount,
        merchant,
        transaction_date,
        payment_method,
        card_last_four,
    )
}
