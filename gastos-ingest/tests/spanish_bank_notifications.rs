use chrono::{DateTime, Duration, TimeZone, Utc};
use gastos_core::{FixedClock, PaymentMethod, SystemClock};
use gastos_ingest::{IngestError, parse_notification, parse_spanish_bank_text, split_messages};

const PURCHASE: &str = "Julio Andres Andrade Gomez: Te informamos que se ha realizado una compra por $71.000 con Tarjeta de Crédito ****5646 en EL BACO SANTIAGO CL el 19/07/2025 22:23. Revisa Saldos y Movimientos en App Mi";

/// Real-shape regression: the canonical credit-card purchase notification.
#[test]
fn test_end_to_end_credit_purchase() {
    let rec = parse_spanish_bank_text(PURCHASE);

    assert_eq!(rec.amount(), Some(71000.0));
    assert_eq!(rec.merchant(), Some("El Baco Santiago Cl"));
    assert_eq!(rec.payment_method(), PaymentMethod::CreditCard);
    assert_eq!(rec.card_last_four(), Some("5646"));
    assert_eq!(rec.transaction_date(), "2025-07-19T22:23:00");

    let json = serde_json::to_value(&rec).unwrap();
    assert_eq!(json["amount"], 71000.0);
    assert_eq!(json["merchant"], "El Baco Santiago Cl");
    assert_eq!(json["description"], "Purchase at El Baco Santiago Cl");
    assert_eq!(json["payment_method"], "CREDIT_CARD");
    assert_eq!(json["card_last_four"], "5646");
    assert_eq!(json["transaction_date"], "2025-07-19T22:23:00");
    assert_eq!(json["source_email"], "spanish_bank");
    assert_eq!(json["raw_data"], PURCHASE);
}

#[test]
fn test_amount_without_merchant() {
    let rec = parse_spanish_bank_text("Transferencia por $250.000 a cuenta ****-9912");

    assert_eq!(rec.amount(), Some(250000.0));
    assert_eq!(rec.merchant(), None);
    assert_eq!(rec.description(), "Purchase at Unknown");
    assert_eq!(rec.card_last_four(), Some("9912"));
    assert_eq!(rec.payment_method(), PaymentMethod::BankTransfer);
}

#[test]
fn test_merchant_without_amount_or_card() {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap());
    let rec = parse_notification(Some("Retiro en CAJERO BANCO ESTADO el 3/1/2026 7:45"), &clock).unwrap();

    assert_eq!(rec.amount(), None);
    assert_eq!(rec.card_last_four(), None);
    assert_eq!(rec.merchant(), Some("Cajero Banco Estado"));
    assert_eq!(rec.transaction_date(), "2026-01-03T07:45:00");
    assert_eq!(rec.payment_method(), PaymentMethod::DebitCard);
}

#[test]
fn test_nothing_matches() {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap());
    let rec = parse_notification(Some("Tu clave dinámica es 123456"), &clock).unwrap();

    assert_eq!(rec.amount(), None);
    assert_eq!(rec.merchant(), None);
    assert_eq!(rec.card_last_four(), None);
    assert_eq!(rec.payment_method(), PaymentMethod::DebitCard);
    assert_eq!(rec.transaction_date(), "2026-01-05T12:00:00.000Z");
}

#[test]
fn test_fallback_date_tracks_wall_clock() {
    let before = Utc::now();
    let rec = parse_notification(Some("compra sin fecha"), &SystemClock).unwrap();
    let after = Utc::now();

    let stamped: DateTime<Utc> = DateTime::parse_from_rfc3339(rec.transaction_date())
        .expect("fallback date should be RFC 3339")
        .with_timezone(&Utc);

    let tolerance = Duration::seconds(5);
    assert!(stamped >= before - tolerance && stamped <= after + tolerance);
    assert!(rec.transaction_date().ends_with('Z'));
}

#[test]
fn test_missing_input_is_an_error() {
    let err = parse_notification(None, &SystemClock).unwrap_err();
    assert_eq!(err, IngestError::InputMissing);
    assert_eq!(err.to_string(), "no notification text supplied");
}

#[test]
fn test_batch_of_messages() {
    let dump = format!(
        "{PURCHASE}\n\nSe realizó un envío por $12.500 a Juan\n\nRetiro por $40.000 en CAJERO SANTA ISABEL el 02/08/2025 13:10\n"
    );

    let records: Vec<_> = split_messages(&dump)
        .iter()
        .map(|m| parse_spanish_bank_text(m))
        .collect();

    let methods: Vec<_> = records.iter().map(|r| r.payment_method()).collect();
    assert_eq!(
        methods,
        vec![
            PaymentMethod::CreditCard,
            PaymentMethod::BankTransfer,
            PaymentMethod::DebitCard
        ]
    );
    assert_eq!(records[1].amount(), Some(12500.0));
    assert_eq!(records[2].merchant(), Some("Cajero Santa Isabel"));
    assert_eq!(records[2].transaction_date(), "2025-08-02T13:10:00");
}
