use anyhow::{Context, Result};
use gastos_ingest::TransactionRecord;
use std::io::Write;

/// One JSON object per line.
pub fn write_json_lines<W: Write>(records: &[TransactionRecord], mut out: W) -> Result<()> {
    for r in records {
        serde_json::to_writer(&mut out, r).context("serialize record")?;
        writeln!(out)?;
    }
    Ok(())
}

/// CSV table with a header row; missing fields are empty cells.
pub fn write_csv<W: Write>(records: &[TransactionRecord], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for r in records {
        wtr.serialize(r).context("serialize record")?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gastos_ingest::parse_spanish_bank_text;

    fn records() -> Vec<TransactionRecord> {
        vec![
            parse_spanish_bank_text(
                "compra por $71.000 con Tarjeta de Crédito ****5646 en EL BACO el 19/07/2025 22:23",
            ),
            parse_spanish_bank_text("Transferencia por $5.000 el 1/8/2025 9:00"),
        ]
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut buf = Vec::new();
        write_csv(&records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "amount,merchant,description,transaction_date,source_email,raw_data,payment_method,card_last_four"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("71000.0,El Baco,Purchase at El Baco,2025-07-19T22:23:00,spanish_bank,"));
        assert!(lines[1].ends_with(",CREDIT_CARD,5646"));
        assert!(lines[2].starts_with("5000.0,,Purchase at Unknown,2025-08-01T09:00:00,"));
        assert!(lines[2].ends_with(",BANK_TRANSFER,"));
    }

    #[test]
    fn test_json_lines() {
        let mut buf = Vec::new();
        write_json_lines(&records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let parsed: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["merchant"], "El Baco");
        assert!(parsed[1]["merchant"].is_null());
    }
}
