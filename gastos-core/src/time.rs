//! Time utilities: an injectable clock and timezone-aware "now".

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use chrono_tz::Tz;

/// Source of the current instant. Parsers take one so the
/// time-dependent fallback can be pinned in tests.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn to_iso_millis_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Wall time of `dt` in an IANA zone like "America/Santiago", without offset.
pub fn to_local(dt: DateTime<Utc>, tz: &str) -> Result<NaiveDateTime> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;

    Ok(dt.with_timezone(&tz).naive_local())
}

/// Current wall time in an IANA zone, without offset.
pub fn local_now(clock: &dyn Clock, tz: &str) -> Result<NaiveDateTime> {
    to_local(clock.now(), tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_millis_format() {
        let dt = Utc.with_ymd_and_hms(2025, 7, 19, 22, 23, 5).unwrap();
        assert_eq!(to_iso_millis_utc(dt), "2025-07-19T22:23:05.000Z");
    }

    #[test]
    fn test_local_now_santiago() {
        // January is CLST (UTC-3)
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 10, 15, 0, 0).unwrap());
        let local = local_now(&clock, "America/Santiago").unwrap();
        assert_eq!(local.to_string(), "2026-01-10 12:00:00");
    }

    #[test]
    fn test_to_local_crosses_midnight() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 25, 2, 0, 0).unwrap();
        assert_eq!(to_local(dt, "America/Santiago").unwrap().to_string(), "2026-01-24 23:00:00");
        assert_eq!(to_local(dt, "UTC").unwrap().to_string(), "2026-01-25 02:00:00");
    }

    #[test]
    fn test_local_now_rejects_unknown_zone() {
        let clock = FixedClock(Utc::now());
        assert!(local_now(&clock, "Mars/Olympus").is_err());
    }
}
