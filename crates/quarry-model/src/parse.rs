//! Field-level parsing shared by ingestion and query bound parsing.

use chrono::NaiveDate;

/// Value an upstream system writes for "no measurement".
pub const MISSING_SENTINEL: f64 = -999.0;

/// Parse a finite float. Empty, non-numeric and non-finite inputs are rejected.
pub fn parse_f64(field: &str) -> Option<f64> {
    let v: f64 = field.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

pub fn parse_i64(field: &str) -> Option<i64> {
    field.trim().parse().ok()
}

pub fn parse_i32(field: &str) -> Option<i32> {
    field.trim().parse().ok()
}

/// An optional measurement field that could not be parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Malformed;

/// Parse an optional measurement.
///
/// Empty fields and the [`MISSING_SENTINEL`] are undefined (`Ok(None)`), which is distinct from
/// a real zero reading. Anything else that is not a finite number is [`Malformed`].
pub fn parse_measurement(field: &str) -> Result<Option<f64>, Malformed> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let v = parse_f64(trimmed).ok_or(Malformed)?;
    if v == MISSING_SENTINEL {
        return Ok(None);
    }
    Ok(Some(v))
}

/// Integer flavour of [`parse_measurement`] for the quality index.
pub fn parse_quality_index(field: &str) -> Result<Option<i16>, Malformed> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let v: i16 = trimmed.parse().map_err(|_| Malformed)?;
    if f64::from(v) == MISSING_SENTINEL {
        return Ok(None);
    }
    Ok(Some(v))
}

/// Category byte; empty defaults to 0.
pub fn parse_category(field: &str) -> Result<u8, Malformed> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| Malformed)
}

/// Check the fixed-width `YYYY-MM-DD(T| )HH:MM` prefix without validating the calendar.
pub fn looks_like_timestamp(field: &str) -> bool {
    let b = field.as_bytes();
    if b.len() < 16 {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
    digits(0..4)
        && b[4] == b'-'
        && digits(5..7)
        && b[7] == b'-'
        && digits(8..10)
        && (b[10] == b'T' || b[10] == b' ')
        && digits(11..13)
        && b[13] == b':'
        && digits(14..16)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UtcTimestamp {
    /// Minutes since the Unix epoch.
    pub minutes: i64,
    pub year: i32,
}

/// Parse a `YYYY-MM-DDTHH:MM` (or space-separated) UTC timestamp. Trailing seconds or offsets
/// are ignored. Impossible calendar dates are rejected.
pub fn parse_utc_timestamp(field: &str) -> Option<UtcTimestamp> {
    let field = field.trim();
    if !looks_like_timestamp(field) {
        return None;
    }

    let num = |range: std::ops::Range<usize>| field[range].parse::<u32>().ok();
    let year: i32 = field[0..4].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(5..7)?, num(8..10)?)?;
    let datetime = date.and_hms_opt(num(11..13)?, num(14..16)?, 0)?;
    let seconds = datetime.and_utc().timestamp();

    Some(UtcTimestamp {
        minutes: seconds.div_euclid(60),
        year,
    })
}
