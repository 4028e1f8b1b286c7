//! Date-token normalization for external series.
//!
//! Accepted shapes (after trimming):
//! - `YYYY-MM`    -> first of that month
//! - `YYYY-MM-DD` -> that exact date
//! - `YYYYMM`     -> first of that month
//!
//! Anything else is rejected and the record is dropped. A full date that is
//! not a first-of-month is kept as-is and simply never matches a grid month.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedDate {
    Normalized(NaiveDate),
    Rejected,
}

impl NormalizedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            NormalizedDate::Normalized(d) => Some(d),
            NormalizedDate::Rejected => None,
        }
    }
}

pub fn normalize_month_token(raw: &str) -> NormalizedDate {
    let s = raw.trim().trim_start_matches('\u{feff}');
    let iso = match s.len() {
        7 => format!("{s}-01"),
        10 => s.to_string(),
        6 if s.bytes().all(|b| b.is_ascii_digit()) => format!("{}-{}-01", &s[..4], &s[4..]),
        _ => return NormalizedDate::Rejected,
    };

    // Guard against sign/space variants chrono would otherwise tolerate.
    let shape_ok = iso.len() == 10
        && iso
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    if !shape_ok {
        return NormalizedDate::Rejected;
    }

    match NaiveDate::parse_from_str(&iso, "%Y-%m-%d") {
        Ok(d) => NormalizedDate::Normalized(d),
        Err(_) => NormalizedDate::Rejected,
    }
}
