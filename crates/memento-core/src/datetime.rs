//! Datetime parsing and formatting.
//!
//! Two textual forms are in play: the HTTP-date carried by `Accept-Datetime`
//! and rendered into `datetime`/`from`/`until` link parameters, and the
//! compact `YYYYMMDDHHMMSS` form used by the history store and by pivot
//! segments in TimeMap URLs. All instants are UTC with second precision.

use chrono::{DateTime, NaiveDateTime, SubsecRound as _, Utc};

use crate::{Error, Result};

/// RFC 850 (obsolete HTTP-date), e.g. `Sunday, 06-Nov-94 08:49:37 GMT`.
const RFC850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// C `asctime()`, e.g. `Sun Nov  6 08:49:37 1994`.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";
/// IMF-fixdate, the preferred HTTP-date form.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Compact store / pivot form.
const COMPACT: &str = "%Y%m%d%H%M%S";

/// Parse a requested datetime in any of the three HTTP-date forms.
pub fn parse_http_date(raw: &str) -> Result<DateTime<Utc>> {
  let s = raw.trim();
  if s.is_empty() {
    return Err(Error::InvalidDatetime(raw.to_string()));
  }

  if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
    return Ok(dt.with_timezone(&Utc).trunc_subsecs(0));
  }

  [RFC850, ASCTIME]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .map(|naive| naive.and_utc())
    .ok_or_else(|| Error::InvalidDatetime(raw.to_string()))
}

/// Render an instant as an IMF-fixdate.
pub fn format_http_date(dt: DateTime<Utc>) -> String {
  dt.format(IMF_FIXDATE).to_string()
}

/// Parse the store's compact 14-digit timestamp.
pub fn parse_store_timestamp(raw: &str) -> Result<DateTime<Utc>> {
  if raw.len() != 14 || !raw.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::InvalidDatetime(raw.to_string()));
  }
  NaiveDateTime::parse_from_str(raw, COMPACT)
    .map(|naive| naive.and_utc())
    .map_err(|_| Error::InvalidDatetime(raw.to_string()))
}

pub fn format_store_timestamp(dt: DateTime<Utc>) -> String {
  dt.format(COMPACT).to_string()
}
