//! IST wall-clock display helpers.
//!
//! The service stores and transmits UTC everywhere; IST (`UTC+05:30`) is a
//! display concern only (scheduler logs and the demo REPL).

use chrono::{DateTime, FixedOffset, Timelike as _, Utc};

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

fn offset() -> FixedOffset {
  FixedOffset::east_opt(IST_OFFSET_SECONDS).expect("IST offset is in range")
}

/// Current wall-clock time in IST.
pub fn now() -> DateTime<FixedOffset> {
  to_ist(Utc::now())
}

pub fn to_ist(dt: DateTime<Utc>) -> DateTime<FixedOffset> {
  dt.with_timezone(&offset())
}

/// Readable IST timestamp, e.g. `Monday, 01 June 2026 09:30:00 IST`.
pub fn format(dt: DateTime<FixedOffset>) -> String {
  dt.format("%A, %d %B %Y %H:%M:%S IST").to_string()
}

/// Whether an IST time falls in business hours (9:00–18:59).
pub fn is_business_hours(dt: DateTime<FixedOffset>) -> bool {
  (9..=18).contains(&dt.hour())
}
