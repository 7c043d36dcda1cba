//! Wall-clock access and the timestamp format stored in map metadata.

use time::OffsetDateTime;
use time::macros::format_description;

/// Source of the current time. Swapped out in tests.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-01-31T09:15:02.120Z`.
///
/// Fixed width, so lexical order matches chronological order.
#[must_use]
pub fn timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
    let utc = at.to_offset(time::UtcOffset::UTC);
    // The format above only fails for years outside 0..=9999.
    utc.format(&format).unwrap_or_else(|_| format!("{}Z", utc.unix_timestamp()))
}

/// The later of a fresh timestamp and the previously stored one, so a save
/// never moves `modified` backwards when the clock does.
#[must_use]
pub fn not_before(now: String, prior: Option<&str>) -> String {
    match prior {
        Some(prior) if prior > now.as_str() => prior.to_owned(),
        _ => now,
    }
}
