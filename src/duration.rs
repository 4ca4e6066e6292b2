use chrono::{DateTime, Utc};

/// Milliseconds elapsed between two optional timestamps.
///
/// Returns `None` when either endpoint is missing. Out-of-order inputs yield a
/// negative value; nothing is clamped.
pub fn duration_in_ms(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<i64> {
    Some((end? - start?).num_milliseconds())
}
