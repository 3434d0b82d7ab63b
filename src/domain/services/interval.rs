use chrono::{DateTime, Utc};

/// Half-open interval overlap test: `[a_start, a_end)` and `[b_start, b_end)`
/// share an instant iff `a_start < b_end && a_end > b_start`.
///
/// Touching endpoints do not overlap, so an appointment ending at 09:00 never
/// blocks a slot starting at 09:00. Every conflict check in the crate goes
/// through this predicate.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}
