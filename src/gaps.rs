use chrono::{Datelike, Months, NaiveDate};
use std::collections::HashSet;

/// First day of the month `date` falls in.
pub fn month_of(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}

/// The `lookback + 1` consecutive draw months ending at the month of
/// `today`, oldest first.
pub fn months_to_check(lookback: u32, today: NaiveDate) -> Vec<NaiveDate> {
    let current = month_of(today);
    (0..=lookback)
        .rev()
        .map(|i| current.checked_sub_months(Months::new(i)).unwrap())
        .collect()
}

/// Decide which months in the window need their prize report fetched.
///
/// The newest month is always flagged when absent from the ledger. An older
/// absent month is flagged only when the month after it is also absent, or
/// when the month before it was already flagged (a contiguous run of gaps
/// keeps propagating). An absent month surrounded by recorded ones is an
/// isolated gap: no report existed for it, so it is left alone.
pub fn find_missing_months(
    window: &[NaiveDate],
    recorded: &HashSet<NaiveDate>,
) -> (bool, Vec<NaiveDate>) {
    let mut missing = Vec::new();
    let mut prev_missing = false;

    for (i, month) in window.iter().enumerate() {
        if recorded.contains(month) {
            prev_missing = false;
            continue;
        }

        let is_current = i == window.len() - 1;
        let next_absent = window
            .get(i + 1)
            .map_or(false, |next| !recorded.contains(next));

        if is_current || next_absent || prev_missing {
            missing.push(*month);
            prev_missing = true;
        } else {
            prev_missing = false;
        }
    }

    (!missing.is_empty(), missing)
}
