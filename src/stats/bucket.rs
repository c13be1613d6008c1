use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

/// Time-bucket granularity for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    Week,
    Quarter,
}

/// Identifies one time period under a granularity.
///
/// Ordering is by period start date, not by label, so bucket emission is
/// chronological no matter what the label format looks like.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BucketKey {
    start: NaiveDate,
    label: String,
}

impl BucketKey {
    /// First day of the period.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Display label, e.g. `2020-06`, `2020-W23`, or `CY20Q2`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl core::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Map a timestamp to its bucket under the given granularity.
///
/// Pure function. Timestamps are normalized to UTC by the type system: every
/// record source converts to `DateTime<Utc>` at the parse boundary, so two
/// timestamps near a period boundary always land deterministically.
#[must_use]
pub fn bucket(ts: DateTime<Utc>, granularity: Granularity) -> BucketKey {
    let date = ts.date_naive();
    match granularity {
        Granularity::Month => BucketKey {
            start: NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("first of month is valid"),
            label: format!("{:04}-{:02}", date.year(), date.month()),
        },
        Granularity::Week => {
            // ISO weeks: the week-year can differ from the calendar year
            // around January 1st.
            let iso = date.iso_week();
            BucketKey {
                start: NaiveDate::from_isoywd_opt(iso.year(), iso.week(), Weekday::Mon).expect("ISO week of an existing date is valid"),
                label: format!("{:04}-W{:02}", iso.year(), iso.week()),
            }
        }
        Granularity::Quarter => {
            // Calendar quarters: Jan-Mar, Apr-Jun, Jul-Sep, Oct-Dec.
            let quarter = date.month0() / 3 + 1;
            let start_month = (quarter - 1) * 3 + 1;
            BucketKey {
                start: NaiveDate::from_ymd_opt(date.year(), start_month, 1).expect("first of quarter is valid"),
                label: format!("CY{:02}Q{}", date.year().rem_euclid(100), quarter),
            }
        }
    }
}
