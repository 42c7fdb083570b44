//! Date ranges and running totals for the dashboard.

use std::ops::Range;

use time::{Date, Duration};

use crate::dashboard::TrendPoint;

/// The first day of the month containing `date`.
pub(super) fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// The half-open range from the first day of `date`'s month to the first day of the next month.
pub(super) fn month_range(date: Date) -> Range<Date> {
    let start = first_of_month(date);
    // 32 days past the first always lands in the next month.
    let end = first_of_month(start + Duration::days(32));

    start..end
}

/// The date range of the month before the one containing `date`.
pub(super) fn previous_month_range(date: Date) -> Range<Date> {
    month_range(first_of_month(date) - Duration::days(1))
}

/// Turns per-day net amounts (income minus expenses), sorted by date, into a running balance.
pub(super) fn running_balance(daily_net: &[(Date, f64)]) -> Vec<TrendPoint> {
    let mut balance = 0.0;

    daily_net
        .iter()
        .map(|&(date, net)| {
            balance += net;
            TrendPoint { date, balance }
        })
        .collect()
}
