//! Checkout scheduling options.

use chrono::{DateTime, Duration, Local, NaiveDate};

/// Number of calendar days offered, today included.
pub const BOOKING_WINDOW_DAYS: i64 = 7;

/// Quarter-hour service slots offered every day.
pub const TIME_SLOTS: [&str; 24] = [
    "8:00–8:15 AM",
    "8:30–8:45 AM",
    "9:00–9:15 AM",
    "9:30–9:45 AM",
    "10:00–10:15 AM",
    "10:30–10:45 AM",
    "11:00–11:15 AM",
    "11:30–11:45 AM",
    "12:00–12:15 PM",
    "12:30–12:45 PM",
    "1:00–1:15 PM",
    "1:30–1:45 PM",
    "2:00–2:15 PM",
    "2:30–2:45 PM",
    "3:00–3:15 PM",
    "3:30–3:45 PM",
    "4:00–4:15 PM",
    "4:30–4:45 PM",
    "5:00–5:15 PM",
    "5:30–5:45 PM",
    "6:00–6:15 PM",
    "6:30–6:45 PM",
    "7:00–7:15 PM",
    "7:30–7:45 PM",
];

/// Local calendar date for an epoch-millisecond instant.
pub fn local_date(epoch_ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|utc| utc.with_timezone(&Local).date_naive())
        .unwrap_or_default()
}

/// Formats a date the way the checkout form shows it, e.g. `Friday, Oct 16, 2026`.
pub fn format_booking_date(date: NaiveDate) -> String {
    date.format("%A, %b %-d, %Y").to_string()
}

/// Bookable dates starting at `today`.
pub fn available_dates(today: NaiveDate) -> Vec<String> {
    (0..BOOKING_WINDOW_DAYS)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .map(format_booking_date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{available_dates, format_booking_date, TIME_SLOTS};
    use chrono::NaiveDate;

    #[test]
    fn booking_window_spans_seven_days_from_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let dates = available_dates(today);

        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], "Friday, Oct 16, 2026");
        assert_eq!(dates[6], "Thursday, Oct 22, 2026");
    }

    #[test]
    fn single_digit_days_are_not_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(format_booking_date(date), "Monday, Mar 2, 2026");
    }

    #[test]
    fn default_time_slot_is_offered() {
        assert!(TIME_SLOTS.contains(&crate::service::order_service::DEFAULT_TIME_SLOT));
    }
}
