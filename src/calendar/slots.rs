//! Bookable time slots
//!
//! Appointments start on the hour between 9 AM and 4 PM. Slots are exchanged
//! as display labels ("9:00 AM") and merged with the selected calendar day on
//! confirmation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

use super::{CalendarError, CalendarResult};

/// The eight bookable labels, in display order
pub const TIME_SLOTS: [&str; 8] = [
    "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM",
];

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d{1,2}):(\d{2})\s*(AM|PM)\s*$").expect("time label regex is valid")
    })
}

/// Whether `label` is one of [`TIME_SLOTS`]
pub fn is_time_slot(label: &str) -> bool {
    TIME_SLOTS.contains(&label.trim())
}

/// Parse a 12-hour label such as "1:00 PM".
///
/// 12 PM is noon and 12 AM is midnight.
pub fn parse_time_label(label: &str) -> CalendarResult<NaiveTime> {
    let invalid = || CalendarError::InvalidTimeLabel(label.to_string());

    let caps = label_pattern().captures(label).ok_or_else(invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) {
        return Err(invalid());
    }

    let pm = caps[3].eq_ignore_ascii_case("PM");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Render a time of day the way slots are labelled
pub fn time_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Merge a calendar day with a slot label into the appointment date-time
pub fn merge(date: NaiveDate, label: &str) -> CalendarResult<NaiveDateTime> {
    Ok(date.and_time(parse_time_label(label)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_every_slot_parses_and_renders_back() {
        for label in TIME_SLOTS {
            let time = parse_time_label(label).unwrap();
            assert_eq!(time_label(time), label);
        }
    }

    #[test]
    fn test_noon_and_midnight() {
        assert_eq!(parse_time_label("12:00 PM").unwrap().hour(), 12);
        assert_eq!(parse_time_label("12:30 AM").unwrap().hour(), 0);
        assert_eq!(parse_time_label("1:15 pm").unwrap().hour(), 13);
    }

    #[test]
    fn test_rejects_malformed_labels() {
        for label in ["", "9 AM", "13:00 PM", "0:00 AM", "9:60 AM", "nine"] {
            assert!(parse_time_label(label).is_err(), "{label} should not parse");
        }
    }

    #[test]
    fn test_is_time_slot() {
        assert!(is_time_slot("9:00 AM"));
        assert!(is_time_slot(" 4:00 PM "));
        assert!(!is_time_slot("5:00 PM"));
        assert!(!is_time_slot("9:30 AM"));
    }

    #[test]
    fn test_merge() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        let merged = merge(date, "3:00 PM").unwrap();
        assert_eq!(merged, date.and_hms_opt(15, 0, 0).unwrap());
    }
}
