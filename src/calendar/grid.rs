//! Month grid for the date step of the booking wizard.
//!
//! Weeks start on Sunday. The grid opens with one blank cell per weekday
//! before the 1st of the month.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{CalendarError, CalendarResult};

/// One cell of the month grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    /// Day of month, 0 for leading blank cells
    pub day: u32,
    pub date: Option<NaiveDate>,
    pub is_today: bool,
    /// Strictly before today. Blank cells count as past so they are never selectable.
    pub is_past: bool,
}

impl DayCell {
    fn blank() -> Self {
        Self {
            day: 0,
            date: None,
            is_today: false,
            is_past: true,
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.date.is_some() && !self.is_past
    }
}

/// A rendered month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// e.g. "October 2026"
    pub label: String,
    pub cells: Vec<DayCell>,
}

/// Build the grid for `year`/`month` relative to `today`
pub fn month_grid(year: i32, month: u32, today: NaiveDate) -> CalendarResult<MonthView> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    let days = days_in_month(year, month)?;

    let offset = first.weekday().num_days_from_sunday() as usize;
    let mut cells = Vec::with_capacity(offset + days as usize);
    cells.extend(std::iter::repeat_with(DayCell::blank).take(offset));

    for day in 1..=days {
        let date = first.with_day(day).ok_or(CalendarError::InvalidMonth { year, month })?;
        cells.push(DayCell {
            day,
            date: Some(date),
            is_today: date == today,
            is_past: date < today,
        });
    }

    Ok(MonthView {
        year,
        month,
        label: first.format("%B %Y").to_string(),
        cells,
    })
}

fn days_in_month(year: i32, month: u32) -> CalendarResult<u32> {
    let (next_year, next) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or(CalendarError::InvalidMonth { year, month })
}

/// The month before `year`/`month`
pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// The month after `year`/`month`
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leading_blanks_match_weekday() {
        // 1 October 2026 is a Thursday
        let view = month_grid(2026, 10, date(2026, 10, 15)).unwrap();
        let blanks = view.cells.iter().take_while(|c| c.day == 0).count();
        assert_eq!(blanks, 4);
        assert_eq!(view.cells.len(), 4 + 31);
        assert_eq!(view.label, "October 2026");
    }

    #[test]
    fn test_today_and_past_flags() {
        let today = date(2026, 10, 15);
        let view = month_grid(2026, 10, today).unwrap();

        let cell = |d: u32| view.cells.iter().find(|c| c.day == d).unwrap().clone();
        assert!(cell(14).is_past);
        assert!(!cell(14).is_selectable());
        assert!(cell(15).is_today);
        assert!(!cell(15).is_past);
        assert!(cell(15).is_selectable());
        assert!(!cell(16).is_past);
    }

    #[test]
    fn test_blank_cells_are_never_selectable() {
        let view = month_grid(2026, 10, date(2020, 1, 1)).unwrap();
        assert!(view.cells.iter().filter(|c| c.day == 0).all(|c| !c.is_selectable()));
    }

    #[test]
    fn test_february_lengths() {
        let today = date(2000, 1, 1);
        let days = |y| {
            month_grid(y, 2, today)
                .unwrap()
                .cells
                .iter()
                .filter(|c| c.day > 0)
                .count()
        };
        assert_eq!(days(2028), 29);
        assert_eq!(days(2027), 28);
        assert_eq!(days(2100), 28);
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        assert_eq!(prev_month(2026, 1), (2025, 12));
        assert_eq!(next_month(2026, 12), (2027, 1));
        assert_eq!(next_month(2026, 5), (2026, 6));
    }

    #[test]
    fn test_invalid_month() {
        assert!(matches!(
            month_grid(2026, 13, date(2026, 1, 1)),
            Err(CalendarError::InvalidMonth { .. })
        ));
    }
}
