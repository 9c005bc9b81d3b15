use crate::error::{Result, ScheduleError};
use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One calendar row; slots outside the month are `None`
pub type Week = [Option<NaiveDate>; 7];

/// Week rows covering a month, starting each row on `week_start`
pub fn month_grid(year: i32, month: u32, week_start: Weekday) -> Result<Vec<Week>> {
    let invalid = || ScheduleError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;

    let offset = (first.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;

    let mut weeks = Vec::with_capacity(6);
    let mut week: Week = [None; 7];
    let mut slot = offset as usize;

    for day in first.iter_days().take_while(|d| *d <= last) {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }

    Ok(weeks)
}

/// Every day from `start` to `end`, both included. Empty if `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Scheduled item spanning one or more days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScheduleEntry {
    pub fn new(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let title = title.into();
        if end < start {
            return Err(ScheduleError::EndsBeforeStart(title));
        }
        Ok(Self { title, start, end })
    }

    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        date_range(self.start, self.end)
    }
}

/// Entries to render in one day cell, in input order
pub fn entries_on(entries: &[ScheduleEntry], day: NaiveDate) -> Vec<&ScheduleEntry> {
    entries.iter().filter(|e| e.occurs_on(day)).collect()
}
