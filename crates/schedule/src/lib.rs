//! Calendar helpers for the portal's scheduling and announcement screens.

pub mod calendar;
pub mod error;

pub use calendar::{date_range, entries_on, month_grid, ScheduleEntry, Week};
pub use error::{Result, ScheduleError};
