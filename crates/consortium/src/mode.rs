use chrono::{Datelike, Months, NaiveDate};
use rimp_models::{ProjectKind, ProjectMode, MAX_DURATION};

/// Derive a project's consortium mode from its planned dates.
///
/// Without both dates the project is treated as a two-year multi-year
/// project. Otherwise the span is rounded up to whole calendar years and
/// clamped to 1..=5; a span of at most one year is single-year.
pub fn classify(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ProjectMode {
    let (Some(start), Some(end)) = (start, end) else {
        return ProjectMode::default();
    };

    let raw = span_in_years(start, end);
    let kind = if raw <= 1 {
        ProjectKind::Single
    } else {
        ProjectKind::Multi
    };

    ProjectMode {
        kind,
        duration: raw.clamp(1, MAX_DURATION),
    }
}

/// Number of calendar years needed to cover `start..end`, rounded up.
/// The order of the two dates does not matter.
pub fn span_in_years(start: NaiveDate, end: NaiveDate) -> u32 {
    let (from, to) = if start <= end { (start, end) } else { (end, start) };

    let mut whole = (to.year() - from.year()).max(0) as u32;
    if anniversary(from, whole) > to {
        whole -= 1;
    }
    if anniversary(from, whole) < to {
        whole + 1
    } else {
        whole
    }
}

// Feb 29 anniversaries fall on Feb 28 in common years.
fn anniversary(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_add_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MAX)
}
