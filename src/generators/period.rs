//! Pure per-period candidate computations shared between generators
//! (`crate::generators`) and filters (`crate::filters`).
//!
//! Keeping these as plain functions over a `(list, period bounds)` pair, with
//! no iterator state of their own, means a generator and its corresponding
//! filter can never drift apart on what counts as a match: the generator
//! caches and indexes into the same vector the filter checks membership in.

use jiff::{ToSpan, civil::Date};

use crate::rule::{Weekday, WeekdayNum};
use crate::weekdate::WeekDate;

/// Resolves BYMONTHDAY values (positive or negative) against the given
/// month, dropping anything out of range, and returns the sorted, deduped
/// days of month that remain.
pub(crate) fn by_month_day_candidates(list: &[i8], year: i16, month: i8) -> Vec<i8> {
    let days_in_month = jiff::civil::date(year, month, 1).days_in_month();
    let mut out: Vec<i8> = list
        .iter()
        .filter_map(|&v| {
            let resolved = if v < 0 { i16::from(days_in_month) + 1 + i16::from(v) } else { i16::from(v) };
            (1..=i16::from(days_in_month)).contains(&resolved).then(|| resolved as i8)
        })
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Resolves BYYEARDAY values against the given year, dropping anything out
/// of range, and returns the sorted, deduped dates that remain.
pub(crate) fn by_year_day_candidates(list: &[i16], year: i16) -> Vec<Date> {
    let first = jiff::civil::date(year, 1, 1);
    let days_in_year = first.days_in_year();
    let mut out: Vec<Date> = list
        .iter()
        .filter_map(|&v| {
            let resolved = if v < 0 { i32::from(days_in_year) + 1 + i32::from(v) } else { i32::from(v) };
            if !(1..=i32::from(days_in_year)).contains(&resolved) {
                return None;
            }
            first.checked_add(i64::from(resolved - 1).days()).ok()
        })
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Resolves a BYDAY list against an enclosing period `[start, end]`
/// (inclusive), returning the sorted, deduped dates that match any entry.
///
/// A bare weekday (`WeekdayNum::every`) matches every occurrence of that
/// weekday in the period. A numbered weekday matches only the Nth occurrence
/// of that weekday, counted from the start of the period (positive) or the
/// end (negative).
pub(crate) fn by_day_candidates(list: &[WeekdayNum], start: Date, end: Date) -> Vec<Date> {
    let mut out = Vec::new();
    for wd in list {
        if wd.is_every() {
            out.extend(all_weekdays_in_range(start, end, wd.weekday));
        } else if let Some(date) = nth_weekday_in_range(start, end, wd.weekday, wd.ordinal) {
            out.push(date);
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Resolves a BYWEEKNO list against the given week-numbering year, clipping
/// any date that spills into an adjacent Gregorian year, and returns the
/// sorted, deduped dates that remain.
pub(crate) fn by_week_no_candidates(list: &[i8], wkst: Weekday, year: i16) -> Vec<Date> {
    let mut out = Vec::new();
    let Ok(anchor) = WeekDate::new(wkst, year, 1, wkst) else { return out };
    let weeks_in_year = anchor.weeks_in_year();
    for &v in list {
        let week = if v < 0 { i16::from(weeks_in_year) + 1 + i16::from(v) } else { i16::from(v) };
        if !(1..=i16::from(weeks_in_year)).contains(&week) {
            continue;
        }
        let Ok(week_num) = i8::try_from(week) else { continue };
        let Ok(week_start) = WeekDate::new(wkst, year, week_num, wkst) else { continue };
        for offset in 0..7i64 {
            let Ok(date) = week_start.date().checked_add(offset.days()) else { continue };
            if date.year() == year {
                out.push(date);
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

fn all_weekdays_in_range(start: Date, end: Date, weekday: Weekday) -> Vec<Date> {
    let mut out = Vec::new();
    let Ok(mut cur) = (if start.weekday() == weekday { Ok(start) } else { start.nth_weekday(1, weekday) }) else {
        return out;
    };
    while cur <= end {
        out.push(cur);
        let Ok(next) = cur.checked_add(7.days()) else { break };
        cur = next;
    }
    out
}

fn nth_weekday_in_range(start: Date, end: Date, weekday: Weekday, ordinal: i8) -> Option<Date> {
    let all = all_weekdays_in_range(start, end, weekday);
    if ordinal > 0 {
        all.get(ordinal as usize - 1).copied()
    } else {
        let idx = all.len().checked_sub(usize::try_from(-i32::from(ordinal)).ok()?)?;
        all.get(idx).copied()
    }
}
