//! Per-occurrence predicates applied after the generator chain produces a
//! candidate date, before it reaches the terminating condition.
//!
//! Each filter here mirrors the candidate-set computation its corresponding
//! generator in `crate::generators` uses, so that "is `date` included" and
//! "enumerate all included dates in this period" never disagree (spec.md
//! §4.2's "Filters vs generators" note).

use jiff::civil::Date;

use crate::generators::{by_day_candidates, by_month_day_candidates};
use crate::rule::{Weekday, WeekdayNum};
use crate::weekdate::first_of_week;

/// One compiled rule-part filter. The factory builds a `Vec<Filter>` and ANDs
/// them all together for each candidate date.
#[derive(Clone, Debug)]
pub(crate) enum Filter {
    ByDay { by_day: Box<[WeekdayNum]>, year_scoped: bool },
    ByMonthDay(Box<[i8]>),
    WeekInterval { interval: i32, wkst: Weekday, dt_start_week_start: Date },
}

impl Filter {
    pub(crate) fn matches(&self, date: Date) -> bool {
        match self {
            Filter::ByDay { by_day, year_scoped } => {
                if by_day.is_empty() {
                    return true;
                }
                let (start, end) = if *year_scoped {
                    (jiff::civil::date(date.year(), 1, 1), jiff::civil::date(date.year(), 12, 31))
                } else {
                    let first = jiff::civil::date(date.year(), date.month(), 1);
                    (first, first.last_of_month())
                };
                by_day_candidates(by_day, start, end).contains(&date)
            }
            Filter::ByMonthDay(by_month_day) => {
                if by_month_day.is_empty() {
                    return true;
                }
                by_month_day_candidates(by_month_day, date.year(), date.month()).contains(&date.day())
            }
            Filter::WeekInterval { interval, wkst, dt_start_week_start } => {
                if *interval <= 1 {
                    return true;
                }
                let Ok(this_week_start) = first_of_week(*wkst, date) else { return true };
                let Some(span) = dt_start_week_start.until(this_week_start).ok() else { return true };
                let weeks = span.get_days() / 7;
                weeks.rem_euclid(i64::from(*interval)) == 0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;

    use super::*;
    use crate::rule::Weekday::*;

    #[test]
    fn by_day_filter_year_scoped_matches_generator_candidates() {
        let filter =
            Filter::ByDay { by_day: vec![WeekdayNum::nth(-1, Friday)].into_boxed_slice(), year_scoped: true };
        assert!(filter.matches(jiff::civil::date(1997, 12, 26)));
        assert!(!filter.matches(jiff::civil::date(1997, 12, 19)));
    }

    #[test]
    fn by_month_day_filter_negative_index() {
        let filter = Filter::ByMonthDay(vec![-1].into_boxed_slice());
        assert!(filter.matches(jiff::civil::date(2024, 2, 29)));
        assert!(!filter.matches(jiff::civil::date(2024, 2, 28)));
    }

    #[test]
    fn week_interval_filter_every_other_week() {
        let dt_start = jiff::civil::date(1997, 9, 2);
        let dt_start_week_start = first_of_week(Monday, dt_start).unwrap();
        let filter = Filter::WeekInterval { interval: 2, wkst: Monday, dt_start_week_start };
        assert!(filter.matches(dt_start));
        assert!(!filter.matches(dt_start + 7.days()));
        assert!(filter.matches(dt_start + 14.days()));
    }
}
