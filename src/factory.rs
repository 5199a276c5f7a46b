//! Dispatch: given a validated [`RRule`], choose the generator chain, the
//! filters, the instance-generator flavor (serial vs. BYSETPOS-buffered) and
//! the terminating condition per spec.md §4.3's per-frequency table, and
//! assemble an [`RRuleIter`].

use jiff::civil::Date;

use crate::condition::Condition;
use crate::filters::Filter;
use crate::generators::{
    ByDayGenerator, ByMonthDayGenerator, ByWeekNoGenerator, ByYearDayGenerator, DayGenerator,
    ExplicitMonthGenerator, MonthGenerator, SerialDayGenerator, SerialMonthGenerator, SerialYearGenerator,
};
use crate::instance::{BySetPosInstanceGenerator, SerialInstanceGenerator};
use crate::occurrence::Occurrence;
use crate::rule::{Frequency, RRule};
use crate::rrule_iter::RRuleIter;
use crate::weekdate::first_of_week;

fn dt_start_date(rule: &RRule) -> Date {
    match rule.dt_start() {
        Occurrence::Date(d) => d,
        Occurrence::DateTime(ts) => ts.to_zoned(rule.time_zone().clone()).date(),
    }
}

/// Builds the per-rule iterator for `rule`: the generator chain, the filter
/// list and the instance-generator flavor it dispatches to, and the
/// COUNT/UNTIL condition compiled from the rule's fields.
pub(crate) fn build_iter(rule: &RRule) -> RRuleIter {
    let inner = &rule.inner;
    let dt_start_date = dt_start_date(rule);

    let year = SerialYearGenerator::new(
        if matches!(inner.freq, Frequency::Yearly) { inner.interval } else { 1 },
        dt_start_date.year(),
    );
    let (month, day, filters) = build_month_day(rule, dt_start_date);

    let condition = if inner.count > 0 {
        Condition::count(inner.count)
    } else if let Some(until) = inner.until {
        Condition::until(until)
    } else {
        Condition::Always
    };

    if !inner.by_set_pos.is_empty() {
        let gen = BySetPosInstanceGenerator::new(
            inner.freq,
            inner.wkst,
            inner.by_set_pos.clone(),
            year,
            month,
            day,
            filters,
            dt_start_date,
        );
        RRuleIter::new(rule.clone(), None, Some(gen), condition)
    } else {
        let gen = SerialInstanceGenerator::new(year, month, day, filters, dt_start_date);
        RRuleIter::new(rule.clone(), Some(gen), None, condition)
    }
}

/// The month/day generator-and-filter half of spec.md §4.3's table.
///
/// The table's "Month generator" row ("byMonth list if present") applies
/// uniformly across every frequency, so BYMONTH always drives the month
/// generator directly (never becomes a secondary filter) — see
/// `crate::generators::SerialDayGenerator`'s resync behavior, which is what
/// keeps DAILY/WEEKLY's serial day cursor correct when BYMONTH skips
/// non-consecutive months; see DESIGN.md.
fn build_month_day(rule: &RRule, dt_start_date: Date) -> (MonthGenerator, DayGenerator, Vec<Filter>) {
    let inner = &rule.inner;
    let mut filters = Vec::new();

    let no_other_by_part = inner.by_year_day.is_empty()
        && inner.by_month_day.is_empty()
        && inner.by_week_no.is_empty()
        && inner.by_day.is_empty();

    let month = if !inner.by_month.is_empty() {
        MonthGenerator::Explicit(ExplicitMonthGenerator::new(inner.by_month.clone()))
    } else if matches!(inner.freq, Frequency::Yearly) && no_other_by_part {
        MonthGenerator::Explicit(ExplicitMonthGenerator::new(Box::from([dt_start_date.month()])))
    } else {
        let interval = if matches!(inner.freq, Frequency::Monthly) { inner.interval } else { 1 };
        MonthGenerator::Serial(SerialMonthGenerator::new(interval, dt_start_date.year(), dt_start_date.month()))
    };

    let day = match inner.freq {
        Frequency::Daily => {
            if !inner.by_month_day.is_empty() {
                DayGenerator::ByMonthDay(ByMonthDayGenerator::new(inner.by_month_day.clone()))
            } else {
                DayGenerator::Serial(SerialDayGenerator::new(i64::from(inner.interval), dt_start_date))
            }
        }
        Frequency::Weekly => {
            if !inner.by_day.is_empty() {
                DayGenerator::ByDay(ByDayGenerator::new(inner.by_day.clone(), false))
            } else {
                DayGenerator::Serial(SerialDayGenerator::new(i64::from(inner.interval) * 7, dt_start_date))
            }
        }
        Frequency::Yearly if !inner.by_year_day.is_empty() => {
            DayGenerator::ByYearDay(ByYearDayGenerator::new(inner.by_year_day.clone()))
        }
        Frequency::Yearly | Frequency::Monthly => {
            if !inner.by_month_day.is_empty() {
                DayGenerator::ByMonthDay(ByMonthDayGenerator::new(inner.by_month_day.clone()))
            } else if matches!(inner.freq, Frequency::Yearly) && !inner.by_week_no.is_empty() {
                DayGenerator::ByWeekNo(ByWeekNoGenerator::new(inner.by_week_no.clone(), inner.wkst))
            } else if !inner.by_day.is_empty() {
                let year_scoped = matches!(inner.freq, Frequency::Yearly) && inner.by_month.is_empty();
                DayGenerator::ByDay(ByDayGenerator::new(inner.by_day.clone(), year_scoped))
            } else {
                DayGenerator::ByMonthDay(ByMonthDayGenerator::new(Box::from([dt_start_date.day()])))
            }
        }
    };

    match inner.freq {
        Frequency::Daily => {
            if !inner.by_day.is_empty() {
                filters.push(Filter::ByDay { by_day: inner.by_day.clone(), year_scoped: true });
            }
        }
        Frequency::Weekly => {
            if inner.interval > 1 && !inner.by_day.is_empty() {
                let dt_start_week_start = first_of_week(inner.wkst, dt_start_date)
                    .expect("weekday arithmetic never fails for in-range dates");
                filters.push(Filter::WeekInterval {
                    interval: inner.interval,
                    wkst: inner.wkst,
                    dt_start_week_start,
                });
            }
            if !inner.by_month_day.is_empty() {
                filters.push(Filter::ByMonthDay(inner.by_month_day.clone()));
            }
        }
        Frequency::Yearly | Frequency::Monthly => {
            let day_gen_is_by_year_day = matches!(inner.freq, Frequency::Yearly) && !inner.by_year_day.is_empty();
            let day_gen_is_by_month_day = !day_gen_is_by_year_day && !inner.by_month_day.is_empty();
            let day_gen_is_by_week_no = !day_gen_is_by_year_day
                && !day_gen_is_by_month_day
                && matches!(inner.freq, Frequency::Yearly)
                && !inner.by_week_no.is_empty();

            if day_gen_is_by_month_day && !inner.by_day.is_empty() {
                filters.push(Filter::ByDay { by_day: inner.by_day.clone(), year_scoped: false });
            }
            if day_gen_is_by_year_day {
                if !inner.by_month_day.is_empty() {
                    filters.push(Filter::ByMonthDay(inner.by_month_day.clone()));
                }
                if !inner.by_day.is_empty() {
                    filters.push(Filter::ByDay { by_day: inner.by_day.clone(), year_scoped: true });
                }
            }
            // BYWEEKNO's own day generator doesn't consult BYDAY's ordinal
            // at all; the only sensible reading is to filter its candidates
            // down to the listed weekday(s), per the Open Question resolved
            // in DESIGN.md.
            if day_gen_is_by_week_no && !inner.by_day.is_empty() {
                filters.push(Filter::ByDay { by_day: inner.by_day.clone(), year_scoped: true });
            }
        }
    }

    (month, day, filters)
}
