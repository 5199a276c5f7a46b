//! Instance generators: drive a year/month/day generator chain and apply
//! per-occurrence filters, in either of the two modes spec.md §4.4
//! describes — serial (emit each passing candidate as soon as it's found)
//! or BYSETPOS-buffered (collect every passing candidate in a "set period",
//! then keep only the positions BYSETPOS names).

use std::collections::VecDeque;

use jiff::ToSpan;
use jiff::civil::Date;

use crate::filters::Filter;
use crate::generators::{DayGenerator, GeneratorStep, MonthGenerator, SerialYearGenerator, WorkingDate};
use crate::rule::{Frequency, Weekday};
use crate::weekdate::first_of_week;

/// After this many consecutive enclosing periods produce zero accepted
/// candidates, an instance generator gives up rather than iterate forever
/// (e.g. `FREQ=YEARLY;BYMONTHDAY=30;BYMONTH=2`, which never matches).
const MAX_EMPTY_PERIODS: u32 = 100;

fn skip_before_start(date: Date, dt_start_date: Date, passed_start: &mut bool) -> bool {
    if *passed_start {
        return false;
    }
    if date < dt_start_date {
        return true;
    }
    *passed_start = true;
    false
}

/// Emits each filter-passing candidate as soon as the generator chain
/// produces it, in ascending order.
pub(crate) struct SerialInstanceGenerator {
    year: SerialYearGenerator,
    month: MonthGenerator,
    day: DayGenerator,
    filters: Vec<Filter>,
    wd: WorkingDate,
    dt_start_date: Date,
    passed_start: bool,
    found_any_this_year: bool,
    empty_years: u32,
}

impl SerialInstanceGenerator {
    pub(crate) fn new(
        year: SerialYearGenerator,
        month: MonthGenerator,
        day: DayGenerator,
        filters: Vec<Filter>,
        dt_start_date: Date,
    ) -> SerialInstanceGenerator {
        SerialInstanceGenerator {
            year,
            month,
            day,
            filters,
            wd: WorkingDate::from_date(dt_start_date),
            dt_start_date,
            passed_start: false,
            found_any_this_year: false,
            empty_years: 0,
        }
    }

    fn filters_match(&self, date: Date) -> bool {
        self.filters.iter().all(|f| f.matches(date))
    }

    /// Returns the next candidate date, or `None` once the empty-years guard
    /// trips (the year generator itself never exhausts on its own).
    pub(crate) fn next(&mut self) -> Option<Date> {
        loop {
            match self.day.generate(&mut self.wd) {
                GeneratorStep::Advanced => {
                    let date = self.wd.date();
                    if skip_before_start(date, self.dt_start_date, &mut self.passed_start) {
                        continue;
                    }
                    if self.filters_match(date) {
                        self.found_any_this_year = true;
                        return Some(date);
                    }
                }
                GeneratorStep::RolledOver => match self.month.generate(&mut self.wd) {
                    GeneratorStep::Advanced => {}
                    GeneratorStep::RolledOver => {
                        if self.found_any_this_year {
                            self.empty_years = 0;
                        } else {
                            self.empty_years += 1;
                            if self.empty_years > MAX_EMPTY_PERIODS {
                                return None;
                            }
                        }
                        self.found_any_this_year = false;
                        if self.year.generate(&mut self.wd) != GeneratorStep::Advanced {
                            return None;
                        }
                    }
                },
            }
        }
    }
}

/// Resolves BYSETPOS's 1-based positional indices (positive from the start
/// of the set, negative from the end) against a sorted candidate list.
fn select_by_set_pos(candidates: &[Date], by_set_pos: &[i32]) -> Vec<Date> {
    let len = candidates.len() as i64;
    let mut indices: Vec<usize> = Vec::new();
    for &pos in by_set_pos {
        let one_based = if pos < 0 { len + 1 + i64::from(pos) } else { i64::from(pos) };
        if (1..=len).contains(&one_based) {
            indices.push((one_based - 1) as usize);
        }
    }
    indices.sort_unstable();
    indices.dedup();
    indices.into_iter().map(|i| candidates[i]).collect()
}

/// Collects every filter-passing candidate in a "set period" (a year, a
/// month, or a week, depending on frequency), then emits only those at the
/// positions BYSETPOS names.
pub(crate) struct BySetPosInstanceGenerator {
    freq: Frequency,
    wkst: Weekday,
    by_set_pos: Box<[i32]>,
    year: SerialYearGenerator,
    month: MonthGenerator,
    day: DayGenerator,
    filters: Vec<Filter>,
    wd: WorkingDate,
    week_cursor: Option<Date>,
    buffer: VecDeque<Date>,
    dt_start_date: Date,
    passed_start: bool,
    empty_periods: u32,
}

impl BySetPosInstanceGenerator {
    pub(crate) fn new(
        freq: Frequency,
        wkst: Weekday,
        by_set_pos: Box<[i32]>,
        year: SerialYearGenerator,
        month: MonthGenerator,
        day: DayGenerator,
        filters: Vec<Filter>,
        dt_start_date: Date,
    ) -> BySetPosInstanceGenerator {
        BySetPosInstanceGenerator {
            freq,
            wkst,
            by_set_pos,
            year,
            month,
            day,
            filters,
            wd: WorkingDate::from_date(dt_start_date),
            week_cursor: None,
            buffer: VecDeque::new(),
            dt_start_date,
            passed_start: false,
            empty_periods: 0,
        }
    }

    fn filters_match(&self, date: Date) -> bool {
        self.filters.iter().all(|f| f.matches(date))
    }

    fn advance_to_next_period(&mut self) -> bool {
        match self.freq {
            Frequency::Yearly => self.year.generate(&mut self.wd) == GeneratorStep::Advanced,
            Frequency::Monthly => loop {
                match self.month.generate(&mut self.wd) {
                    GeneratorStep::Advanced => return true,
                    GeneratorStep::RolledOver => {
                        if self.year.generate(&mut self.wd) != GeneratorStep::Advanced {
                            return false;
                        }
                    }
                }
            },
            Frequency::Weekly => {
                let next = match self.week_cursor {
                    None => first_of_week(self.wkst, self.dt_start_date).ok(),
                    Some(cur) => cur.checked_add(7.days()).ok(),
                };
                self.week_cursor = next;
                next.is_some()
            }
            Frequency::Daily => false,
        }
    }

    fn collect_set_period(&mut self) -> Vec<Date> {
        let mut out = Vec::new();
        match self.freq {
            Frequency::Monthly => loop {
                match self.day.generate(&mut self.wd) {
                    GeneratorStep::Advanced => {
                        let date = self.wd.date();
                        if self.filters_match(date) {
                            out.push(date);
                        }
                    }
                    GeneratorStep::RolledOver => break,
                }
            },
            Frequency::Yearly => loop {
                match self.month.generate(&mut self.wd) {
                    GeneratorStep::Advanced => loop {
                        match self.day.generate(&mut self.wd) {
                            GeneratorStep::Advanced => {
                                let date = self.wd.date();
                                if self.filters_match(date) {
                                    out.push(date);
                                }
                            }
                            GeneratorStep::RolledOver => break,
                        }
                    },
                    GeneratorStep::RolledOver => break,
                }
            },
            Frequency::Weekly => {
                if let Some(start) = self.week_cursor {
                    for offset in 0..7i64 {
                        if let Ok(date) = start.checked_add(offset.days()) {
                            if self.filters_match(date) {
                                out.push(date);
                            }
                        }
                    }
                }
            }
            Frequency::Daily => {}
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    pub(crate) fn next(&mut self) -> Option<Date> {
        loop {
            while let Some(date) = self.buffer.pop_front() {
                if skip_before_start(date, self.dt_start_date, &mut self.passed_start) {
                    continue;
                }
                return Some(date);
            }
            if !self.advance_to_next_period() {
                return None;
            }
            let candidates = self.collect_set_period();
            let selected = select_by_set_pos(&candidates, &self.by_set_pos);
            if selected.is_empty() {
                self.empty_periods += 1;
                if self.empty_periods > MAX_EMPTY_PERIODS {
                    return None;
                }
                continue;
            }
            self.empty_periods = 0;
            self.buffer.extend(selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{ByDayGenerator, ExplicitMonthGenerator};
    use crate::rule::WeekdayNum;
    use crate::rule::Weekday::*;

    #[test]
    fn by_set_pos_last_weekday_of_month() {
        // MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1, starting 1997-09-02.
        let dt_start = jiff::civil::date(1997, 9, 2);
        let year = SerialYearGenerator::new(1, 1997);
        let month = MonthGenerator::Serial(crate::generators::SerialMonthGenerator::new(1, 1997, 9));
        let by_day = vec![
            WeekdayNum::every(Monday),
            WeekdayNum::every(Tuesday),
            WeekdayNum::every(Wednesday),
            WeekdayNum::every(Thursday),
            WeekdayNum::every(Friday),
        ]
        .into_boxed_slice();
        let day = DayGenerator::ByDay(ByDayGenerator::new(by_day, false));
        let mut gen = BySetPosInstanceGenerator::new(
            Frequency::Monthly,
            Monday,
            vec![-1].into_boxed_slice(),
            year,
            month,
            day,
            vec![],
            dt_start,
        );
        assert_eq!(gen.next(), Some(jiff::civil::date(1997, 9, 30)));
        assert_eq!(gen.next(), Some(jiff::civil::date(1997, 10, 31)));
    }

    #[test]
    fn serial_instance_generator_skips_before_dt_start() {
        let dt_start = jiff::civil::date(1997, 9, 2);
        let year = SerialYearGenerator::new(1, 1997);
        let month = MonthGenerator::Explicit(ExplicitMonthGenerator::new(vec![9].into_boxed_slice()));
        let day =
            DayGenerator::Serial(crate::generators::SerialDayGenerator::new(1, jiff::civil::date(1997, 9, 1)));
        let mut gen = SerialInstanceGenerator::new(year, month, day, vec![], dt_start);
        assert_eq!(gen.next(), Some(dt_start));
    }

    #[test]
    fn serial_instance_generator_seeds_working_date_before_first_day_generate() {
        // Reproduces S1 (WEEKLY;BYDAY=TU): the day generator is month-scoped
        // (`year_scoped=false`) and is asked for a candidate *before* the
        // month/year generators have ever run, per spec.md §4.4's literal
        // "try day.generate first" order. If `wd` weren't seeded from
        // `dt_start_date` up front, this would construct `date(0, 0, 1)` and
        // panic instead of returning 1997-09-02.
        let dt_start = jiff::civil::date(1997, 9, 2);
        let year = SerialYearGenerator::new(1, 1997);
        let month = MonthGenerator::Serial(crate::generators::SerialMonthGenerator::new(1, 1997, 9));
        let day = DayGenerator::ByDay(ByDayGenerator::new(
            vec![WeekdayNum::every(Tuesday)].into_boxed_slice(),
            false,
        ));
        let mut gen = SerialInstanceGenerator::new(year, month, day, vec![], dt_start);
        assert_eq!(gen.next(), Some(dt_start));
        assert_eq!(gen.next(), Some(jiff::civil::date(1997, 9, 9)));
    }
}
